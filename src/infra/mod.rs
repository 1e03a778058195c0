pub mod disk;
pub mod feeds;
pub mod logging;
pub mod sabnzbd;
