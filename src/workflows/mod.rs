pub mod collector;
pub mod pipeline;
pub mod summary;
