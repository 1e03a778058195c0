pub mod ignore;
pub mod models;
pub mod sanitize;
pub mod template;
pub mod title;
pub mod wanted;
