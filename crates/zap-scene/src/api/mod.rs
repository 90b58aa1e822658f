pub mod config;
pub mod types;
pub mod value;
