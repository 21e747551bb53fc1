pub mod config;
pub mod find_toml;
pub mod logger;

pub use config::*;
pub use logger::setup_logging;
