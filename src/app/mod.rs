pub mod config;
pub mod logging;

pub use self::config::{AppConfig, DetectorConfig, LoggingConfig, UnknownClassPolicy};
pub use self::logging::init_tracing;
