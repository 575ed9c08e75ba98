pub mod constants;
pub mod settings;

pub use settings::{Config, DatabaseConfig, LoggingConfig, ServerConfig, SessionConfig, SmtpConfig};
