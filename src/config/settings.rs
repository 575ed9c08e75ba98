use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

use crate::config::constants;

/// Main configuration container for the application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration settings
    pub server: ServerConfig,
    /// Database configuration settings
    pub database: DatabaseConfig,
    /// Outbound email configuration settings
    pub smtp: SmtpConfig,
    /// Session configuration settings
    pub session: SessionConfig,
    /// Logging configuration settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        Self {
            server: ServerConfig::load(),
            database: DatabaseConfig::load(),
            smtp: SmtpConfig::load(),
            session: SessionConfig::load(),
            logging: LoggingConfig::load(),
        }
    }
}

/// Server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to listen on
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Number of worker threads
    pub worker_threads: usize,
    /// Public base URL used in verification links
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: constants::DEFAULT_HTTP_PORT,
            worker_threads: 4,
            public_url: format!("http://localhost:{}", constants::DEFAULT_HTTP_PORT),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(constants::DEFAULT_HTTP_PORT);
        let worker_threads = env::var("WORKER_THREADS")
            .ok()
            .and_then(|t| t.parse::<usize>().ok())
            .unwrap_or_else(num_cpus::get);
        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            worker_threads,
            public_url,
        }
    }

    /// Get socket address from host and port
    pub fn address(&self) -> Result<SocketAddr, std::io::Error> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    }
}

/// Database configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub name: String,
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "user".to_string(),
            password: "password".to_string(),
            name: "pos_accounts".to_string(),
            host: "localhost".to_string(),
            port: 3306,
            max_connections: 5,
            connection_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables or use defaults
    pub fn load() -> Self {
        let user = env::var("DB_USER").unwrap_or_else(|_| "user".to_string());
        let password = env::var("DB_PASS").unwrap_or_else(|_| "password".to_string());
        let name = env::var("DB_NAME").unwrap_or_else(|_| "pos_accounts".to_string());
        let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("DB_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3306);
        let max_connections = env::var("DB_POOL")
            .ok()
            .and_then(|c| c.parse::<u32>().ok())
            .unwrap_or(5);
        let connection_timeout = env::var("DB_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(30);

        Self {
            user,
            password,
            name,
            host,
            port,
            max_connections,
            connection_timeout,
        }
    }

    /// Generate database URL from individual components
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

/// Outbound SMTP configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,
    /// SMTP relay port
    pub port: u16,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: String,
    /// From address for verification mail
    pub from_address: String,
    /// When false, mail is logged instead of sent
    pub enabled: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_address: "no-reply@pos.local".to_string(),
            enabled: false,
        }
    }
}

impl SmtpConfig {
    /// Load SMTP configuration from environment variables or use defaults
    pub fn load() -> Self {
        Self {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(587),
            username: env::var("SMTP_USER").unwrap_or_default(),
            password: env::var("SMTP_PASS").unwrap_or_default(),
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@pos.local".to_string()),
            enabled: env::var("SMTP_ENABLED")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }
}

/// Session configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle expiry window in minutes
    pub idle_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_minutes: constants::DEFAULT_SESSION_IDLE_MINUTES,
        }
    }
}

impl SessionConfig {
    /// Load session configuration from environment variables or use defaults
    pub fn load() -> Self {
        let idle_minutes = env::var("SESSION_IDLE_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i64>().ok())
            .unwrap_or(constants::DEFAULT_SESSION_IDLE_MINUTES);

        Self { idle_minutes }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON log lines instead of the compact format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Load logging configuration from environment variables or use defaults
    pub fn load() -> Self {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json_format = env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);

        Self { level, json_format }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_config_yields_a_bindable_address() {
        let config = ServerConfig::default();
        let addr = config.address().unwrap();
        assert_eq!(addr.port(), constants::DEFAULT_HTTP_PORT);
    }

    #[test]
    fn hostname_listen_address_is_rejected() {
        let config = ServerConfig {
            host: "not a socket addr".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.address().is_err());
    }
}
