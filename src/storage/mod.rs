pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::settings::DatabaseConfig;
use crate::error::{AuthError, Result as AppResult};
use crate::models::account::{Account, AccountStatus, Role};

/// Storage Result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Error types for storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            StorageError::Database(_) => "database",
            StorageError::Connection(_) => "connection",
            StorageError::NotFound(_) => "not_found",
            StorageError::Duplicate(_) => "duplicate",
            StorageError::InvalidData(_) => "validation",
            StorageError::Internal(_) => "internal",
        }
    }
}

// Error conversions for better integration
impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Duplicate(db_err.to_string())
            }
            sqlx::Error::Database(db_err) => Self::Database(db_err.to_string()),
            sqlx::Error::Io(io_err) => Self::Connection(io_err.to_string()),
            sqlx::Error::PoolTimedOut => Self::Connection("Connection pool timeout".to_string()),
            sqlx::Error::PoolClosed => Self::Connection("Connection pool closed".to_string()),
            _ => Self::Database(error.to_string()),
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AuthError::NotFound(msg),
            StorageError::Duplicate(msg) => AuthError::Validation(msg),
            StorageError::InvalidData(msg) => AuthError::Validation(msg),
            other => AuthError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Outcome of a conditional verification-token consumption
#[derive(Debug, Clone)]
pub enum TokenConsume {
    /// No account carries this token
    Missing,
    /// Token matched but its expiry is in the past; the account stays
    /// unverified and the token is retained
    Expired,
    /// Token matched and was unexpired; the account is now verified and
    /// both token fields are cleared
    Verified(Account),
}

/// Credential store contract. Each operation is atomic at the
/// single-record level; the conditional operations exist so callers
/// never have to issue read-then-write sequences.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; fails with `Duplicate` when the email is
    /// already registered. Single atomic operation, no prior read.
    async fn insert_account(&self, account: &Account) -> Result<()>;

    /// Look up an account by email (exact match as stored)
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Look up an account by unique ID
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>>;

    /// Atomically verify the account holding `token`: when the token
    /// matches and `token_expiry > now`, set the verified flag and clear
    /// both token fields in one update. Expired tokens are left in place.
    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenConsume>;

    /// Set the account role and refresh `updated_at`
    async fn update_role(&self, id: &str, role: Role) -> Result<()>;

    /// Set the lifecycle status and refresh `updated_at`
    async fn set_status(&self, id: &str, status: AccountStatus) -> Result<()>;

    /// List all accounts, newest first
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Health check with connection validation
    async fn health_check(&self) -> Result<bool>;

    /// Close all connections gracefully
    async fn close(&self) -> Result<()>;
}

/// Initialize the storage layer from configuration. An empty DB host
/// falls back to the in-memory store for local development.
pub async fn init_storage(config: &DatabaseConfig) -> AppResult<Arc<dyn AccountStore>> {
    if config.host.is_empty() {
        warn!("No database host configured, using in-memory account store");
        return Ok(Arc::new(memory::MemoryStore::new()));
    }

    info!("Initializing MySQL account store at {}:{}", config.host, config.port);
    let store = mysql::MySqlStore::connect(config).await?;

    store
        .health_check()
        .await
        .map_err(|e| AuthError::StorageUnavailable(format!("Storage health check failed: {}", e)))?;

    info!("Account store initialized");
    Ok(Arc::new(store))
}
