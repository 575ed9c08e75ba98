use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::settings::DatabaseConfig;
use crate::models::account::{Account, AccountStatus, Role};
use crate::storage::{AccountStore, Result, StorageError, TokenConsume};

/// MySQL-backed account store
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect and initialize the schema
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url())
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to connect to MySQL: {}", e)))?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("MySQL account store ready");
        Ok(store)
    }

    /// Create the accounts table when absent. The UNIQUE email index is
    /// what makes `insert_account` race-free.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r"CREATE TABLE IF NOT EXISTS accounts (
                id VARCHAR(36) NOT NULL PRIMARY KEY,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(100) NOT NULL,
                first_name VARCHAR(100) NOT NULL,
                last_name VARCHAR(100) NOT NULL,
                role VARCHAR(16) NOT NULL,
                status VARCHAR(16) NOT NULL,
                is_email_verified BOOLEAN NOT NULL DEFAULT FALSE,
                verification_token VARCHAR(64) NULL,
                token_expiry DATETIME(6) NULL,
                created_at DATETIME(6) NOT NULL,
                updated_at DATETIME(6) NOT NULL,
                UNIQUE KEY uq_accounts_email (email),
                KEY idx_accounts_token (verification_token)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_account(row: &MySqlRow) -> Result<Account> {
        let role: String = row.try_get("role")?;
        let status: String = row.try_get("status")?;

        Ok(Account {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            role: role.parse::<Role>().map_err(StorageError::InvalidData)?,
            status: status
                .parse::<AccountStatus>()
                .map_err(StorageError::InvalidData)?,
            is_email_verified: row.try_get("is_email_verified")?,
            verification_token: row.try_get("verification_token")?,
            token_expiry: row.try_get("token_expiry")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn fetch_account(&self, column: &str, value: &str) -> Result<Option<Account>> {
        let query = format!(
            "SELECT id, email, password_hash, first_name, last_name, role, status, \
             is_email_verified, verification_token, token_expiry, created_at, updated_at \
             FROM accounts WHERE {} = ?",
            column
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_account).transpose()
    }
}

#[async_trait]
impl AccountStore for MySqlStore {
    /// Single INSERT; the unique index turns a concurrent duplicate into
    /// a `Duplicate` error instead of a second row.
    async fn insert_account(&self, account: &Account) -> Result<()> {
        debug!("Inserting account {}", account.id);

        sqlx::query(
            r"INSERT INTO accounts (
                id, email, password_hash, first_name, last_name,
                role, status, is_email_verified, verification_token,
                token_expiry, created_at, updated_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.role.as_str())
        .bind(account.status.as_str())
        .bind(account.is_email_verified)
        .bind(&account.verification_token)
        .bind(account.token_expiry)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.fetch_account("email", email).await
    }

    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        self.fetch_account("id", id).await
    }

    /// The conditional UPDATE is the atomic gate: only a matching,
    /// unexpired token flips the verified flag, and only once.
    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenConsume> {
        let pending = sqlx::query("SELECT id, token_expiry FROM accounts WHERE verification_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let (id, expiry): (String, Option<DateTime<Utc>>) = match pending {
            Some(row) => (row.try_get("id")?, row.try_get("token_expiry")?),
            None => return Ok(TokenConsume::Missing),
        };

        let updated = sqlx::query(
            r"UPDATE accounts SET
                is_email_verified = TRUE,
                verification_token = NULL,
                token_expiry = NULL,
                updated_at = ?
              WHERE id = ? AND verification_token = ? AND token_expiry > ?",
        )
        .bind(now)
        .bind(&id)
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            // precondition failed: expired, or consumed by a concurrent request
            return match expiry {
                Some(expiry) if expiry > now => Ok(TokenConsume::Missing),
                _ => Ok(TokenConsume::Expired),
            };
        }

        match self.get_account_by_id(&id).await? {
            Some(account) => Ok(TokenConsume::Verified(account)),
            None => Err(StorageError::Internal(format!(
                "Account {} vanished after verification",
                id
            ))),
        }
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Account not found: {}", id)));
        }
        Ok(())
    }

    async fn set_status(&self, id: &str, status: AccountStatus) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Account not found: {}", id)));
        }
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT id, email, password_hash, first_name, last_name, role, status, \
             is_email_verified, verification_token, token_expiry, created_at, updated_at \
             FROM accounts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_account).collect()
    }

    async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
