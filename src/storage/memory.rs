use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex as TokioMutex;

use crate::models::account::{Account, AccountStatus, Role};
use crate::storage::{AccountStore, Result, StorageError, TokenConsume};

// In-memory storage data structure (using Mutex for thread safety)
struct StorageData {
    accounts: HashMap<String, Account>, // id -> account
}

impl StorageData {
    fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }
}

/// In-memory account store (useful for testing and local development)
pub struct MemoryStore {
    data: TokioMutex<StorageData>,
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self {
            data: TokioMutex::new(StorageData::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    /// Insert a new account. The duplicate check and the insert happen
    /// under one lock, so concurrent registrations cannot both succeed.
    async fn insert_account(&self, account: &Account) -> Result<()> {
        let mut data = self.data.lock().await;

        if data.accounts.values().any(|a| a.email == account.email) {
            return Err(StorageError::Duplicate(format!(
                "Email already registered: {}",
                account.email
            )));
        }

        data.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    /// Get account by email (exact match as stored)
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let data = self.data.lock().await;
        Ok(data.accounts.values().find(|a| a.email == email).cloned())
    }

    /// Get account by ID
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        let data = self.data.lock().await;
        Ok(data.accounts.get(id).cloned())
    }

    /// Consume a verification token under one lock
    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenConsume> {
        let mut data = self.data.lock().await;

        let account = data
            .accounts
            .values_mut()
            .find(|a| a.verification_token.as_deref() == Some(token));

        let account = match account {
            Some(account) => account,
            None => return Ok(TokenConsume::Missing),
        };

        match account.token_expiry {
            Some(expiry) if expiry > now => {
                account.is_email_verified = true;
                account.verification_token = None;
                account.token_expiry = None;
                account.updated_at = now;
                Ok(TokenConsume::Verified(account.clone()))
            }
            // expired token stays in place; re-issuance is an external concern
            _ => Ok(TokenConsume::Expired),
        }
    }

    /// Update account role
    async fn update_role(&self, id: &str, role: Role) -> Result<()> {
        let mut data = self.data.lock().await;

        let account = data
            .accounts
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("Account not found: {}", id)))?;

        account.role = role;
        account.updated_at = Utc::now();
        Ok(())
    }

    /// Update lifecycle status
    async fn set_status(&self, id: &str, status: AccountStatus) -> Result<()> {
        let mut data = self.data.lock().await;

        let account = data
            .accounts
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(format!("Account not found: {}", id)))?;

        account.status = status;
        account.updated_at = Utc::now();
        Ok(())
    }

    /// List accounts, newest first
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let data = self.data.lock().await;
        let mut accounts: Vec<Account> = data.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
