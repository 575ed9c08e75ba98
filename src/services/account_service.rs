use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::auth::password;
use crate::auth::token::generate_verification_token;
use crate::config::constants::VERIFICATION_TOKEN_TTL_MINUTES;
use crate::error::{AuthError, Result};
use crate::models::account::{Account, AccountStatus, Role};
use crate::services::mailer::Mailer;
use crate::storage::{AccountStore, TokenConsume};

/// Owns the account state machine: registration, verification, role
/// change and archival.
pub struct AccountService {
    storage: Arc<dyn AccountStore>,
    mailer: Arc<dyn Mailer>,
    /// Public base URL embedded into verification links
    public_url: String,
}

impl AccountService {
    pub fn new(storage: Arc<dyn AccountStore>, mailer: Arc<dyn Mailer>, public_url: String) -> Self {
        Self {
            storage,
            mailer,
            public_url,
        }
    }

    /// Create a new unverified customer account and dispatch the
    /// verification email. Mail failure is logged, not rolled back; the
    /// account exists either way.
    pub async fn register(
        &self,
        email: &str,
        plain_password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Account> {
        debug!("Registering account for {}", email);

        let password_hash = password::hash_password(plain_password).await?;
        let token = generate_verification_token();
        let now = Utc::now();

        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role: Role::Customer,
            status: AccountStatus::Active,
            is_email_verified: false,
            verification_token: Some(token.clone()),
            token_expiry: Some(now + Duration::minutes(VERIFICATION_TOKEN_TTL_MINUTES)),
            created_at: now,
            updated_at: now,
        };

        // single conditional insert; a duplicate email surfaces here
        self.storage.insert_account(&account).await.map_err(|e| {
            match AuthError::from(e) {
                AuthError::Validation(_) => {
                    AuthError::Validation("Email is already registered".to_string())
                }
                other => other,
            }
        })?;

        info!("Account {} created for {}", account.id, email);

        let link = format!("{}/users/verify/{}", self.public_url, token);
        let body = format!(
            "<p>Hi {},</p><p>Please confirm your email address by following \
             <a href=\"{}\">this link</a>. The link expires in one hour.</p>",
            first_name, link
        );
        if let Err(e) = self
            .mailer
            .send(email, "Verify your account", &body)
            .await
        {
            // account stays; the user can be offered a re-send elsewhere
            error!("Verification mail to {} failed: {}", email, e);
        }

        Ok(account)
    }

    /// Verify the account holding `token`. Expired tokens are reported
    /// but not cleared; consumption is one-shot by design.
    pub async fn verify_email(&self, token: &str) -> Result<Account> {
        match self
            .storage
            .consume_verification_token(token, Utc::now())
            .await?
        {
            TokenConsume::Verified(account) => {
                info!("Account {} verified", account.id);
                Ok(account)
            }
            TokenConsume::Expired => Err(AuthError::ExpiredToken(
                "Verification link has expired".to_string(),
            )),
            TokenConsume::Missing => Err(AuthError::NotFound(
                "Invalid verification token".to_string(),
            )),
        }
    }

    /// Set a new role. Caller authorization is the route guard's job;
    /// the role value itself is validated against the closed set here.
    pub async fn update_role(&self, account_id: &str, new_role: &str) -> Result<Role> {
        let role: Role = new_role
            .parse()
            .map_err(|e: String| AuthError::Validation(e))?;

        self.storage.update_role(account_id, role).await?;
        info!("Account {} role set to {}", account_id, role);
        Ok(role)
    }

    /// Mark an employee account as resigned
    pub async fn archive_employee(&self, account_id: &str) -> Result<()> {
        self.storage
            .set_status(account_id, AccountStatus::Resigned)
            .await?;
        info!("Account {} archived", account_id);
        Ok(())
    }

    /// Accounts for the admin dashboard, newest first
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.storage.list_accounts().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::LogMailer;
    use crate::storage::memory::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> AccountService {
        AccountService::new(store, Arc::new(LogMailer), "http://localhost:8080".into())
    }

    #[tokio::test]
    async fn registration_creates_unverified_account_with_token() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let account = svc.register("a@x.com", "pw", "A", "B").await.unwrap();

        assert_eq!(account.role, Role::Customer);
        assert_eq!(account.status, AccountStatus::Active);
        assert!(!account.is_email_verified);
        assert!(account.verification_token.is_some());
        assert!(account.token_expiry.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_validation_failure() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        svc.register("a@x.com", "pw", "A", "B").await.unwrap();
        let err = svc.register("a@x.com", "pw2", "C", "D").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(svc.list_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn verification_is_one_shot() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let account = svc.register("a@x.com", "pw", "A", "B").await.unwrap();
        let token = account.verification_token.unwrap();

        let verified = svc.verify_email(&token).await.unwrap();
        assert!(verified.is_email_verified);
        assert!(verified.verification_token.is_none());

        // second use of the same token fails with NotFound
        let err = svc.verify_email(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_token_fails_and_account_stays_unverified() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: "late@x.com".to_string(),
            password_hash: "$2b$12$fake".to_string(),
            first_name: "L".to_string(),
            last_name: "T".to_string(),
            role: Role::Customer,
            status: AccountStatus::Active,
            is_email_verified: false,
            verification_token: Some("stale-token".to_string()),
            token_expiry: Some(now - Duration::minutes(5)),
            created_at: now,
            updated_at: now,
        };
        store.insert_account(&account).await.unwrap();

        let err = svc.verify_email("stale-token").await.unwrap_err();
        assert!(matches!(err, AuthError::ExpiredToken(_)));

        // the account is untouched: still unverified, token retained
        let stored = store.get_account_by_id(&account.id).await.unwrap().unwrap();
        assert!(!stored.is_email_verified);
        assert_eq!(stored.verification_token.as_deref(), Some("stale-token"));
        assert!(stored.token_expiry.is_some());
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);
        let err = svc.verify_email("deadbeef").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn role_update_rejects_unknown_values() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let account = svc.register("a@x.com", "pw", "A", "B").await.unwrap();

        let err = svc.update_role(&account.id, "superuser").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let role = svc.update_role(&account.id, "Employee").await.unwrap();
        assert_eq!(role, Role::Employee);
    }

    #[tokio::test]
    async fn archive_sets_resigned_status() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let account = svc.register("e@x.com", "pw", "E", "F").await.unwrap();

        svc.archive_employee(&account.id).await.unwrap();

        let stored = store.get_account_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Resigned);
    }
}
