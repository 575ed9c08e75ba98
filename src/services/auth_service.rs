use std::sync::Arc;
use tracing::debug;

use crate::auth::password;
use crate::error::{AuthError, Result};
use crate::models::account::AccountStatus;
use crate::models::session::Principal;
use crate::storage::AccountStore;

/// Validates credentials against stored state and produces an
/// authenticated principal.
pub struct AuthService {
    storage: Arc<dyn AccountStore>,
}

impl AuthService {
    /// Create a new authentication service with the given storage backend
    pub fn new(storage: Arc<dyn AccountStore>) -> Self {
        Self { storage }
    }

    /// Authenticate user with credentials. The checks short-circuit in a
    /// fixed order; later checks assume earlier ones passed.
    pub async fn login(&self, email: &str, plain_password: &str) -> Result<Principal> {
        debug!("Authenticating {}", email);

        // 1. account exists
        let account = self
            .storage
            .get_account_by_email(email)
            .await?
            .ok_or_else(|| AuthError::NotFound("No account for this email".to_string()))?;

        // 2. email verified
        if !account.is_email_verified {
            return Err(AuthError::EmailNotVerified(
                "Please verify your email before logging in".to_string(),
            ));
        }

        // 3. account active
        if account.status != AccountStatus::Active {
            return Err(AuthError::AccountInactive(
                "This account is no longer active".to_string(),
            ));
        }

        // 4. password matches (adaptive hash, runs on the blocking pool)
        if !password::verify_password(plain_password, &account.password_hash).await? {
            return Err(AuthError::InvalidCredentials(
                "Incorrect email or password".to_string(),
            ));
        }

        Ok(Principal::from_account(&account))
    }
}
