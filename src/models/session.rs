use serde::{Deserialize, Serialize};

use crate::models::account::{Account, Role};

/// Authenticated identity snapshot bound to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Account unique ID
    pub account_id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Authorization role at login time
    pub role: Role,
    /// Email verification flag
    pub is_email_verified: bool,
}

impl Principal {
    /// Snapshot the parts of an account a request needs
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.id.clone(),
            name: account.full_name(),
            email: account.email.clone(),
            role: account.role,
            is_email_verified: account.is_email_verified,
        }
    }
}
