use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization role, a closed set. The wire format is lowercase and
/// parsing is case-insensitive; unknown values are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    /// Dashboard path a freshly logged-in principal is redirected to
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Customer => "/users/dashboard",
            Role::Employee => "/users/emp-dashboard",
            Role::Admin => "/users/adminDashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Lifecycle status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Resigned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Resigned => "resigned",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "resigned" => Ok(AccountStatus::Resigned),
            _ => Err(format!("Unknown account status: {}", s)),
        }
    }
}

/// Durable account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// unique ID
    pub id: String,
    /// email address, unique across all accounts (exact match as stored)
    pub email: String,
    /// one-way salted password hash; the plaintext is never persisted
    pub password_hash: String,
    /// first name
    pub first_name: String,
    /// last name
    pub last_name: String,
    /// authorization role
    pub role: Role,
    /// lifecycle status
    pub status: AccountStatus,
    /// email verification flag
    pub is_email_verified: bool,
    /// opaque verification token, present only while verification is pending
    pub verification_token: Option<String>,
    /// absolute expiry of the verification token
    pub token_expiry: Option<DateTime<Utc>>,
    /// account creation time
    pub created_at: DateTime<Utc>,
    /// last update time
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Combined display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Employee".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!("customer".parse::<Role>().unwrap(), Role::Customer);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn roles_map_to_dashboards() {
        assert_eq!(Role::Customer.dashboard_path(), "/users/dashboard");
        assert_eq!(Role::Employee.dashboard_path(), "/users/emp-dashboard");
        assert_eq!(Role::Admin.dashboard_path(), "/users/adminDashboard");
    }
}
