use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;

use crate::auth::token::generate_session_id;
use crate::error::{AuthError, Result};
use crate::models::session::Principal;

/// Server-held session entry bound to one browser session identifier
#[derive(Debug, Clone)]
struct SessionEntry {
    principal: Principal,
    last_seen: DateTime<Utc>,
}

/// Process-held session store. Sessions expire after a fixed idle
/// window; the window is refreshed on every successful read.
pub struct SessionManager {
    sessions: TokioMutex<HashMap<String, SessionEntry>>,
    idle_window: Duration,
}

impl SessionManager {
    /// Create a session manager with the given idle expiry in minutes
    pub fn new(idle_minutes: i64) -> Self {
        Self {
            sessions: TokioMutex::new(HashMap::new()),
            idle_window: Duration::minutes(idle_minutes),
        }
    }

    /// Bind a principal to a fresh opaque session identifier
    pub async fn start_session(&self, principal: Principal) -> String {
        let session_id = generate_session_id();
        let entry = SessionEntry {
            principal,
            last_seen: Utc::now(),
        };

        let mut sessions = self.sessions.lock().await;
        sessions.insert(session_id.clone(), entry);
        debug!("Session started, {} live sessions", sessions.len());
        session_id
    }

    /// Return the bound principal, or None when the session is unknown
    /// or idle-expired. A hit refreshes the idle window.
    pub async fn current_principal(&self, session_id: &str) -> Option<Principal> {
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();

        match sessions.get_mut(session_id) {
            Some(entry) if now - entry.last_seen <= self.idle_window => {
                entry.last_seen = now;
                Some(entry.principal.clone())
            }
            Some(_) => {
                // passive expiry, checked at read time
                sessions.remove(session_id);
                None
            }
            None => None,
        }
    }

    /// Destroy the session entry
    pub async fn end_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        match sessions.remove(session_id) {
            Some(_) => Ok(()),
            None => Err(AuthError::SessionTeardown(format!(
                "No session entry for id {}",
                session_id
            ))),
        }
    }

    /// Drop every live session bound to an account. Called when an
    /// account is archived or its role changes, so stale privileges
    /// never outlive the mutation.
    pub async fn revoke_account(&self, account_id: &str) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.principal.account_id != account_id);
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Role;

    fn principal(account_id: &str) -> Principal {
        Principal {
            account_id: account_id.to_string(),
            name: "Test User".to_string(),
            email: "t@x.com".to_string(),
            role: Role::Customer,
            is_email_verified: true,
        }
    }

    #[tokio::test]
    async fn session_round_trip() {
        let manager = SessionManager::new(15);
        let sid = manager.start_session(principal("acct-1")).await;

        let found = manager.current_principal(&sid).await.unwrap();
        assert_eq!(found.account_id, "acct-1");

        manager.end_session(&sid).await.unwrap();
        assert!(manager.current_principal(&sid).await.is_none());
    }

    #[tokio::test]
    async fn teardown_of_unknown_session_fails() {
        let manager = SessionManager::new(15);
        let err = manager.end_session("nope").await.unwrap_err();
        assert!(matches!(err, AuthError::SessionTeardown(_)));
    }

    #[tokio::test]
    async fn idle_expiry_drops_session() {
        // zero-minute window: any elapsed time expires the entry
        let manager = SessionManager::new(0);
        let sid = manager.start_session(principal("acct-1")).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(manager.current_principal(&sid).await.is_none());
    }

    #[tokio::test]
    async fn revoke_drops_all_sessions_for_account() {
        let manager = SessionManager::new(15);
        let a1 = manager.start_session(principal("acct-1")).await;
        let a2 = manager.start_session(principal("acct-1")).await;
        let b = manager.start_session(principal("acct-2")).await;

        assert_eq!(manager.revoke_account("acct-1").await, 2);
        assert!(manager.current_principal(&a1).await.is_none());
        assert!(manager.current_principal(&a2).await.is_none());
        assert!(manager.current_principal(&b).await.is_some());
    }
}
