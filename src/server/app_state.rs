use std::sync::Arc;

use crate::config::settings::Config;
use crate::services::mailer::{LogMailer, Mailer};
use crate::services::{AccountService, AuthService};
use crate::session::SessionManager;
use crate::storage::memory::MemoryStore;
use crate::storage::AccountStore;

/// Shared application state: the injected store and the services built
/// on top of it. Cloned per worker behind an Arc.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn AccountStore>,
    pub accounts: AccountService,
    pub auth: AuthService,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn AccountStore>, mailer: Arc<dyn Mailer>) -> Self {
        let accounts = AccountService::new(
            storage.clone(),
            mailer,
            config.server.public_url.clone(),
        );
        let auth = AuthService::new(storage.clone());
        let sessions = SessionManager::new(config.session.idle_minutes);

        Self {
            config,
            storage,
            accounts,
            auth,
            sessions,
        }
    }

    /// Memory-backed state with a logging mailer, for tests and local runs
    pub fn with_memory_storage() -> Self {
        let storage: Arc<dyn AccountStore> = Arc::new(MemoryStore::new());
        Self::new(Config::default(), storage, Arc::new(LogMailer))
    }
}
