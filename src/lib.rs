// Core module definitions
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod session;
pub mod storage;

// Unified error handling
pub use error::{AuthError, Result};

// Essential re-exports for convenience
pub use config::settings::{Config, DatabaseConfig, ServerConfig};
pub use server::{app_state::AppState, startup::start_server};

// Storage abstractions
pub use storage::{
    init_storage, memory::MemoryStore, mysql::MySqlStore, AccountStore, StorageError,
    TokenConsume,
};

// Model exports
pub use models::{
    account::{Account, AccountStatus, Role},
    session::Principal,
};

// Service exports
pub use services::{AccountService, AuthService};
pub use session::SessionManager;
