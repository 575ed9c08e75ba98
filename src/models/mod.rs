pub mod account;
pub mod session;

// re-export types from parent modules
pub use account::{Account, AccountStatus, Role};
pub use session::Principal;
