// Module declarations
pub mod account_service;
pub mod auth_service;
pub mod mailer;

// Public re-exports
pub use account_service::AccountService;
pub use auth_service::AuthService;
pub use mailer::{build_mailer, LogMailer, Mailer, SmtpMailer};
