//! Fixed values shared across the server.

/// Default HTTP listen port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Verification token lifetime in minutes (1 hour)
pub const VERIFICATION_TOKEN_TTL_MINUTES: i64 = 60;

/// Session idle expiry in minutes
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 15;

/// Session cookie name
pub const SESSION_COOKIE: &str = "pos_session";

/// bcrypt work factor
pub const BCRYPT_COST: u32 = 12;

/// CORS preflight cache lifetime in seconds
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 3600;
