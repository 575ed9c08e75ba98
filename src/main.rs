use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pos_account_server::{
    config::settings::Config,
    error::Result,
    server::{app_state::AppState, startup::start_server},
    services::mailer::build_mailer,
    storage::init_storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize structured logging
    init_tracing();

    let config = Config::load();
    info!(
        "Starting POS account server v{} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.server.host,
        config.server.port
    );

    // Initialize the injected storage dependency
    let storage = init_storage(&config.database).await?;
    let mailer = build_mailer(&config.smtp)?;

    let app_state = Arc::new(AppState::new(config.clone(), storage, mailer));

    match start_server(&config.server, app_state).await {
        Ok(_) => {
            info!("Server shutdown completed");
            Ok(())
        }
        Err(e) => {
            error!("Server failed: {}", e);
            Err(e)
        }
    }
}

/// Initialize structured logging with optional JSON output
fn init_tracing() {
    let log_level =
        env::var("RUST_LOG").unwrap_or_else(|_| "pos_account_server=info,info".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .compact(),
        );

    // JSON logging for production
    if env::var("LOG_FORMAT").unwrap_or_default() == "json" {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false);

        subscriber.with(json_layer).init();
    } else {
        subscriber.init();
    }

    info!("Structured logging initialized with level: {}", log_level);
}
