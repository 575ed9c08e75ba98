use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::constants::DEFAULT_CORS_MAX_AGE_SECS;
use crate::config::settings::ServerConfig;
use crate::error::{AuthError, Result};
use crate::server::app_state::AppState;
use crate::server::http;

/// Start the HTTP server with the full middleware stack and route table
pub async fn start_server(config: &ServerConfig, app_state: Arc<AppState>) -> Result<()> {
    let addr = config
        .address()
        .map_err(|e| AuthError::Config(format!("Invalid listen address: {}", e)))?;
    info!("Starting HTTP server on {}", addr);

    let app_state_clone = app_state.clone();

    HttpServer::new(move || {
        App::new()
            // App data
            .app_data(web::Data::new(app_state_clone.clone()))
            // Middleware stack
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
                    .add(("X-Content-Type-Options", "nosniff")),
            )
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(DEFAULT_CORS_MAX_AGE_SECS as usize),
            )
            // Health endpoint
            .service(http::health_check)
            // Public account routes
            .service(http::register_form)
            .service(http::register)
            .service(http::verify_email)
            .service(http::login_form)
            .service(http::login)
            // Session routes
            .service(http::logout)
            .service(http::dashboard)
            .service(http::employee_dashboard)
            .service(http::admin_dashboard)
            .service(http::reports)
            // Admin mutations
            .service(http::update_role)
            .service(http::archive_employee)
    })
    .workers(config.worker_threads)
    .keep_alive(Duration::from_secs(75))
    .shutdown_timeout(30)
    .bind(addr)
    .map_err(|e| AuthError::Internal(format!("Failed to bind HTTP server: {}", e)))?
    .run()
    .await
    .map_err(|e| AuthError::Internal(format!("HTTP server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
