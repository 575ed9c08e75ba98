use actix_web::cookie::Cookie;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::guard::{allow, RouteAccess};
use crate::config::constants::SESSION_COOKIE;
use crate::error::AuthError;
use crate::models::session::Principal;
use crate::server::app_state::AppState;

/// Registration form fields
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Role update request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub account_id: String,
    pub role: String,
}

/// Archive request
#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub account_id: String,
}

/// JSON result for state-mutating admin routes
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

/// Resolve the current principal from the session cookie, if any
async fn current_principal(req: &HttpRequest, state: &AppState) -> Option<Principal> {
    let cookie = req.cookie(SESSION_COOKIE)?;
    state.sessions.current_principal(cookie.value()).await
}

/// Fixed denial: 403, no redirect, no session mutation
fn deny() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse {
        success: false,
        message: "Access denied".to_string(),
    })
}

/// Render a user-facing failure without leaking internals
fn render_failure(err: &AuthError) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(err.http_status_code())
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(format!("<html><body><p>{}</p></body></html>", err.user_message()))
}

fn render_page(title: &str, body: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
}

#[get("/users/register")]
pub async fn register_form() -> impl Responder {
    render_page(
        "Register",
        r#"<form method="post" action="/users/register">
            <input name="first_name" placeholder="First name">
            <input name="last_name" placeholder="Last name">
            <input name="email" type="email" placeholder="Email">
            <input name="password" type="password" placeholder="Password">
            <button type="submit">Register</button>
        </form>"#,
    )
}

#[post("/users/register")]
pub async fn register(
    form: web::Form<RegisterForm>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    match state
        .accounts
        .register(&form.email, &form.password, &form.first_name, &form.last_name)
        .await
    {
        Ok(_) => render_page(
            "Registered",
            "<p>Account created. Check your email for a verification link.</p>",
        ),
        Err(e) => {
            warn!("Registration for {} rejected: {}", form.email, e.category());
            render_failure(&e)
        }
    }
}

#[get("/users/verify/{token}")]
pub async fn verify_email(
    path: web::Path<String>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    match state.accounts.verify_email(path.as_str()).await {
        Ok(account) => {
            info!("Email verified for account {}", account.id);
            render_page(
                "Verified",
                "<p>Your email is verified. You can now <a href=\"/users/login\">log in</a>.</p>",
            )
        }
        Err(e) => render_failure(&e),
    }
}

#[get("/users/login")]
pub async fn login_form() -> impl Responder {
    render_page(
        "Login",
        r#"<form method="post" action="/users/login">
            <input name="email" type="email" placeholder="Email">
            <input name="password" type="password" placeholder="Password">
            <button type="submit">Login</button>
        </form>"#,
    )
}

#[post("/users/login")]
pub async fn login(form: web::Form<LoginForm>, state: web::Data<Arc<AppState>>) -> impl Responder {
    match state.auth.login(&form.email, &form.password).await {
        Ok(principal) => {
            let target = principal.role.dashboard_path();
            let session_id = state.sessions.start_session(principal).await;

            let cookie = Cookie::build(SESSION_COOKIE, session_id)
                .path("/")
                .http_only(true)
                .finish();

            HttpResponse::Found()
                .cookie(cookie)
                .append_header(("Location", target))
                .finish()
        }
        Err(e) => {
            warn!("Login for {} failed: {}", form.email, e.category());
            render_failure(&e)
        }
    }
}

#[get("/users/logout")]
pub async fn logout(req: HttpRequest, state: web::Data<Arc<AppState>>) -> impl Responder {
    let cookie = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie,
        None => return deny(),
    };

    match state.sessions.end_session(cookie.value()).await {
        Ok(()) => {
            let mut expired = Cookie::build(SESSION_COOKIE, "").path("/").finish();
            expired.make_removal();
            HttpResponse::Found()
                .cookie(expired)
                .append_header(("Location", "/users/login"))
                .finish()
        }
        Err(e) => {
            error!("Session teardown failed: {}", e);
            render_failure(&e)
        }
    }
}

#[get("/users/dashboard")]
pub async fn dashboard(req: HttpRequest, state: web::Data<Arc<AppState>>) -> impl Responder {
    let Some(principal) = current_principal(&req, &state).await else {
        return deny();
    };
    if !allow(RouteAccess::Authenticated, Some(&principal)) {
        return deny();
    }
    render_page(
        "Dashboard",
        &format!("<h1>Welcome, {}</h1><p>Role: {}</p>", principal.name, principal.role),
    )
}

#[get("/users/emp-dashboard")]
pub async fn employee_dashboard(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let Some(principal) = current_principal(&req, &state).await else {
        return deny();
    };
    if !allow(RouteAccess::Staff, Some(&principal)) {
        return deny();
    }
    render_page(
        "Employee Dashboard",
        &format!("<h1>Employee area</h1><p>Signed in as {}</p>", principal.name),
    )
}

#[get("/users/adminDashboard")]
pub async fn admin_dashboard(req: HttpRequest, state: web::Data<Arc<AppState>>) -> impl Responder {
    let principal = current_principal(&req, &state).await;
    if !allow(RouteAccess::Admin, principal.as_ref()) {
        return deny();
    }

    match state.accounts.list_accounts().await {
        Ok(accounts) => {
            let rows: String = accounts
                .iter()
                .map(|a| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        a.email,
                        a.full_name(),
                        a.role,
                        a.status
                    )
                })
                .collect();
            render_page(
                "Admin Dashboard",
                &format!(
                    "<h1>Accounts</h1><table><tr><th>Email</th><th>Name</th>\
                     <th>Role</th><th>Status</th></tr>{}</table>",
                    rows
                ),
            )
        }
        Err(e) => render_failure(&e),
    }
}

#[get("/users/reports")]
pub async fn reports(req: HttpRequest, state: web::Data<Arc<AppState>>) -> impl Responder {
    let principal = current_principal(&req, &state).await;
    if !allow(RouteAccess::Admin, principal.as_ref()) {
        return deny();
    }
    render_page("Reports", "<h1>Reports</h1><p>Nothing to report yet.</p>")
}

#[post("/users/update-role")]
pub async fn update_role(
    req: HttpRequest,
    body: web::Json<UpdateRoleRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    // admin check applies to the mutation itself, not only the page render
    let principal = current_principal(&req, &state).await;
    if !allow(RouteAccess::Admin, principal.as_ref()) {
        return deny();
    }

    match state.accounts.update_role(&body.account_id, &body.role).await {
        Ok(role) => {
            // a live session must not keep its old privileges
            let dropped = state.sessions.revoke_account(&body.account_id).await;
            if dropped > 0 {
                info!("Revoked {} session(s) for {}", dropped, body.account_id);
            }
            HttpResponse::Ok().json(ApiResponse {
                success: true,
                message: format!("Role updated to {}", role),
            })
        }
        Err(e) => HttpResponse::build(
            actix_web::http::StatusCode::from_u16(e.http_status_code())
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
        )
        .json(ApiResponse {
            success: false,
            message: e.user_message(),
        }),
    }
}

#[post("/users/archive-employee")]
pub async fn archive_employee(
    req: HttpRequest,
    body: web::Json<ArchiveRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let principal = current_principal(&req, &state).await;
    if !allow(RouteAccess::Admin, principal.as_ref()) {
        return deny();
    }

    match state.accounts.archive_employee(&body.account_id).await {
        Ok(()) => {
            let dropped = state.sessions.revoke_account(&body.account_id).await;
            if dropped > 0 {
                info!("Revoked {} session(s) for {}", dropped, body.account_id);
            }
            HttpResponse::Ok().json(ApiResponse {
                success: true,
                message: "Employee archived".to_string(),
            })
        }
        Err(e) => HttpResponse::build(
            actix_web::http::StatusCode::from_u16(e.http_status_code())
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
        )
        .json(ApiResponse {
            success: false,
            message: e.user_message(),
        }),
    }
}

/// Health check response structure
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
}

#[get("/health")]
pub async fn health_check(state: web::Data<Arc<AppState>>) -> impl Responder {
    let healthy = state.storage.health_check().await.unwrap_or(false);
    let response = HealthCheckResponse {
        status: if healthy { "SERVING" } else { "DEGRADED" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    HttpResponse::Ok().json(response)
}
