//! Password login and session cookie handling.

use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Request, Response};

use order_ledger_core::config::OrderMode;

use crate::auth::{unix_now, SESSION_COOKIE};
use crate::pages;
use crate::router::{AppState, RouterError};

use super::request_utils::{cookie_value, html_response, read_form, redirect};

/// Password field of the login form.
pub const PASSWORD_FIELD: &str = "senha";

/// Whether the request carries a valid, unexpired session cookie.
pub fn is_authenticated(headers: &HeaderMap, state: &AppState) -> bool {
    cookie_value(headers, SESSION_COOKIE)
        .is_some_and(|token| state.sessions.verify(token, unix_now()))
}

fn landing_page(state: &AppState) -> &'static str {
    match state.config.mode {
        OrderMode::Ledger => "/empresa-area",
        OrderMode::PerCustomer => "/admin",
    }
}

/// Renders the login form, or skips it for an existing session.
///
/// # Endpoint
/// `GET /login`
pub async fn login_form<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    if is_authenticated(req.headers(), state) {
        return redirect(landing_page(state), None);
    }
    html_response(200, pages::login(false))
}

/// Checks the submitted password and starts a session.
///
/// # Endpoint
/// `POST /login`
///
/// # Request Body
/// `senha=<password>` (form encoded)
///
/// # Response
/// - **303 See Other**: to the admin page with a signed session cookie
/// - **401 Unauthorized**: login form with an error message
pub async fn login<B>(req: Request<B>, state: &AppState) -> Result<Response<Bytes>, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let config = &state.config;
    let fields = read_form(req, config.request_timeout_ms, config.max_form_bytes).await?;
    let password = fields.get(PASSWORD_FIELD).map(String::as_str).unwrap_or("");

    if !state.admin.password_matches(password) {
        tracing::warn!("Failed admin login attempt");
        return html_response(401, pages::login(true));
    }

    tracing::info!("Admin session started");
    let token = state.sessions.issue(unix_now());
    redirect(
        landing_page(state),
        Some(state.sessions.set_cookie_header(&token)),
    )
}

/// Ends the session.
///
/// # Endpoint
/// `GET /logout`
pub async fn logout<B>(_req: Request<B>, state: &AppState) -> Result<Response<Bytes>, RouterError> {
    redirect("/login", Some(state.sessions.clear_cookie_header()))
}
