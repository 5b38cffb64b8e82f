//! Administrative views: dashboard, ledger download and order files.

use hyper::body::Bytes;
use hyper::{Request, Response};

use order_ledger_core::aggregate::Dashboard;
use order_ledger_core::error::LedgerError;

use crate::pages;
use crate::router::{AppState, RouterError};

use super::auth_handlers::is_authenticated;
use super::envelope::Envelope;
use super::request_utils::{
    attachment, html_response, json_response, map_ledger_error_to_router_error, query_params,
    redirect, run_blocking,
};

/// Download name of the ledger file.
pub const LEDGER_DOWNLOAD_NAME: &str = "pedidos.csv";

async fn load_dashboard(state: &AppState) -> Result<Dashboard, RouterError> {
    let ledger = state.ledger.clone();
    run_blocking(move || Dashboard::build(&ledger.load())).await
}

fn check_url_secret(secret: &str, state: &AppState) -> Result<(), RouterError> {
    if state.admin.url_secret_matches(secret) {
        Ok(())
    } else {
        tracing::warn!("Admin URL requested with a wrong secret");
        Err(RouterError::NotFound("No route found".to_string()))
    }
}

/// Admin dashboard behind the URL secret.
///
/// # Endpoint
/// `GET /empresa/{secret}`
///
/// # Response
/// - **200 OK**: HTML page with totals per colour, order count and the order
///   list (newest first). With `?format=json` the same data is returned as
///   ```json
///   {
///     "success": true,
///     "data": {
///       "orders": [{"timestamp": "...", "customer_name": "Ana",
///                   "total_per_variant": {"azul": 3, "preta": 0},
///                   "total_overall": 3}],
///       "totals": {"azul": 3, "preta": 0},
///       "order_count": 1
///     }
///   }
///   ```
///
/// # Errors
/// - **404 Not Found**: wrong secret
pub async fn dashboard<B>(
    req: Request<B>,
    secret: &str,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    check_url_secret(secret, state)?;

    let dashboard = load_dashboard(state).await?;
    let wants_json = query_params(req.uri())
        .get("format")
        .is_some_and(|f| f == "json");
    if wants_json {
        return json_response(200, &Envelope::ok(dashboard));
    }

    let download = format!("/empresa/{}/download", secret);
    html_response(200, pages::dashboard(&dashboard, Some(&download)))
}

/// Ledger file download behind the URL secret.
///
/// # Endpoint
/// `GET /empresa/{secret}/download`
///
/// # Response
/// - **200 OK**: the ledger as a `text/csv` attachment
/// - **303 See Other**: back to the dashboard when no order exists yet
///
/// # Errors
/// - **404 Not Found**: wrong secret
pub async fn download_ledger<B>(
    _req: Request<B>,
    secret: &str,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    check_url_secret(secret, state)?;

    let ledger = state.ledger.clone();
    match run_blocking(move || ledger.read_bytes())
        .await?
        .map_err(map_ledger_error_to_router_error)?
    {
        Some(bytes) => attachment(bytes, LEDGER_DOWNLOAD_NAME, "text/csv; charset=utf-8"),
        None => redirect(&format!("/empresa/{}", secret), None),
    }
}

/// Dashboard copy for logged-in sessions.
///
/// # Endpoint
/// `GET /empresa-area`
///
/// # Response
/// - **200 OK**: same figures as the secret-URL dashboard, without the
///   download link
/// - **303 See Other**: to `/login` without a valid session
pub async fn company_area<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    if !is_authenticated(req.headers(), state) {
        return redirect("/login", None);
    }
    let dashboard = load_dashboard(state).await?;
    html_response(200, pages::dashboard(&dashboard, None))
}

/// Lists per-customer order files.
///
/// # Endpoint
/// `GET /admin`
///
/// # Response
/// - **200 OK**: HTML table of order files, newest first
/// - **303 See Other**: to `/login` without a valid session
pub async fn order_files<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    if !is_authenticated(req.headers(), state) {
        return redirect("/login", None);
    }
    let store = state.order_files.clone();
    let files = run_blocking(move || store.list()).await?;
    html_response(200, pages::order_files(&files))
}

/// Downloads one per-customer order file.
///
/// # Endpoint
/// `GET /download/{file}`
///
/// # Response
/// - **200 OK**: the order file as a `text/csv` attachment
/// - **303 See Other**: to `/login` without a valid session, or to `/admin`
///   when the file does not exist
///
/// # Errors
/// - **404 Not Found**: the name is not a plain order file name
pub async fn download_order_file<B>(
    req: Request<B>,
    file_name: &str,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    if !is_authenticated(req.headers(), state) {
        return redirect("/login", None);
    }

    let store = state.order_files.clone();
    let name = file_name.to_string();
    match run_blocking(move || store.read_file(&name)).await? {
        Ok(Some(bytes)) => attachment(bytes, file_name, "text/csv; charset=utf-8"),
        Ok(None) => redirect("/admin", None),
        Err(e @ LedgerError::InvalidFileName(_)) => {
            tracing::warn!("Rejected order file request: {}", e);
            Err(map_ledger_error_to_router_error(e))
        }
        Err(e) => Err(map_ledger_error_to_router_error(e)),
    }
}
