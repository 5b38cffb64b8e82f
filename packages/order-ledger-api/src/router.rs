//! Matchit routing configuration.

use std::sync::Arc;

use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use matchit::Router as MatchitRouter;

use order_ledger_core::config::{LedgerConfig, OrderMode};
use order_ledger_core::persistence::{LedgerStore, OrderFileStore};
use order_ledger_runtime::WriterHandle;

use crate::auth::{AdminConfig, SessionSigner};
use crate::handlers;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<LedgerConfig>,
    /// Admin secrets
    pub admin: Arc<AdminConfig>,
    /// Session cookie signer
    pub sessions: SessionSigner,
    /// Read side of the shared ledger
    pub ledger: LedgerStore,
    /// Read side of the per-customer order files
    pub order_files: OrderFileStore,
    /// Write requests go through the single writer
    pub writer: WriterHandle,
}

impl AppState {
    pub fn new(config: Arc<LedgerConfig>, admin: Arc<AdminConfig>, writer: WriterHandle) -> Self {
        Self {
            sessions: admin.signer(),
            ledger: LedgerStore::new(&config),
            order_files: OrderFileStore::new(&config),
            config,
            admin,
            writer,
        }
    }
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a router with the routes of the configured order mode.
    pub fn new(state: AppState) -> Self {
        let mut router = MatchitRouter::new();

        // Customer-facing form
        router
            .insert("/", RouteHandler::Index)
            .expect("Failed to insert / route");
        router
            .insert("/enviar", RouteHandler::Submit)
            .expect("Failed to insert /enviar route");

        // Session login
        router
            .insert("/login", RouteHandler::Login)
            .expect("Failed to insert /login route");
        router
            .insert("/logout", RouteHandler::Logout)
            .expect("Failed to insert /logout route");

        match state.config.mode {
            OrderMode::Ledger => {
                router
                    .insert("/empresa/{secret}", RouteHandler::Dashboard)
                    .expect("Failed to insert /empresa/{secret} route");
                router
                    .insert("/empresa/{secret}/download", RouteHandler::DownloadLedger)
                    .expect("Failed to insert /empresa/{secret}/download route");
                router
                    .insert("/empresa-area", RouteHandler::CompanyArea)
                    .expect("Failed to insert /empresa-area route");
            }
            OrderMode::PerCustomer => {
                router
                    .insert("/admin", RouteHandler::OrderFiles)
                    .expect("Failed to insert /admin route");
                router
                    .insert("/download/{file}", RouteHandler::DownloadOrderFile)
                    .expect("Failed to insert /download/{file} route");
            }
        }

        Self {
            inner: router,
            state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = req.uri().path().to_string();
        tracing::debug!("{} {}", req.method(), path);

        match self.inner.at(&path) {
            Ok(matched) => {
                matched
                    .value
                    .handle(req, &matched.params, &self.state)
                    .await
            }
            Err(_) => Err(RouterError::NotFound(format!("No route found for {}", path))),
        }
    }
}

/// Route handler function.
enum RouteHandler {
    Index,
    Submit,
    Login,
    Logout,
    Dashboard,
    DownloadLedger,
    CompanyArea,
    OrderFiles,
    DownloadOrderFile,
}

impl RouteHandler {
    /// Handles a request with the given route parameters.
    async fn handle<B>(
        &self,
        req: Request<B>,
        params: &matchit::Params<'_, '_>,
        state: &AppState,
    ) -> Result<Response<Bytes>, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let param = |name: &str| params.get(name).unwrap_or_default().to_string();

        match (self, method) {
            (RouteHandler::Index, Method::GET) => handlers::index(req, state).await,
            (RouteHandler::Submit, Method::POST) => handlers::submit_order(req, state).await,
            (RouteHandler::Login, Method::GET) => handlers::login_form(req, state).await,
            (RouteHandler::Login, Method::POST) => handlers::login(req, state).await,
            (RouteHandler::Logout, Method::GET) => handlers::logout(req, state).await,
            (RouteHandler::Dashboard, Method::GET) => {
                handlers::dashboard(req, &param("secret"), state).await
            }
            (RouteHandler::DownloadLedger, Method::GET) => {
                handlers::download_ledger(req, &param("secret"), state).await
            }
            (RouteHandler::CompanyArea, Method::GET) => handlers::company_area(req, state).await,
            (RouteHandler::OrderFiles, Method::GET) => handlers::order_files(req, state).await,
            (RouteHandler::DownloadOrderFile, Method::GET) => {
                handlers::download_order_file(req, &param("file"), state).await
            }
            _ => Err(RouterError::MethodNotAllowed),
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge,
    ServiceUnavailable(String),
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RouterError::PayloadTooLarge => write!(f, "Payload Too Large"),
            RouterError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl RouterError {
    pub fn status(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed => 405,
            RouterError::InternalError(_) => 500,
            RouterError::Timeout => 408,
            RouterError::BadRequest(_) => 400,
            RouterError::NotFound(_) => 404,
            RouterError::PayloadTooLarge => 413,
            RouterError::ServiceUnavailable(_) => 503,
        }
    }
}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let body = serde_json::to_vec(&handlers::Envelope::failure(&err)).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\"}}}}",
                e
            )
            .into_bytes()
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Bytes::from("Internal Server Error"));
                *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}
