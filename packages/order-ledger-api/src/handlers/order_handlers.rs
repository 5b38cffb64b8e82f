//! Customer-facing order form endpoints.

use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use order_ledger_core::config::OrderMode;
use order_ledger_core::order::now_timestamp;
use order_ledger_core::submission::{build_item_order, build_order};

use crate::pages;
use crate::router::{AppState, RouterError};

use super::request_utils::{
    html_response, map_ledger_error_to_router_error, query_params, read_form, redirect,
    text_response,
};

/// Plain-text reply of the single-item flow.
pub const ITEM_ORDER_ACCEPTED: &str = "Pedido enviado com sucesso!";

/// Renders the order form.
///
/// # Endpoint
/// `GET /`
///
/// # Response
/// - **200 OK**: HTML form for the configured mode. In ledger mode
///   `?sucesso=1` adds a confirmation banner.
pub async fn index<B>(req: Request<B>, state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let catalog = state.config.mode.catalog();
    let html = match state.config.mode {
        OrderMode::Ledger => {
            let success = query_params(req.uri())
                .get("sucesso")
                .is_some_and(|v| v == "1");
            pages::order_form(&catalog, success)
        }
        OrderMode::PerCustomer => pages::item_form(&catalog),
    };
    html_response(200, html)
}

/// Accepts an order submission.
///
/// # Endpoint
/// `POST /enviar`
///
/// # Request Body
/// `application/x-www-form-urlencoded`. Ledger mode: `nome`, `azul_<size>`,
/// `preta_<size>`. Per-customer mode: `nome`, `cor`, `tamanho`, `quantidade`.
///
/// # Response
/// - **303 See Other** to `/?sucesso=1` once the ledger row is written
///   (ledger mode)
/// - **200 OK** plain-text confirmation (per-customer mode)
/// - **303 See Other** to `/` when the name is blank or the colour/size is
///   not offered; nothing is written
///
/// # Errors
/// - **408 Request Timeout**: body or writer reply took too long
/// - **413 Payload Too Large**: body over the configured limit
/// - **500 Internal Server Error**: the write failed
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:8080/enviar -d 'nome=Ana&azul_36=3'
/// ```
pub async fn submit_order<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let config = &state.config;
    let fields = read_form(req, config.request_timeout_ms, config.max_form_bytes).await?;
    let catalog = config.mode.catalog();

    match config.mode {
        OrderMode::Ledger => {
            let order = match build_order(&fields, &catalog, now_timestamp()) {
                Ok(order) => order,
                Err(e) => {
                    tracing::debug!("Order rejected: {}", e);
                    return redirect("/", None);
                }
            };
            state
                .writer
                .append_order(order)
                .await
                .map_err(map_ledger_error_to_router_error)?;
            redirect("/?sucesso=1", None)
        }
        OrderMode::PerCustomer => {
            let order = match build_item_order(&fields, &catalog, now_timestamp()) {
                Ok(order) => order,
                Err(e) => {
                    tracing::debug!("Item order rejected: {}", e);
                    return redirect("/", None);
                }
            };
            state
                .writer
                .write_item_order(order)
                .await
                .map_err(map_ledger_error_to_router_error)?;
            text_response(200, ITEM_ORDER_ACCEPTED)
        }
    }
}
