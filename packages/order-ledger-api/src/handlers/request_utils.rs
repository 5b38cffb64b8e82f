//! Request and response utilities for HTTP endpoints.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use hyper::{HeaderMap, Request, Response, Uri};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tokio::time;

use order_ledger_core::error::LedgerError;
use order_ledger_core::submission::FormFields;

use crate::router::RouterError;

/// Reads the request body with a timeout and a size limit.
pub async fn read_request_body_with_timeout<B>(
    body: B,
    timeout_ms: u64,
    max_bytes: usize,
) -> Result<Bytes, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let collected = time::timeout(timeout_duration, Limited::new(body, max_bytes).collect())
        .await
        .map_err(|_| RouterError::Timeout)?;

    match collected {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(RouterError::PayloadTooLarge)
        }
        Err(e) => Err(RouterError::BadRequest(format!(
            "Failed to read request body: {}",
            e
        ))),
    }
}

/// Decodes an `application/x-www-form-urlencoded` body.
pub async fn read_form<B>(
    req: Request<B>,
    timeout_ms: u64,
    max_bytes: usize,
) -> Result<FormFields, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = read_request_body_with_timeout(req.into_body(), timeout_ms, max_bytes).await?;
    Ok(parse_urlencoded(&String::from_utf8_lossy(&bytes)))
}

/// Parses `a=1&b=x+y` pairs. The first occurrence of a key wins.
pub fn parse_urlencoded(input: &str) -> FormFields {
    let mut fields = FormFields::new();
    for pair in input.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        fields.entry(key).or_insert_with(|| decode_component(value));
    }
    fields
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Query string parameters of a request URI.
pub fn query_params(uri: &Uri) -> FormFields {
    uri.query().map(parse_urlencoded).unwrap_or_default()
}

/// Value of one cookie from the `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Runs blocking file work on tokio's blocking pool.
pub async fn run_blocking<T, F>(work: F) -> Result<T, RouterError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| RouterError::InternalError(format!("Blocking task failed: {}", e)))
}

/// Map LedgerError to appropriate RouterError
pub fn map_ledger_error_to_router_error(e: LedgerError) -> RouterError {
    match e {
        LedgerError::Timeout => RouterError::Timeout,
        LedgerError::InvalidFileName(name) => {
            RouterError::NotFound(format!("No order file named {}", name))
        }
        LedgerError::WriterUnavailable(msg) => RouterError::ServiceUnavailable(msg),
        other => RouterError::InternalError(format!("Ledger error: {}", other)),
    }
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(
    status: u16,
    content_type: &str,
    body: impl Into<Bytes>,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

pub fn html_response(status: u16, html: String) -> Result<Response<Bytes>, RouterError> {
    build_response(status, "text/html; charset=utf-8", html)
}

pub fn text_response(status: u16, text: &'static str) -> Result<Response<Bytes>, RouterError> {
    build_response(status, "text/plain; charset=utf-8", text)
}

pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(data)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(status, "application/json", json)
}

/// 303 See Other to `location`, optionally setting a cookie.
pub fn redirect(location: &str, set_cookie: Option<String>) -> Result<Response<Bytes>, RouterError> {
    let mut builder = Response::builder().status(303).header(LOCATION, location);
    if let Some(cookie) = set_cookie {
        builder = builder.header(SET_COOKIE, cookie);
    }
    builder
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// File download with `Content-Disposition: attachment`.
pub fn attachment(
    bytes: Vec<u8>,
    file_name: &str,
    content_type: &str,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(200)
        .header(CONTENT_TYPE, content_type)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Bytes::from(bytes))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use http_body_util::Full;
    use hyper::header::HeaderValue;

    use super::*;

    #[test]
    fn test_parse_urlencoded() {
        let fields = parse_urlencoded("nome=Ana+Maria&azul_36=3&nome=Outra&preta_38=&flag&=x");
        assert_eq!(fields.get("nome").unwrap(), "Ana Maria");
        assert_eq!(fields.get("azul_36").unwrap(), "3");
        assert_eq!(fields.get("preta_38").unwrap(), "");
        assert_eq!(fields.get("flag").unwrap(), "");
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_parse_urlencoded_percent_decoding() {
        let fields = parse_urlencoded("nome=Jo%C3%A3o%20%2B%20Cia&x=%ZZ");
        assert_eq!(fields.get("nome").unwrap(), "João + Cia");
        assert_eq!(fields.get("x").unwrap(), "%ZZ");
    }

    #[test]
    fn test_query_params() {
        let uri: Uri = "/?sucesso=1&format=json".parse().unwrap();
        let params = query_params(&uri);
        assert_eq!(params.get("sucesso").unwrap(), "1");
        assert_eq!(params.get("format").unwrap(), "json");
        assert!(query_params(&"/".parse().unwrap()).is_empty());
    }

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; pedidos_session=abc.1"));
        headers.append(COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(cookie_value(&headers, "pedidos_session"), Some("abc.1"));
        assert_eq!(cookie_value(&headers, "other"), Some("1"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_map_ledger_error_to_router_error() {
        assert!(matches!(
            map_ledger_error_to_router_error(LedgerError::Timeout),
            RouterError::Timeout
        ));
        assert!(matches!(
            map_ledger_error_to_router_error(LedgerError::InvalidFileName("x".into())),
            RouterError::NotFound(_)
        ));
        assert!(matches!(
            map_ledger_error_to_router_error(LedgerError::WriterUnavailable("gone".into())),
            RouterError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            map_ledger_error_to_router_error(LedgerError::DiskFull("full".into())),
            RouterError::InternalError(_)
        ));
    }

    #[tokio::test]
    async fn test_run_blocking() {
        assert_eq!(run_blocking(|| 6 * 7).await.unwrap(), 42);

        let failed = run_blocking(|| -> u8 { panic!("worker failed") }).await;
        assert!(matches!(failed, Err(RouterError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let body = Full::new(Bytes::from(vec![b'a'; 100]));
        let result = read_request_body_with_timeout(body, 1000, 10).await;
        assert!(matches!(result, Err(RouterError::PayloadTooLarge)));

        let body = Full::new(Bytes::from_static(b"nome=Ana"));
        let bytes = read_request_body_with_timeout(body, 1000, 10).await.unwrap();
        assert_eq!(&bytes[..], b"nome=Ana");
    }
}
