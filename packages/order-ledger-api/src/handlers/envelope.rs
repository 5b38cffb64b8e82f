//! JSON bodies: the dashboard in `?format=json` and every failed request.

use serde::Serialize;

use crate::router::RouterError;

/// `{"success": true, "data": ..}` or `{"success": false, "error": ..}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(err: &RouterError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody::from(err)),
        }
    }
}

/// Error part of a failed response. `code` is the HTTP status as text.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&RouterError> for ErrorBody {
    fn from(err: &RouterError) -> Self {
        // Internal details stay in the logs, not in the body
        let (message, details) = match err {
            RouterError::InternalError(_) => ("Internal Server Error".to_string(), None),
            RouterError::NotFound(msg) => ("Not Found".to_string(), Some(msg.clone())),
            other => (other.to_string(), None),
        };
        Self {
            code: err.status().to_string(),
            message,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_has_no_error_key() {
        let json = serde_json::to_value(Envelope::ok(3)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 3}));
    }

    #[test]
    fn test_failure_hides_internal_details() {
        let err = RouterError::InternalError("disk path /srv/data".to_string());
        let json = serde_json::to_value(Envelope::failure(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": {"code": "500", "message": "Internal Server Error"}
            })
        );
    }

    #[test]
    fn test_failure_keeps_not_found_details() {
        let err = RouterError::NotFound("No route found for /x".to_string());
        let json = serde_json::to_value(Envelope::failure(&err)).unwrap();
        assert_eq!(json["error"]["code"], "404");
        assert_eq!(json["error"]["details"], "No route found for /x");

        let json = serde_json::to_value(Envelope::failure(&RouterError::PayloadTooLarge)).unwrap();
        assert_eq!(json["error"]["message"], "Payload Too Large");
        assert!(json["error"].get("details").is_none());
    }
}
