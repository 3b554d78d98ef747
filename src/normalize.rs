//! Conversion of terminal error responses into [`NormalizedError`].

use crate::error::NormalizedError;
use crate::headers::X_REQUEST_ID;
use http::{HeaderMap, StatusCode};
use serde_json::{Map, Value};

/// Builds a [`NormalizedError`] from a terminal response.
///
/// The body is read as a JSON object with optional `message`, `code`, `details`
/// and `requestId` fields. When the body is empty or not a JSON object only the
/// status-derived message and the `X-Request-Id` header are used. A body
/// `requestId` takes precedence over the header.
///
/// # Examples
///
/// ```
/// use http::{HeaderMap, StatusCode};
/// use resilient_client::normalize::normalize_error;
///
/// let body = br#"{"message":"bad","code":"X1","requestId":"r1"}"#;
/// let err = normalize_error(StatusCode::BAD_REQUEST, body, &HeaderMap::new());
///
/// assert_eq!(err.message, "bad");
/// assert_eq!(err.status, Some(400));
/// assert_eq!(err.code.as_deref(), Some("X1"));
/// assert_eq!(err.request_id.as_deref(), Some("r1"));
/// ```
pub fn normalize_error(status: StatusCode, body: &[u8], headers: &HeaderMap) -> NormalizedError {
    let header_request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let fallback_message = format!("Request failed with status {}", status.as_u16());

    let Some(object) = parse_object(body) else {
        return NormalizedError {
            message: fallback_message,
            status: Some(status.as_u16()),
            code: None,
            details: None,
            request_id: header_request_id,
        };
    };

    NormalizedError {
        message: string_field(&object, "message").unwrap_or(fallback_message),
        status: Some(status.as_u16()),
        code: string_field(&object, "code"),
        details: object.get("details").filter(|v| !v.is_null()).cloned(),
        request_id: string_field(&object, "requestId").or(header_request_id),
    }
}

fn parse_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key)?.as_str().map(str::to_string)
}
