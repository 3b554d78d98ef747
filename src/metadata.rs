//! Request metadata and idempotency keys.

use crate::headers::IDEMPOTENCY_KEY;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use rand::Rng;
use std::fmt;

/// Metadata for one logical request.
///
/// Holds everything except the body: method, path relative to the base URL,
/// per-call headers and query parameters. Query parameters keep insertion order.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path (relative to the base URL).
    pub path: String,

    /// Per-call headers. These take precedence over every configured header.
    pub headers: HeaderMap,

    /// Query parameters, in the order they are appended to the URL.
    pub query_params: Vec<(String, String)>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query_params: Vec::new(),
        }
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let (name, value) = crate::config::parse_header(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Attaches an `Idempotency-Key` header.
    ///
    /// The same key is sent on every retry of the call.
    pub fn with_idempotency_key(mut self, key: &IdempotencyKey) -> Self {
        self.headers
            .insert(HeaderName::from_static(IDEMPOTENCY_KEY), key.header_value());
        self
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Adds multiple query parameters to the request.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Replaces every query parameter named `key` with a single `key=value`.
    pub(crate) fn set_query_param(&mut self, key: &str, value: impl Into<String>) {
        self.query_params.retain(|(k, _)| k != key);
        self.query_params.push((key.to_string(), value.into()));
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

/// Caller-chosen token identifying one logical mutating operation.
///
/// Visible ASCII only, so it is always a valid header value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Wraps a caller-supplied key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if the key
    /// is empty or contains characters outside visible ASCII.
    pub fn new(key: impl Into<String>) -> Result<Self, crate::Error> {
        let key = key.into();
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(crate::Error::Configuration(format!(
                "Invalid idempotency key: {:?}",
                key
            )));
        }
        Ok(Self(key))
    }

    /// Generates a random 128-bit key rendered as 32 hex characters.
    pub fn generate() -> Self {
        let value: u128 = rand::thread_rng().gen();
        Self(format!("{:032x}", value))
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn header_value(&self) -> HeaderValue {
        // Visible ASCII is always a valid header value.
        HeaderValue::from_str(&self.0).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for IdempotencyKey {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_keep_order() {
        let metadata = RequestMetadata::new(Method::GET, "/items")
            .with_query_param("b", "2")
            .with_query_param("a", "1");
        assert_eq!(
            metadata.query_params,
            vec![("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn set_query_param_replaces() {
        let mut metadata = RequestMetadata::new(Method::GET, "/items")
            .with_query_param("page", "1")
            .with_query_param("filter", "red");
        metadata.set_query_param("page", "2");
        assert_eq!(
            metadata.query_params,
            vec![
                ("filter".to_string(), "red".to_string()),
                ("page".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn idempotency_key_header() {
        let key = IdempotencyKey::new("order-77").unwrap();
        let metadata = RequestMetadata::new(Method::POST, "/orders").with_idempotency_key(&key);
        assert_eq!(metadata.headers["idempotency-key"], "order-77");
    }

    #[test]
    fn idempotency_key_validation() {
        assert!(IdempotencyKey::new("").is_err());
        assert!(IdempotencyKey::new("has space").is_err());
        assert!(IdempotencyKey::try_from("ok-key_1").is_ok());
    }

    #[test]
    fn generated_keys_are_distinct_hex() {
        let a = IdempotencyKey::generate();
        let b = IdempotencyKey::generate();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn with_header_rejects_invalid() {
        assert!(RequestMetadata::default().with_header("bad name", "v").is_err());
    }
}
