//! Error types for API calls.
//!
//! Every failure the client can surface is an [`Error`]. Terminal server
//! responses carry a [`NormalizedError`], the single structured shape a failed
//! call is reported in, and any other variant can be projected into that shape
//! with [`Error::normalized`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured description of a failed API call.
///
/// Built once per terminal failure and never mutated afterwards. `status` is
/// absent for failures where no HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    /// Human-readable message, always present.
    pub message: String,
    /// HTTP status code of the terminal response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Server-defined error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Opaque structured details supplied by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Request identifier from the body `requestId` field or the
    /// `X-Request-Id` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl NormalizedError {
    /// Creates an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: None,
            details: None,
            request_id: None,
        }
    }

    /// Sets the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(status) = self.status {
            write!(f, " (status={status})")?;
        }
        if let Some(code) = &self.code {
            write!(f, " (code={code})")?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id={request_id})")?;
        }
        Ok(())
    }
}

impl std::error::Error for NormalizedError {}

/// The main error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use resilient_client::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder("https://api.example.com").build()?;
///
/// match client.get::<serde_json::Value>("/widgets/42").await {
///     Ok(response) => println!("Widget: {:?}", response.data),
///     Err(Error::Api(err)) => {
///         eprintln!("API said no: {} (request id {:?})", err.message, err.request_id);
///     }
///     Err(e) => eprintln!("Other error: {}", e.normalized()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection refused, DNS failure, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A single attempt exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request body could not be encoded as JSON.
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    /// A successful response body could not be decoded into the expected type.
    ///
    /// Preserves the raw body and the serde message for debugging.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    Deserialization {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The server returned a terminal error status.
    #[error("API error: {0}")]
    Api(NormalizedError),

    /// Every attempt failed at the transport layer and the retry budget ran out.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made
        attempts: usize,
        /// The transport error of the final attempt
        last_error: Box<Error>,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The base URL or a request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` for failures where no HTTP response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout)
    }

    /// Returns `true` if the executor would retry this failure while budget remains.
    ///
    /// Transport errors and the statuses 429, 500, 502, 503 and 504 are retryable;
    /// everything else is terminal on first occurrence.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout => true,
            Error::Api(err) => err
                .status
                .is_some_and(crate::backoff::is_retryable_status),
            _ => false,
        }
    }

    /// Returns the HTTP status code if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => err.status.and_then(|s| StatusCode::from_u16(s).ok()),
            Error::Deserialization { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the server request id, if the failure carried one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Api(err) => err.request_id.as_deref(),
            _ => None,
        }
    }

    /// Projects this error into the [`NormalizedError`] shape.
    pub fn normalized(&self) -> NormalizedError {
        match self {
            Error::Api(err) => err.clone(),
            Error::Network(_) | Error::Timeout => {
                NormalizedError::new(format!("Request failed: {self}")).with_code("REQUEST_ERROR")
            }
            Error::MaxRetriesExceeded { .. } => {
                NormalizedError::new("Max retries exceeded").with_code("MAX_RETRIES_EXCEEDED")
            }
            Error::Deserialization { status, .. } => {
                NormalizedError::new(format!("Failed to parse response: {self}"))
                    .with_status(status.as_u16())
                    .with_code("PARSE_ERROR")
            }
            Error::Serialization(_) => NormalizedError::new(self.to_string()).with_code("PARSE_ERROR"),
            Error::Configuration(_) | Error::InvalidUrl(_) => {
                NormalizedError::new(self.to_string()).with_code("CONFIGURATION_ERROR")
            }
        }
    }

    /// Maps a transport failure, separating timeouts from other network errors.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_present_parts_only() {
        let err = NormalizedError {
            message: "bad".to_string(),
            status: Some(400),
            code: Some("X1".to_string()),
            details: None,
            request_id: Some("r1".to_string()),
        };
        assert_eq!(err.to_string(), "bad (status=400) (code=X1) (request_id=r1)");

        let bare = NormalizedError::new("Max retries exceeded");
        assert_eq!(bare.to_string(), "Max retries exceeded");
    }

    #[test]
    fn retryable_classification() {
        let unavailable = Error::Api(NormalizedError::new("down").with_status(503));
        assert!(unavailable.is_retryable());

        let not_found = Error::Api(NormalizedError::new("missing").with_status(404));
        assert!(!not_found.is_retryable());

        let not_implemented = Error::Api(NormalizedError::new("nope").with_status(501));
        assert!(!not_implemented.is_retryable());

        assert!(Error::Timeout.is_retryable());
        assert!(Error::Timeout.is_transport());
        assert!(!Error::Configuration("x".into()).is_retryable());
    }

    #[test]
    fn normalized_projection_codes() {
        let exhausted = Error::MaxRetriesExceeded {
            attempts: 4,
            last_error: Box::new(Error::Timeout),
        };
        let normalized = exhausted.normalized();
        assert_eq!(normalized.message, "Max retries exceeded");
        assert_eq!(normalized.code.as_deref(), Some("MAX_RETRIES_EXCEEDED"));
        assert_eq!(normalized.status, None);

        let timeout = Error::Timeout.normalized();
        assert_eq!(timeout.code.as_deref(), Some("REQUEST_ERROR"));
        assert_eq!(timeout.status, None);

        let decode = Error::Deserialization {
            raw_response: "nope".into(),
            serde_error: "expected value".into(),
            status: StatusCode::OK,
        }
        .normalized();
        assert_eq!(decode.status, Some(200));
        assert_eq!(decode.code.as_deref(), Some("PARSE_ERROR"));
    }

    #[test]
    fn status_and_request_id_accessors() {
        let mut api = NormalizedError::new("bad").with_status(409);
        api.request_id = Some("req-9".into());
        let err = Error::Api(api);
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.request_id(), Some("req-9"));
        assert_eq!(Error::Timeout.status(), None);
    }
}
