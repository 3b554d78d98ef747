//! Successful response wrapper.
//!
//! [`Response`] carries the decoded payload together with the status, headers,
//! raw body, latency and attempt count of the call that produced it.

use crate::headers::X_REQUEST_ID;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful (2xx) response.
///
/// `data` is `None` when the server answered 204 or sent an empty body.
///
/// # Examples
///
/// ```no_run
/// use resilient_client::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Widget {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), resilient_client::Error> {
/// let client = Client::builder("https://api.example.com").build()?;
///
/// let response = client.get::<Widget>("/widgets/7").await?;
/// if let Some(widget) = &response.data {
///     println!("{} is widget {}", widget.name, widget.id);
/// }
/// println!("took {:?} over {} attempt(s)", response.latency, response.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded payload, absent for 204 or an empty body.
    pub data: Option<T>,

    /// The raw response body.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt to the successful response, backoff included.
    pub latency: Duration,

    /// Number of attempts made, 1 when no retry happened.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: Option<T>,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Consumes the response, returning the payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Returns `true` if there is no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Maps the payload to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use resilient_client::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     Some(42),
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    ///     1,
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data.as_deref(), Some("42"));
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: self.data.map(f),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if the request required retries.
    ///
    /// # Examples
    ///
    /// ```
    /// # use resilient_client::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response: Response<()> = Response::new(
    ///     None,
    ///     String::new(),
    ///     StatusCode::NO_CONTENT,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    ///     3,
    /// );
    ///
    /// assert!(response.was_retried());
    /// assert!(response.is_empty());
    /// ```
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// The `X-Request-Id` response header.
    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn header_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let response = Response::new(
            Some(1u8),
            "1".to_string(),
            StatusCode::OK,
            headers,
            Duration::ZERO,
            1,
        );

        assert_eq!(response.request_id(), Some("abc"));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert!(!response.was_retried());
        assert_eq!(response.into_data(), Some(1));
    }
}
