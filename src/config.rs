//! Client configuration.
//!
//! [`ClientConfig`] is assembled with [`ClientConfigBuilder`], validated once in
//! [`ClientConfigBuilder::build`], and read-only from then on.

use crate::{Error, Result};
use http::{HeaderName, HeaderValue};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Value of the `X-SDK-Language` telemetry header.
pub const SDK_LANGUAGE: &str = "rust";

/// Default `User-Agent`, `<sdk-name>/<version>`.
pub const DEFAULT_USER_AGENT: &str = concat!("resilient-client-rust/", env!("CARGO_PKG_VERSION"));

/// Authentication derived from the configuration.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// `Authorization: Bearer <token>`.
    Bearer(&'a str),
    /// `X-API-Key: <key>`.
    ApiKey(&'a str),
    /// No authentication header.
    None,
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer(_) => f.write_str("Bearer(***)"),
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::None => f.write_str("None"),
        }
    }
}

/// Immutable configuration owned by a [`Client`](crate::Client).
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    bearer_token: Option<String>,
    timeout: Duration,
    max_retries: u32,
    user_agent: HeaderValue,
    custom_headers: Vec<(HeaderName, HeaderValue)>,
    debug: bool,
}

impl ClientConfig {
    /// Starts a builder for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(base_url)
    }

    /// Base URL with trailing slashes stripped.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Configured bearer token, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Authentication to send. A bearer token wins over an API key.
    pub fn credentials(&self) -> Credentials<'_> {
        match (self.bearer_token.as_deref(), self.api_key.as_deref()) {
            (Some(token), _) => Credentials::Bearer(token),
            (None, Some(key)) => Credentials::ApiKey(key),
            (None, None) => Credentials::None,
        }
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// `User-Agent` header value.
    pub fn user_agent(&self) -> &HeaderValue {
        &self.user_agent
    }

    /// Custom headers in the order they were added.
    pub fn custom_headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.custom_headers
    }

    /// Whether the request/response/retry trace is emitted.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Upper bound on the wall-clock duration of one call without a
    /// server-supplied `Retry-After`: `(max_retries + 1) * (timeout + 8s)`.
    ///
    /// Each attempt is bounded by the timeout separately, so the bound compounds.
    pub fn worst_case_duration(&self) -> Duration {
        (self.timeout + crate::backoff::MAX_EXPONENTIAL_BACKOFF)
            .saturating_mul(self.max_retries.saturating_add(1))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials())
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .field(
                "custom_headers",
                &self.custom_headers.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .field("debug", &self.debug)
            .finish()
    }
}

/// Builder for [`ClientConfig`].
///
/// # Examples
///
/// ```
/// use resilient_client::ClientConfig;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), resilient_client::Error> {
/// let config = ClientConfig::builder("https://api.example.com/v1/")
///     .api_key("key-123")
///     .timeout(Duration::from_secs(5))
///     .max_retries(2)
///     .custom_header("X-Tenant", "acme")
///     .build()?;
///
/// assert_eq!(config.base_url(), "https://api.example.com/v1");
/// assert_eq!(config.max_retries(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    base_url: String,
    api_key: Option<String>,
    bearer_token: Option<String>,
    timeout: Duration,
    max_retries: u32,
    user_agent: Option<String>,
    custom_headers: Vec<(String, String)>,
    debug: bool,
}

impl ClientConfigBuilder {
    /// Creates a builder with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: None,
            custom_headers: Vec::new(),
            debug: false,
        }
    }

    /// Sets the API key sent as `X-API-Key`.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the bearer token. Takes precedence over an API key.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Appends a custom header. Later entries win on name collision.
    pub fn custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Appends several custom headers, keeping their iteration order.
    pub fn custom_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.custom_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Enables the debug trace.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validates the settings and produces the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty, unparseable or not http(s),
    /// or if the user agent or a custom header is not a valid HTTP header.
    pub fn build(self) -> Result<ClientConfig> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Configuration("Base URL is required".to_string()));
        }
        let parsed = Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "Unsupported base URL scheme: {}",
                parsed.scheme()
            )));
        }

        let user_agent = self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let user_agent = HeaderValue::try_from(user_agent)
            .map_err(|e| Error::Configuration(format!("Invalid user agent: {}", e)))?;

        for secret in [self.api_key.as_deref(), self.bearer_token.as_deref()]
            .into_iter()
            .flatten()
        {
            HeaderValue::try_from(format!("Bearer {}", secret))
                .map_err(|_| Error::Configuration("Credential is not a valid header value".to_string()))?;
        }

        let custom_headers = self
            .custom_headers
            .into_iter()
            .map(|(name, value)| parse_header(&name, &value))
            .collect::<Result<Vec<_>>>()?;

        Ok(ClientConfig {
            base_url,
            api_key: self.api_key,
            bearer_token: self.bearer_token,
            timeout: self.timeout,
            max_retries: self.max_retries,
            user_agent,
            custom_headers,
            debug: self.debug,
        })
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::try_from(name)
        .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::builder("https://api.example.com").build().unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.max_retries(), 3);
        assert!(!config.debug());
        assert_eq!(config.credentials(), Credentials::None);
        assert!(config
            .user_agent()
            .to_str()
            .unwrap()
            .starts_with("resilient-client-rust/"));
    }

    #[test]
    fn strips_trailing_slashes() {
        let config = ClientConfig::builder("https://api.example.com/v1//").build().unwrap();
        assert_eq!(config.base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn bearer_wins_over_api_key() {
        let config = ClientConfig::builder("https://api.example.com")
            .api_key("key")
            .bearer_token("token")
            .build()
            .unwrap();
        assert_eq!(config.credentials(), Credentials::Bearer("token"));

        let config = ClientConfig::builder("https://api.example.com")
            .api_key("key")
            .build()
            .unwrap();
        assert_eq!(config.credentials(), Credentials::ApiKey("key"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            ClientConfig::builder("").build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ClientConfig::builder("not a url").build(),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            ClientConfig::builder("ftp://files.example.com").build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ClientConfig::builder("https://api.example.com")
                .custom_header("bad header", "x")
                .build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ClientConfig::builder("https://api.example.com")
                .custom_header("X-Ok", "line\nbreak")
                .build(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = ClientConfig::builder("https://api.example.com")
            .bearer_token("super-secret")
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("Bearer(***)"));
    }

    #[test]
    fn worst_case_duration_compounds() {
        let config = ClientConfig::builder("https://api.example.com")
            .timeout(Duration::from_secs(2))
            .max_retries(3)
            .build()
            .unwrap();
        assert_eq!(config.worst_case_duration(), Duration::from_secs(40));
    }
}
