//! Header assembly for outgoing requests.
//!
//! Layers, lowest precedence first: telemetry, authentication, configured custom
//! headers, per-call headers. A later layer replaces an earlier one on a name
//! collision.

use crate::config::{ClientConfig, Credentials, SDK_LANGUAGE};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue};

/// `X-SDK-Language` telemetry header.
pub const X_SDK_LANGUAGE: &str = "x-sdk-language";
/// `X-SDK-Version` telemetry header.
pub const X_SDK_VERSION: &str = "x-sdk-version";
/// `X-API-Key` authentication header.
pub const X_API_KEY: &str = "x-api-key";
/// `X-Request-Id` response header.
pub const X_REQUEST_ID: &str = "x-request-id";
/// `Idempotency-Key` request header.
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";
/// `Retry-After` response header.
pub const RETRY_AFTER: &str = "retry-after";

/// Version reported in `X-SDK-Version`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const APPLICATION_JSON: &str = "application/json";

/// Headers sent on every request regardless of configuration.
pub fn telemetry_headers(config: &ClientConfig) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(5);
    headers.insert(USER_AGENT, config.user_agent().clone());
    headers.insert(
        HeaderName::from_static(X_SDK_LANGUAGE),
        HeaderValue::from_static(SDK_LANGUAGE),
    );
    headers.insert(
        HeaderName::from_static(X_SDK_VERSION),
        HeaderValue::from_static(SDK_VERSION),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    headers
}

/// Merges telemetry, auth, custom and per-call headers into one map.
///
/// Pure function of its inputs.
///
/// # Examples
///
/// ```
/// use http::{HeaderMap, HeaderValue};
/// use resilient_client::{headers::build_headers, ClientConfig};
///
/// # fn main() -> Result<(), resilient_client::Error> {
/// let config = ClientConfig::builder("https://api.example.com")
///     .bearer_token("tok")
///     .build()?;
///
/// let mut per_call = HeaderMap::new();
/// per_call.insert("idempotency-key", HeaderValue::from_static("op-1"));
///
/// let headers = build_headers(&config, &per_call);
/// assert_eq!(headers["authorization"], "Bearer tok");
/// assert_eq!(headers["idempotency-key"], "op-1");
/// assert_eq!(headers["accept"], "application/json");
/// # Ok(())
/// # }
/// ```
pub fn build_headers(config: &ClientConfig, per_call: &HeaderMap) -> HeaderMap {
    let mut headers = telemetry_headers(config);

    match config.credentials() {
        Credentials::Bearer(token) => {
            if let Ok(value) = sensitive(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        Credentials::ApiKey(key) => {
            if let Ok(value) = sensitive(key) {
                headers.insert(HeaderName::from_static(X_API_KEY), value);
            }
        }
        Credentials::None => {}
    }

    for (name, value) in config.custom_headers() {
        headers.insert(name.clone(), value.clone());
    }

    // `insert` drops every value already stored under the name, so each
    // per-call name fully replaces the lower layers before its values are added.
    for name in per_call.keys() {
        let mut values = per_call.get_all(name).iter();
        if let Some(first) = values.next() {
            headers.insert(name.clone(), first.clone());
        }
        for value in values {
            headers.append(name.clone(), value.clone());
        }
    }

    headers
}

fn sensitive(value: &str) -> Result<HeaderValue, http::header::InvalidHeaderValue> {
    let mut value = HeaderValue::try_from(value)?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> crate::config::ClientConfigBuilder {
        ClientConfig::builder("https://api.example.com")
    }

    #[test]
    fn telemetry_only() {
        let config = config().user_agent("my-sdk/1.2.3").build().unwrap();
        let headers = build_headers(&config, &HeaderMap::new());

        assert_eq!(headers["user-agent"], "my-sdk/1.2.3");
        assert_eq!(headers["x-sdk-language"], "rust");
        assert_eq!(headers["x-sdk-version"], SDK_VERSION);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["accept"], "application/json");
        assert!(headers.get("authorization").is_none());
        assert!(headers.get("x-api-key").is_none());
    }

    #[test]
    fn api_key_when_no_bearer() {
        let config = config().api_key("k-1").build().unwrap();
        let headers = build_headers(&config, &HeaderMap::new());

        assert_eq!(headers["x-api-key"], "k-1");
        assert!(headers["x-api-key"].is_sensitive());
        assert!(headers.get("authorization").is_none());
    }

    #[test]
    fn bearer_excludes_api_key() {
        let config = config().api_key("k-1").bearer_token("t-1").build().unwrap();
        let headers = build_headers(&config, &HeaderMap::new());

        assert_eq!(headers["authorization"], "Bearer t-1");
        assert!(headers.get("x-api-key").is_none());
    }

    #[test]
    fn custom_headers_override_lower_layers_in_order() {
        let config = config()
            .bearer_token("t-1")
            .custom_header("X-Tenant", "first")
            .custom_header("x-tenant", "second")
            .custom_header("Accept", "application/vnd.api+json")
            .custom_header("Authorization", "Custom scheme")
            .build()
            .unwrap();
        let headers = build_headers(&config, &HeaderMap::new());

        assert_eq!(headers["x-tenant"], "second");
        assert_eq!(headers.get_all("x-tenant").iter().count(), 1);
        assert_eq!(headers["accept"], "application/vnd.api+json");
        assert_eq!(headers["authorization"], "Custom scheme");
    }

    #[test]
    fn per_call_headers_win() {
        let config = config().custom_header("X-Tenant", "config").build().unwrap();
        let mut per_call = HeaderMap::new();
        per_call.insert("x-tenant", HeaderValue::from_static("call"));
        per_call.insert(IDEMPOTENCY_KEY, HeaderValue::from_static("key-1"));

        let headers = build_headers(&config, &per_call);

        assert_eq!(headers["x-tenant"], "call");
        assert_eq!(headers["idempotency-key"], "key-1");
    }
}
