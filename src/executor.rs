//! Execution of one logical request with retries.
//!
//! Each call moves through `Attempting -> {Succeeded, Retrying, Failed}`, where
//! `Retrying` always leads back to `Attempting`:
//!
//! - a transport failure (connect, DNS, timeout, a body that stops arriving) is
//!   retried while budget remains;
//! - a 2xx response succeeds;
//! - 429, 500, 502, 503 and 504 are retried while budget remains, honoring
//!   `Retry-After`;
//! - any other status, or a retryable one with the budget spent, is normalized
//!   into [`Error::Api`].
//!
//! The per-call headers, including any `Idempotency-Key`, are rebuilt from the
//! same inputs on every attempt, so all attempts of a call carry identical keys.

use crate::{
    backoff::RetryContext,
    config::ClientConfig,
    headers::{build_headers, RETRY_AFTER},
    metadata::RequestMetadata,
    normalize::normalize_error,
    Error, Response, Result,
};
use http::{HeaderMap, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};
use url::Url;

/// Issues requests for a [`Client`](crate::Client).
///
/// Holds only immutable state, so one executor serves any number of concurrent calls.
pub(crate) struct Executor {
    http_client: reqwest::Client,
    config: ClientConfig,
}

/// A 2xx response whose body was read in full.
struct Success {
    status: StatusCode,
    headers: HeaderMap,
    raw_body: String,
}

/// Outcome of a single attempt.
enum Attempt {
    Succeeded(Success),
    Retrying(RetryContext),
    Failed(Error),
    /// No complete response: connect, timeout, or a body that stopped arriving.
    Transport(Error),
}

impl Executor {
    pub(crate) fn new(config: ClientConfig, http_client: Option<reqwest::Client>) -> Result<Self> {
        let http_client = match http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?,
        };
        Ok(Self {
            http_client,
            config,
        })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs the retry loop for one logical call and decodes the successful body.
    pub(crate) async fn execute<Req, Res>(
        &self,
        metadata: &RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let url = self.url_for(metadata)?;
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let max_retries = self.config.max_retries();
        let start_time = Instant::now();
        let mut attempt: u32 = 0;
        let mut saw_response = false;

        loop {
            if self.config.debug() {
                tracing::debug!(
                    method = %metadata.method,
                    url = %url,
                    "attempt {}/{}",
                    attempt + 1,
                    u64::from(max_retries) + 1
                );
            }

            let outcome = match self.send_once(metadata, &url, body.as_deref()).await {
                Ok(response) => self.classify(response, attempt).await,
                Err(err) => Attempt::Transport(err),
            };

            let ctx = match outcome {
                Attempt::Succeeded(success) => {
                    let latency = start_time.elapsed();
                    return self.decode(success, latency, attempt as usize + 1);
                }
                Attempt::Retrying(ctx) => {
                    saw_response = true;
                    ctx
                }
                Attempt::Failed(err) => {
                    self.trace_failure(metadata, &err, attempt);
                    return Err(err);
                }
                Attempt::Transport(err) => {
                    let ctx = RetryContext::transport_failure(attempt);
                    if !ctx.should_retry(max_retries) {
                        self.trace_failure(metadata, &err, attempt);
                        // Exhaustion is reported only when no attempt got a response.
                        return Err(if attempt == 0 || saw_response {
                            err
                        } else {
                            Error::MaxRetriesExceeded {
                                attempts: attempt as usize + 1,
                                last_error: Box::new(err),
                            }
                        });
                    }
                    if self.config.debug() {
                        tracing::warn!(error = %err, attempt = attempt + 1, "Transport failure");
                    }
                    ctx
                }
            };

            let delay = ctx.backoff();
            if self.config.debug() {
                tracing::info!(
                    delay_ms = delay.as_millis() as u64,
                    attempt = attempt + 1,
                    status = ctx.status_code,
                    "Retrying request after delay"
                );
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Builds the absolute URL: base URL, path, then query parameters in order.
    fn url_for(&self, metadata: &RequestMetadata) -> Result<Url> {
        let path = metadata.path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{}/{}", self.config.base_url(), path))?;

        if !metadata.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &metadata.query_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Sends one attempt. Only transport failures are errors here.
    async fn send_once(
        &self,
        metadata: &RequestMetadata,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .http_client
            .request(metadata.method.clone(), url.clone())
            .headers(build_headers(&self.config, &metadata.headers))
            .timeout(self.config.timeout());

        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        request.send().await.map_err(Error::from_transport)
    }

    async fn classify(&self, response: reqwest::Response, attempt: u32) -> Attempt {
        let status = response.status();

        if self.config.debug() {
            tracing::debug!(status = status.as_u16(), attempt = attempt + 1, "Received HTTP response");
        }

        if status.is_success() {
            let headers = response.headers().clone();
            // The per-attempt timeout covers the body read too.
            return match response.text().await {
                Ok(raw_body) => Attempt::Succeeded(Success {
                    status,
                    headers,
                    raw_body,
                }),
                Err(err) => Attempt::Transport(Error::from_transport(err)),
            };
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let ctx = RetryContext::response(attempt, status.as_u16(), retry_after);
        if ctx.should_retry(self.config.max_retries()) {
            return Attempt::Retrying(ctx);
        }

        let headers = response.headers().clone();
        // An unreadable error body is treated like an empty one.
        let body = response.bytes().await.unwrap_or_default();
        Attempt::Failed(Error::Api(normalize_error(status, &body, &headers)))
    }

    fn decode<Res>(
        &self,
        success: Success,
        latency: Duration,
        attempts: usize,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let Success {
            status,
            headers,
            raw_body,
        } = success;

        if self.config.debug() {
            tracing::info!(
                status = status.as_u16(),
                latency_ms = latency.as_millis() as u64,
                attempts = attempts,
                "Request succeeded"
            );
        }

        if status == StatusCode::NO_CONTENT || raw_body.trim().is_empty() {
            return Ok(Response::new(None, raw_body, status, headers, latency, attempts));
        }

        match serde_json::from_str::<Res>(&raw_body) {
            Ok(data) => Ok(Response::new(
                Some(data),
                raw_body,
                status,
                headers,
                latency,
                attempts,
            )),
            Err(e) => Err(Error::Deserialization {
                raw_response: raw_body,
                serde_error: e.to_string(),
                status,
            }),
        }
    }

    fn trace_failure(&self, metadata: &RequestMetadata, err: &Error, attempt: u32) {
        if self.config.debug() {
            tracing::warn!(
                error = %err,
                attempts = attempt + 1,
                method = %metadata.method,
                path = %metadata.path,
                "Request failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn executor(base_url: &str) -> Executor {
        let config = ClientConfig::builder(base_url).build().unwrap();
        Executor::new(config, None).unwrap()
    }

    #[test]
    fn url_joins_base_and_path() {
        let executor = executor("https://api.example.com/v1/");

        let url = executor
            .url_for(&RequestMetadata::new(Method::GET, "/users/1"))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users/1");

        let url = executor
            .url_for(&RequestMetadata::new(Method::GET, "users"))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users");
    }

    #[test]
    fn url_appends_query_in_order() {
        let executor = executor("https://api.example.com");
        let metadata = RequestMetadata::new(Method::GET, "/items?status=open")
            .with_query_param("page", "2")
            .with_query_param("perPage", "50");

        let url = executor.url_for(&metadata).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/items?status=open&page=2&perPage=50"
        );
    }

    #[test]
    fn url_encodes_query_values() {
        let executor = executor("https://api.example.com");
        let metadata =
            RequestMetadata::new(Method::GET, "/items").with_query_param("cursor", "a b&c");

        let url = executor.url_for(&metadata).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/items?cursor=a+b%26c");
    }
}
