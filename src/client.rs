//! The public client facade.
//!
//! [`Client`] owns the immutable configuration and the connection pool and
//! exposes the HTTP verbs and pagination helpers. Use [`Client::builder`] or
//! [`Client::new`] to create one.

use crate::{
    config::{ClientConfig, ClientConfigBuilder},
    executor::Executor,
    metadata::{IdempotencyKey, RequestMetadata},
    pagination::{self, PageParams},
    Response, Result,
};
use futures_util::stream::{BoxStream, TryStreamExt};
use http::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// An HTTP API client with retries, error normalization and pagination.
///
/// Cloning is cheap and clones share the connection pool. All methods take
/// `&self` and may run concurrently; the client keeps no per-call state.
///
/// Every method returns a future. Each attempt is bounded by the configured
/// timeout, so one call can take up to
/// [`ClientConfig::worst_case_duration`] (longer when the server sends a large
/// `Retry-After`). To bound a call as a whole, wrap it in
/// `tokio::time::timeout`; dropping the future aborts both an in-flight request
/// and a pending backoff sleep.
///
/// # Examples
///
/// ```no_run
/// use resilient_client::{Client, IdempotencyKey};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct NewInvoice {
///     amount: u64,
/// }
///
/// #[derive(Deserialize)]
/// struct Invoice {
///     id: String,
///     amount: u64,
/// }
///
/// # async fn example() -> Result<(), resilient_client::Error> {
/// let client = Client::builder("https://api.example.com/v1")
///     .bearer_token("sk_live_123")
///     .max_retries(5)
///     .build()?;
///
/// let created = client
///     .post::<_, Invoice>(
///         "/invoices",
///         &NewInvoice { amount: 4200 },
///         Some(IdempotencyKey::generate()),
///     )
///     .await?;
///
/// let invoices: Vec<Invoice> = client.get_all_cursor("/invoices").await?;
/// println!("{} invoices, newest {:?}", invoices.len(), created.data.map(|i| i.id));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    executor: Arc<Executor>,
}

impl Client {
    /// Creates a client from a finished configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            executor: Arc::new(Executor::new(config, None)?),
        })
    }

    /// Creates a `ClientBuilder` for the given base URL.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use resilient_client::Client;
    ///
    /// # fn example() -> Result<(), resilient_client::Error> {
    /// let client = Client::builder("https://api.example.com")
    ///     .api_key("key-123")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    /// Executes one logical request with retries.
    ///
    /// This is the general entry point; the verb methods are thin wrappers.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use resilient_client::{Client, RequestMetadata};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), resilient_client::Error> {
    /// let client = Client::builder("https://api.example.com").build()?;
    ///
    /// let metadata = RequestMetadata::new(Method::GET, "/search")
    ///     .with_query_param("q", "rust")
    ///     .with_header("X-Trace", "on")?;
    ///
    /// let hits = client.call::<(), serde_json::Value>(metadata, None).await?;
    /// println!("{:?}", hits.data);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Req, Res>(
        &self,
        metadata: RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.executor.execute(&metadata, body).await
    }

    /// Makes a GET request.
    pub async fn get<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::GET, path);
        self.call::<(), Res>(metadata, None).await
    }

    /// Makes a POST request with a JSON body.
    ///
    /// An idempotency key, when given, is sent as `Idempotency-Key` on every
    /// attempt of this call so the server can deduplicate retries.
    pub async fn post<Req, Res>(
        &self,
        path: impl Into<String>,
        body: &Req,
        idempotency_key: Option<IdempotencyKey>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let mut metadata = RequestMetadata::new(Method::POST, path);
        if let Some(key) = &idempotency_key {
            metadata = metadata.with_idempotency_key(key);
        }
        self.call(metadata, Some(body)).await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::PUT, path);
        self.call(metadata, Some(body)).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch<Req, Res>(
        &self,
        path: impl Into<String>,
        body: &Req,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::PATCH, path);
        self.call(metadata, Some(body)).await
    }

    /// Makes a DELETE request.
    ///
    /// Use `serde_json::Value` or `()` as `Res` when the server answers 204.
    pub async fn delete<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::DELETE, path);
        self.call::<(), Res>(metadata, None).await
    }

    /// Lazily streams every item of a cursor-paginated listing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures_util::TryStreamExt;
    /// use resilient_client::Client;
    ///
    /// # async fn example() -> Result<(), resilient_client::Error> {
    /// let client = Client::builder("https://api.example.com").build()?;
    ///
    /// let mut customers = client.paginate_cursor::<serde_json::Value>("/customers");
    /// while let Some(customer) = customers.try_next().await? {
    ///     println!("{}", customer["email"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn paginate_cursor<T>(&self, path: impl Into<String>) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.paginate_cursor_with(RequestMetadata::new(Method::GET, path))
    }

    /// Like [`paginate_cursor`](Self::paginate_cursor), starting from a prepared
    /// request whose query parameters and headers are sent with every page.
    pub fn paginate_cursor_with<T>(&self, metadata: RequestMetadata) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        pagination::cursor_stream(self.clone(), metadata)
    }

    /// Lazily streams every item of a page-number-paginated listing.
    pub fn paginate_page<T>(
        &self,
        path: impl Into<String>,
        params: PageParams,
    ) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.paginate_page_with(RequestMetadata::new(Method::GET, path), params)
    }

    /// Like [`paginate_page`](Self::paginate_page), starting from a prepared request.
    pub fn paginate_page_with<T>(
        &self,
        metadata: RequestMetadata,
        params: PageParams,
    ) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        pagination::page_stream(self.clone(), metadata, params)
    }

    /// Fetches every item of a cursor-paginated listing into one `Vec`.
    pub async fn get_all_cursor<T>(&self, path: impl Into<String>) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.paginate_cursor(path).try_collect().await
    }

    /// Fetches every item of a page-number-paginated listing into one `Vec`.
    pub async fn get_all_page<T>(&self, path: impl Into<String>, params: PageParams) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.paginate_page(path, params).try_collect().await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Wraps [`ClientConfigBuilder`] and additionally accepts a preconfigured
/// `reqwest::Client` to use as the transport.
///
/// # Examples
///
/// ```no_run
/// use resilient_client::Client;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), resilient_client::Error> {
/// let client = Client::builder("https://api.example.com")
///     .bearer_token("token")
///     .timeout(Duration::from_secs(30))
///     .max_retries(2)
///     .user_agent("billing-service/2.1")
///     .custom_header("X-Tenant", "acme")
///     .debug(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: ClientConfigBuilder,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfigBuilder::new(base_url),
            http_client: None,
        }
    }

    /// Sets the API key sent as `X-API-Key`.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config = self.config.api_key(api_key);
        self
    }

    /// Sets the bearer token. Takes precedence over an API key.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config = self.config.bearer_token(token);
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Sets the number of retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config = self.config.max_retries(max_retries);
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Appends a custom header sent on every request.
    pub fn custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config = self.config.custom_header(name, value);
        self
    }

    /// Enables the debug trace.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config = self.config.debug(debug);
        self
    }

    /// Uses a preconfigured `reqwest::Client` as the transport.
    ///
    /// Its own timeout and default headers still apply underneath the
    /// per-request ones set by this crate.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP transport
    /// cannot be initialized.
    pub fn build(self) -> Result<Client> {
        let config = self.config.build()?;
        Ok(Client {
            executor: Arc::new(Executor::new(config, self.http_client)?),
        })
    }
}
