//! # resilient-client - runtime for generated HTTP API clients
//!
//! `resilient-client` turns a bare JSON-over-HTTP API into a production client:
//! authentication and telemetry headers, bounded retries with deterministic
//! backoff, idempotency keys that survive retries, one normalized error shape,
//! and lazy cursor or page pagination. Built on `reqwest` and `tokio`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use resilient_client::{Client, IdempotencyKey};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateCustomer {
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct Customer {
//!     id: String,
//!     email: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), resilient_client::Error> {
//!     let client = Client::builder("https://api.example.com/v1")
//!         .api_key("key-123")
//!         .timeout(Duration::from_secs(10))
//!         .max_retries(3)
//!         .build()?;
//!
//!     let customer = client.get::<Customer>("/customers/cus_1").await?;
//!     if let Some(customer) = customer.data {
//!         println!("{} <{}>", customer.id, customer.email);
//!     }
//!
//!     let created = client
//!         .post::<_, Customer>(
//!             "/customers",
//!             &CreateCustomer { email: "ada@example.com".to_string() },
//!             Some(IdempotencyKey::generate()),
//!         )
//!         .await?;
//!     println!("created after {} attempt(s)", created.attempts);
//!
//!     let everyone: Vec<Customer> = client.get_all_cursor("/customers").await?;
//!     println!("{} customers", everyone.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Retries
//!
//! Transport failures and the statuses 429, 500, 502, 503 and 504 are retried
//! up to `max_retries` times. The delay honors `Retry-After` (seconds or
//! HTTP-date) and otherwise is `min(2^attempt, 8)` seconds, with no jitter.
//! Every other status fails immediately.
//!
//! ## Error Handling
//!
//! ```no_run
//! use resilient_client::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder("https://api.example.com").build()?;
//! match client.delete::<serde_json::Value>("/customers/cus_1").await {
//!     Ok(_) => println!("deleted"),
//!     Err(Error::Api(err)) if err.status == Some(404) => println!("already gone"),
//!     Err(Error::MaxRetriesExceeded { attempts, .. }) => {
//!         eprintln!("API unreachable after {} attempts", attempts);
//!     }
//!     Err(e) => eprintln!("{}", e.normalized()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Debug trace
//!
//! With `debug(true)` the client emits `tracing` events for every attempt,
//! response and retry. Install a subscriber (for example `tracing-subscriber`)
//! to see them; with debug off the client emits nothing.

pub mod backoff;
mod client;
mod config;
mod error;
mod executor;
pub mod headers;
mod metadata;
pub mod normalize;
pub mod pagination;
mod response;

pub use client::{Client, ClientBuilder};
pub use config::{
    ClientConfig, ClientConfigBuilder, Credentials, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT, SDK_LANGUAGE,
};
pub use error::{Error, NormalizedError, Result};
pub use metadata::{IdempotencyKey, RequestMetadata};
pub use pagination::{CursorPage, PageParams, PagedResult};
pub use response::Response;
