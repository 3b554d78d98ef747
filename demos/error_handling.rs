//! Example demonstrating error handling with normalized errors.
//!
//! This example shows how to:
//! - Match on the error variants
//! - Read the normalized message, status, code and request id
//! - Deal with deserialization failures
//! - Tell transport failures from exhausted retries
//!
//! Run with: `cargo run --example error_handling`

use resilient_client::{Client, Error, NormalizedError};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    id: u32,
    title: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("resilient_client=info")
        .init();

    let client = Client::builder("https://jsonplaceholder.typicode.com")
        .debug(true)
        .build()?;

    println!("=== Example 1: Handling API Errors ===");
    // 404 is not retryable, so this fails after one attempt.
    match client.get::<Post>("/posts/999999").await {
        Ok(response) => println!("Success: {:?}", response.data),
        Err(Error::Api(err)) => {
            println!("API Error!");
            println!("  Message: {}", err.message);
            println!("  Status: {:?}", err.status);
            println!("  Code: {:?}", err.code);
            println!("  Request id: {:?}", err.request_id);
            println!("  Details: {:?}", err.details);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Handling Deserialization Errors ===");
    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct WrongSchema {
        nonexistent_field: String,
    }

    match client.get::<WrongSchema>("/posts/1").await {
        Ok(_) => println!("Unexpected success"),
        Err(Error::Deserialization {
            raw_response,
            serde_error,
            status,
        }) => {
            println!("Deserialization Failed!");
            println!("  Status: {}", status);
            println!("  Serde error: {}", serde_error);
            println!(
                "  Raw response (first 200 chars): {}",
                raw_response.chars().take(200).collect::<String>()
            );
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 3: One Shape For Every Failure ===");
    let errors = vec![
        Error::Api(
            NormalizedError::new("Request failed with status 500").with_status(500),
        ),
        Error::Api(
            NormalizedError::new("Invalid amount")
                .with_status(400)
                .with_code("INVALID_AMOUNT"),
        ),
        Error::Timeout,
        Error::Configuration("base URL must not be empty".to_string()),
    ];

    for error in errors {
        println!("Error: {}", error);
        println!("  Is retryable: {}", error.is_retryable());
        println!("  Normalized: {}", error.normalized());
        println!();
    }

    println!("=== Example 4: Transport Failures And Retries ===");
    let bad_client = Client::builder("https://this-domain-does-not-exist-12345.com")
        .max_retries(1)
        .timeout(Duration::from_secs(2))
        .build()?;

    match bad_client.get::<serde_json::Value>("/").await {
        Ok(_) => println!("Unexpected success"),
        Err(Error::MaxRetriesExceeded {
            attempts,
            last_error,
        }) => {
            println!("Gave up after {} attempts", attempts);
            println!("  Last error: {}", last_error);
        }
        Err(e) if e.is_transport() => println!("Transport error: {}", e),
        Err(e) => println!("Other error: {}", e),
    }

    Ok(())
}
