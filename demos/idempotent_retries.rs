//! Example demonstrating retries with idempotency keys.
//!
//! This example shows how to:
//! - Tune the retry budget and per-attempt timeout
//! - Send an `Idempotency-Key` that stays the same across retries
//! - Run concurrent calls that retry independently
//! - Bound a whole call with `tokio::time::timeout`
//!
//! Point `API_BASE_URL` at a server exposing `POST /payments`.
//!
//! Run with: `cargo run --example idempotent_retries`

use resilient_client::{Client, IdempotencyKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct NewPayment {
    amount: u64,
    currency: &'static str,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Payment {
    id: String,
    amount: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("resilient_client=debug,idempotent_retries=info")
        .init();

    let base_url =
        std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let client = Client::builder(base_url)
        .bearer_token("sk_test_123")
        .max_retries(4)
        .timeout(Duration::from_secs(5))
        .debug(true)
        .build()?;

    println!(
        "Worst case per call: {:?}",
        client.config().worst_case_duration()
    );
    println!();

    println!("=== Single Idempotent Call ===");
    let key = IdempotencyKey::new("order-1001-payment")?;
    let payment = NewPayment {
        amount: 4200,
        currency: "EUR",
    };
    match client.post::<_, Payment>("/payments", &payment, Some(key)).await {
        Ok(response) => {
            println!("Created {:?} after {} attempt(s)", response.data, response.attempts);
        }
        Err(e) => println!("Failed: {}", e.normalized()),
    }
    println!();

    println!("=== Concurrent Calls ===");
    let first = NewPayment {
        amount: 100,
        currency: "EUR",
    };
    let second = NewPayment {
        amount: 200,
        currency: "EUR",
    };
    let (a, b) = tokio::join!(
        client.post::<_, Payment>("/payments", &first, Some(IdempotencyKey::generate())),
        client.post::<_, Payment>("/payments", &second, Some(IdempotencyKey::generate())),
    );
    for (label, result) in [("first", a), ("second", b)] {
        match result {
            Ok(response) => println!("  {}: {} attempt(s)", label, response.attempts),
            Err(e) => println!("  {}: {}", label, e),
        }
    }
    println!();

    println!("=== Overall Deadline ===");
    let deadline = Duration::from_secs(3);
    let call = client.post::<_, Payment>(
        "/payments",
        &NewPayment {
            amount: 1,
            currency: "EUR",
        },
        Some(IdempotencyKey::generate()),
    );
    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(response)) => println!("  Done in {:?}", response.latency),
        Ok(Err(e)) => println!("  Failed: {}", e),
        Err(_) => println!("  Cancelled after {:?}", deadline),
    }

    Ok(())
}
