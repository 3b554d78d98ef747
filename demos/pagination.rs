//! Example demonstrating cursor and page pagination.
//!
//! This example shows how to:
//! - Stream items lazily across pages
//! - Stop early without fetching the remaining pages
//! - Collect a whole listing at once
//! - Carry query parameters through every page request
//!
//! Point `API_BASE_URL` at a server exposing `/customers` (cursor shape) and
//! `/invoices` (page shape).
//!
//! Run with: `cargo run --example pagination`

use futures_util::{StreamExt, TryStreamExt};
use http::Method;
use resilient_client::{Client, PageParams, RequestMetadata};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Customer {
    id: String,
    email: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Invoice {
    id: String,
    amount: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("resilient_client=debug,pagination=info")
        .init();

    let base_url =
        std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let client = Client::builder(base_url).debug(true).build()?;

    println!("=== Cursor Pagination ===");
    let mut customers = client.paginate_cursor::<Customer>("/customers");
    while let Some(customer) = customers.try_next().await? {
        println!("  {} <{}>", customer.id, customer.email);
    }
    println!();

    println!("=== Stopping Early ===");
    // Only the pages needed for the first five items are requested.
    let first_five: Vec<Customer> = client
        .paginate_cursor("/customers")
        .take(5)
        .try_collect()
        .await?;
    println!("  Fetched {} customers", first_five.len());
    println!();

    println!("=== Page Pagination ===");
    let invoices: Vec<Invoice> = client
        .get_all_page("/invoices", PageParams::per_page(50))
        .await?;
    println!("  {} invoices in total", invoices.len());
    println!();

    println!("=== Filtered Listing ===");
    let open = RequestMetadata::new(Method::GET, "/invoices").with_query_param("status", "open");
    let mut open_invoices = client.paginate_page_with::<Invoice>(open, PageParams::per_page(20));
    let mut total = 0u64;
    while let Some(invoice) = open_invoices.try_next().await? {
        total += invoice.amount;
    }
    println!("  Open amount: {}", total);

    Ok(())
}
