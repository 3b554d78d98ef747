//! Basic example demonstrating simple GET and POST requests.
//!
//! This example shows how to:
//! - Create a client with an API key and telemetry defaults
//! - Make GET requests to fetch data
//! - Make POST requests to create data
//! - Access response data and metadata
//!
//! Run with: `cargo run --example basic_call`

use resilient_client::{Client, Error};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("resilient_client=debug,basic_call=info")
        .init();

    let client = Client::builder("https://jsonplaceholder.typicode.com")
        .api_key("demo-key")
        .timeout(Duration::from_secs(10))
        .debug(true)
        .build()?;

    println!("=== GET Request Example ===");
    let response = client.get::<Post>("/posts/1").await?;

    if let Some(post) = &response.data {
        println!("Post ID: {}", post.id);
        println!("Title: {}", post.title);
        println!("Body: {}", post.body);
    }
    println!("Request latency: {:?}", response.latency);
    println!("Status code: {}", response.status);
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let response = client.post::<_, Post>("/posts", &new_post, None).await?;

    if let Some(post) = &response.data {
        println!("Created post ID: {}", post.id);
        println!("Title: {}", post.title);
    }
    println!("Request latency: {:?}", response.latency);
    println!();

    println!("=== DELETE With No Payload ===");
    let response = client.delete::<serde_json::Value>("/posts/1").await?;
    println!("Status: {}, payload: {:?}", response.status, response.data);
    println!();

    println!("=== Accessing Response Metadata ===");
    println!("Raw response length: {} bytes", response.raw_body.len());
    println!("Content-Type: {:?}", response.header("content-type"));
    println!("Request id: {:?}", response.request_id());
    println!("Attempts: {}", response.attempts);

    Ok(())
}
