//! Queue-and-replay walkthrough against an in-process connection.
//!
//! Publishes a loopback connection that opens after one second, issues a
//! few persistence calls while it is still closed, and prints them as they
//! replay. Pass `--debug` for adapter logs.
//!
//! Run with: cargo run --example loopback

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use socket_sync::{
    COMET_CHANNEL, CallOptions, INBOUND_EVENT, LoopbackConnection, REQUEST_EVENT, Resource,
    SlotRegistry, SyncAdapter, TargetEvent,
};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let debug = std::env::args().any(|a| a == "--debug");
    let filter = if debug { "socket_sync=trace" } else { "socket_sync=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    // Server stand-in: echo the verb and URL, plus a canned todo list.
    let connection = LoopbackConnection::new().with_responder(|request| match request.url.as_str() {
        "/todo" => json!([{"id": 1, "title": "milk"}, {"id": 2, "title": "eggs"}]),
        _ => json!({"verb": request.verb.as_str(), "url": request.url, "echo": request.payload}),
    });

    let registry = Arc::new(SlotRegistry::new());
    registry.publish("global.socket", Arc::new(connection.clone()));

    let adapter = SyncAdapter::builder().registry(registry).build()?;
    adapter
        .bus()
        .on(COMET_CHANNEL, |message: &Value| println!("comet      {message}"));

    let todos = Arc::new(Resource::collection().with_url("/todo"));
    let todo = Arc::new(
        Resource::model()
            .with_url_fn(|| "/todo/2".to_string())
            .with_attribute("id", json!(2))
            .with_attribute("title", json!("eggs")),
    );
    todo.events().on(REQUEST_EVENT, |event: &TargetEvent| {
        let TargetEvent::Request(request) = event else {
            return;
        };
        println!("request    {} {}", request.handle.verb(), request.handle.url());
    });

    // Socket still connecting: both calls are queued.
    let fetch = adapter.sync(
        "read",
        todos,
        CallOptions::new().on_success(|body| println!("fetched    {body}")),
    )?;
    let mut done = serde_json::Map::new();
    done.insert("done".into(), json!(true));
    let save = adapter.sync(
        "patch",
        todo,
        CallOptions::new()
            .with_patch()
            .with_attrs(done)
            .on_success(|body| println!("patched    {body}")),
    )?;
    println!(
        "queued     read pending={} patch pending={} (queue={})",
        fetch.is_pending(),
        save.is_pending(),
        adapter.pending_count()
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    println!("open       socket connected");
    connection.set_connected(true);

    tokio::time::sleep(Duration::from_secs(1)).await;
    connection.push(INBOUND_EVENT, json!({"verb": "destroy", "model": "todo", "id": 1}));

    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}
