//! Quick cloud connection check
//! Run with: cargo run --package podium-state --example test_cloud

use podium_state::{CloudConfig, SnapshotStore, SurrealHandle, SurrealSnapshotStore};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Load from environment
    dotenvy::dotenv().ok();

    println!("Checking SurrealDB Cloud connection...");

    let config = match CloudConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Missing environment variables: {}", e);
            std::process::exit(1);
        }
    };
    println!("  Endpoint: {}", config.endpoint);
    println!("  Namespace: {}", config.namespace);
    println!("  Database: {}", config.database);

    let handle = match SurrealHandle::setup_cloud(config).await {
        Ok(handle) => Arc::new(handle),
        Err(e) => {
            eprintln!("\n✗ Connection failed: {}", e);
            std::process::exit(1);
        }
    };
    println!("✓ Connected, schema initialized");

    let store = SurrealSnapshotStore::new(handle);
    match store.max_version(podium_state::HackathonId(0)).await {
        Ok(v) => println!("✓ Snapshot table readable (hackathon 0 max version: {:?})", v),
        Err(e) => {
            eprintln!("✗ Snapshot query failed: {}", e);
            std::process::exit(1);
        }
    }
}
