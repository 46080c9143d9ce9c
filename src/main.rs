//! ParkPass - Amusement Park Management Backend
//! REST API for parks, activities, tickets, reviews, and addresses,
//! guarded by JWT bearer authentication and role-based access control.

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parkpass_backend::{
    api::routes::{create_router, AppState},
    auth::{TokenService, UserStore},
    models::Config,
    store::Database,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🎢 ParkPass backend starting");

    let config = Config::from_env()?;

    let users = Arc::new(UserStore::new(&config.auth_database_path)?);
    let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl_secs));
    info!("🔐 Authentication initialized at: {}", config.auth_database_path);

    let db = Arc::new(Database::new(&config.database_path)?);

    let state = AppState { db, users, tokens };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkpass_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the manifest-dir .env (common when running with
    //    --manifest-path from elsewhere)
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
