//! Device Price-Range Service
//!
//! Stores mobile device feature records and classifies them into price
//! ranges with a pre-fitted model.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  PRICE-RANGE SERVICE                    │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌───────────┐        ┌──────────────────────────────┐  │
//! │  │  API      │───────▶│  Predictor                   │  │
//! │  │  (Axum)   │        │  transform ─▶ classifier     │  │
//! │  └─────┬─────┘        └──────────────────────────────┘  │
//! │        ▼                                                │
//! │  ┌─────────────┐                                        │
//! │  │   SQLite    │  devices (id + 20 feature columns)     │
//! │  └─────────────┘                                        │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod models;
mod inference;
mod handlers;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
use inference::Predictor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    init_tracing(config.is_production());

    tracing::info!("Price-range service starting...");
    tracing::info!("Database: {}", config.redacted_database_url());
    tracing::info!(
        "Feature layout: {} features (hash {:08x})",
        models::layout::FEATURE_COUNT,
        models::layout::layout_hash()
    );

    // Model artifacts are required; without them nothing can be served
    let predictor = Predictor::from_files(&config.transform_artifact, &config.classifier_artifact)
        .context("Failed to load model artifacts")?;

    // Initialize database pool
    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to create database pool")?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    // Build application state
    let state = AppState {
        pool,
        predictor: Arc::new(predictor),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST/PORT")?;
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "price_range_api=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub predictor: Arc<Predictor>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/model", get(handlers::predict::model_info))

        // Devices
        .route("/devices", get(handlers::devices::list))
        .route("/devices", post(handlers::devices::create))
        .route("/devices/:id", get(handlers::devices::get))

        // Predictions
        .route("/predict/:id", get(handlers::predict::predict))

        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
