//! Riskboard API library
//!
//! GraphQL API for risks and the categories they belong to. This crate
//! exposes the server components for the binary and for integration tests.

pub mod config;
pub mod error;
pub mod graphql;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};

use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::{Config, StoreBackend};
use graphql::build_schema;
use repositories::Stores;
use routes::{graphql_router, health_router, GraphQLState, HealthState};

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                    .max_age(Duration::from_secs(3600))
            }
        }
        _ if config.is_production() => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

/// Open the configured entity stores
///
/// For PostgreSQL this connects the pool and runs pending migrations.
pub async fn connect_stores(config: &Config) -> anyhow::Result<Stores> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            Ok(Stores::memory())
        }
        StoreBackend::Postgres => {
            let database = config.database();
            tracing::info!("Connecting to database...");

            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .acquire_timeout(database.connect_timeout())
                .connect(&database.url)
                .await?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations completed successfully");

            Ok(Stores::postgres(pool))
        }
    }
}

/// Build the HTTP application over the given stores
pub fn build_app(config: &Config, stores: Stores) -> Router {
    let schema = build_schema(stores.clone(), config.batch);
    tracing::info!(
        batch_delay_ms = config.batch.delay.as_millis() as u64,
        max_batch_size = config.batch.max_batch_size,
        "GraphQL schema built"
    );

    let graphql_state = GraphQLState {
        schema,
        stores: stores.clone(),
        batch: config.batch,
    };

    Router::new()
        .route("/", get(root))
        // GraphQL endpoints: /graphql, /graphql/playground
        .nest("/graphql", graphql_router(graphql_state))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(HealthState::new(stores)))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

async fn root() -> &'static str {
    "Riskboard API"
}
