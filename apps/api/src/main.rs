use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use riskboard_api::config::Config;
use riskboard_api::services::HydrationService;
use riskboard_api::{build_app, connect_stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.environment(),
        backend = ?config.store_backend,
        "Starting Riskboard API server"
    );

    let stores = connect_stores(&config).await?;

    if let Some(report) = HydrationService::new(stores.clone())
        .hydrate(config.hydration_mode)
        .await?
    {
        tracing::info!(
            categories = report.categories,
            risks = report.risks,
            mode = ?config.hydration_mode,
            "Database hydrated"
        );
    }

    let app = build_app(&config, stores);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL Playground available at http://{}:{}/graphql/playground",
        addr.ip(),
        addr.port()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
