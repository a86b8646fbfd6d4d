mod api;
mod app;
mod config;
mod error;
mod form;
mod session;
mod ui;

use std::sync::Arc;

use iris::Dataset;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Iris prediction service");

    let config = config::Config::from_env()?;

    // No reference data, no service.
    let dataset = Dataset::load().inspect_err(|e| tracing::error!("failed to load dataset: {}", e))?;
    tracing::info!(
        samples = dataset.len(),
        features = dataset.n_features(),
        classes = dataset.target_names().len(),
        "Loaded reference dataset"
    );

    let state = Arc::new(AppState::new(dataset, config.session_ttl)?);
    let app = app::router(state);

    let addr = config.addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
