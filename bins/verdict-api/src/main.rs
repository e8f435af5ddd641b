mod handlers;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use verdict_engine::{EngineConfig, ExecutionService};

#[derive(Clone)]
pub struct AppState {
    pub service: ExecutionService,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // LOG_FORMAT=json for log shippers, human-readable otherwise
    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new().merge(routes::routes()).with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Verdict API booting...");

    let config = EngineConfig::from_env().context("Invalid execution engine configuration")?;
    let service = ExecutionService::from_config(&config)
        .context("Failed to build execution service")?;

    let state = Arc::new(AppState { service });

    let addr = std::env::var("VERDICT_API_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
