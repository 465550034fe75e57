use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::car::{CarService, MongoCarRepository};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect to the document store and assemble the router around it.
/// An unreachable store is fatal.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = models::db::connect_with_config(&cfg.database).await?;
    let repo = Arc::new(MongoCarRepository::new(&store));
    let state = ServerState::new(CarService::new(repo));
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and run the HTTP server until the process exits.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let bind = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| StartupError::Bind(format!("{bind}: {e}")))?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting car server");
    axum::serve(listener, app).await?;
    Ok(())
}
