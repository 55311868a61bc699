//src/main.rs

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod clients;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod testing;

use crate::config::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(AppConfig::from_env()?);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new(config.clone()).await?;
    let app = routes::app(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        services = ?config.services,
        "🚀 Servidor escutando em {}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}
