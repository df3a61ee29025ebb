//! payroll-engine HTTP server
//!
//! Loads `payroll.yaml` from `PAYROLL_CONFIG_DIR` (default `./config`) and
//! serves the API on `PAYROLL_BIND_ADDR` (default `127.0.0.1:3000`).

use std::path::PathBuf;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payroll_engine=info".into()),
        )
        .init();

    let config_dir = std::env::var("PAYROLL_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));
    let bind_addr =
        std::env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let loader = ConfigLoader::load(&config_dir)?;
    let app = create_router(AppState::with_config(loader.into_config()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("payroll-engine listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
