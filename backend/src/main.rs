//! Backend entry-point: loads settings, seeds the demo account and serves the
//! `/api/v1` REST surface.

use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use listings_backend::config::{AppSettings, BuildMode};
use listings_backend::server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = ServerConfig::from_settings(&settings, BuildMode::current())
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    create_server(config).await?.await
}
