//! Service entry point: tracing, settings, and the HTTP listener.

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use telemetry_backend::server::{AppSettings, create_server};

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

    let settings =
        AppSettings::load_from_iter(std::env::args_os()).map_err(std::io::Error::other)?;
    info!(
        port = settings.port(),
        database = %settings.database_path().display(),
        "starting telemetry backend"
    );

    create_server(&settings)?.await
}
