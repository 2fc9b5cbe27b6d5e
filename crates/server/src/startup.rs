use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::{init_logging, LogFormat};
use configs::AppConfig;
use dotenvy::dotenv;
use service::department::{DepartmentRepository, MemoryDepartmentRepository, MongoDepartmentRepository};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) when it exists, environment variables
/// otherwise. A config file that exists but is broken is an error, never a
/// reason to fall back. Loads `.env` first.
pub fn load_config() -> Result<AppConfig, StartupError> {
    dotenv().ok();
    match AppConfig::load_if_present() {
        Ok(Some(cfg)) => Ok(cfg),
        Ok(None) => AppConfig::from_env()
            .map_err(|e| StartupError::InvalidConfig(format!("environment: {e:#}"))),
        Err(e) => Err(StartupError::InvalidConfig(format!("config file: {e:#}"))),
    }
}

/// Install the tracing subscriber described by `[logging]`.
pub fn init_logging_from(cfg: &AppConfig) {
    let format = match cfg.logging.format.as_deref().map(str::parse::<LogFormat>) {
        Some(Ok(f)) => f,
        Some(Err(e)) => {
            eprintln!("{e}; falling back to compact logs");
            LogFormat::Compact
        }
        None => LogFormat::Compact,
    };
    init_logging(format, cfg.logging.filter.as_deref());
}

/// Pick the repository backing the departments resource.
pub async fn build_repository(cfg: &AppConfig) -> Result<Arc<dyn DepartmentRepository>, StartupError> {
    if cfg.database.is_memory() {
        warn!("using in-memory department store; data is lost on exit");
        return Ok(Arc::new(MemoryDepartmentRepository::new()));
    }
    let db = models::db::connect(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Ok(Arc::new(MongoDepartmentRepository::new(&db, &cfg.database.collections)))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Connect the store and serve HTTP until the listener fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let repo = build_repository(&cfg).await?;
    let app = build_app(AppState::new(repo));

    let addr: SocketAddr = cfg.server.bind_addr().parse()?;
    info!(%addr, database = %cfg.database.name, "starting hr api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
