use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::info;

pub const APP_NAME: &str = "hr_api";

/// Build client options from configuration without touching the network.
pub async fn client_options(cfg: &DatabaseConfig) -> anyhow::Result<ClientOptions> {
    let mut opts = ClientOptions::parse(cfg.url.trim()).await?;
    opts.app_name = Some(APP_NAME.to_string());
    opts.max_pool_size = Some(cfg.max_pool_size);
    opts.min_pool_size = Some(cfg.min_pool_size);
    opts.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    opts.server_selection_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    Ok(opts)
}

/// Connect and verify the deployment answers a `ping`.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Database> {
    let client = Client::with_options(client_options(cfg).await?)?;
    let db = client.database(&cfg.name);
    db.run_command(doc! { "ping": 1 }).await?;
    info!(database = %cfg.name, "connected to mongodb");
    Ok(db)
}
