#![cfg(test)]
use mongodb::Database;

/// Throwaway MongoDB database for integration-style tests.
///
/// Returns `None` when `MONGODB_URL` is unset so the suite still runs without
/// a server. Each call gets its own database name; callers drop it when done.
pub async fn mongo_db() -> Result<Option<Database>, anyhow::Error> {
    let Ok(url) = std::env::var("MONGODB_URL") else {
        eprintln!("MONGODB_URL missing; skip mongo-backed tests");
        return Ok(None);
    };
    let cfg = configs::DatabaseConfig {
        url,
        name: format!("hr_test_{}", uuid::Uuid::new_v4().simple()),
        connect_timeout_secs: 5,
        ..Default::default()
    };
    Ok(Some(models::db::connect(&cfg).await?))
}
