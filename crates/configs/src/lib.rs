use std::io;

use anyhow::anyhow;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub collections: CollectionNames,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            name: default_db_name(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: default_min_pool_size(),
            connect_timeout_secs: default_connect_timeout(),
            collections: CollectionNames::default(),
        }
    }
}

fn default_db_name() -> String { "hr".into() }
fn default_max_pool_size() -> u32 { 10 }
fn default_min_pool_size() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }

/// Names of the three collections the departments resource touches.
/// Employees and benefits are owned by other services.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionNames {
    #[serde(default = "default_department_collection")]
    pub department: String,
    #[serde(default = "default_employee_collection")]
    pub employee: String,
    #[serde(default = "default_benefit_collection")]
    pub benefit: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            department: default_department_collection(),
            employee: default_employee_collection(),
            benefit: default_benefit_collection(),
        }
    }
}

fn default_department_collection() -> String { "department".into() }
fn default_employee_collection() -> String { "employee".into() }
fn default_benefit_collection() -> String { "benefit".into() }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// `compact` or `json`
    #[serde(default)]
    pub format: Option<String>,
    /// EnvFilter directives used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}

pub const MEMORY_URL_SCHEME: &str = "memory://";

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load and validate the file at [`config_path`]. `Ok(None)` only when the
    /// file does not exist; a file that fails to read, parse or validate is an
    /// error.
    pub fn load_if_present() -> Result<Option<Self>> {
        Self::load_path_if_present(&config_path())
    }

    pub fn load_path_if_present(path: &str) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read {path}")),
        };
        let mut cfg = parse(&content).with_context(|| format!("parse {path}"))?;
        cfg.normalize_and_validate().with_context(|| format!("validate {path}"))?;
        Ok(Some(cfg))
    }

    /// Configuration assembled purely from environment variables, used when
    /// no config file is present.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        cfg.logging.format = std::env::var("LOG_FORMAT").ok();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
        if let Ok(name) = std::env::var("DATABASE_NAME") {
            if !name.trim().is_empty() {
                self.name = name;
            }
        }
    }

    /// `memory://` selects the in-process store instead of MongoDB.
    pub fn is_memory(&self) -> bool {
        self.url.trim().to_lowercase().starts_with(MEMORY_URL_SCHEME)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or via DATABASE_URL"));
        }
        let lower = self.url.trim().to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://") || self.is_memory()) {
            return Err(anyhow!("database.url must start with mongodb://, mongodb+srv:// or memory://"));
        }
        if self.name.trim().is_empty() {
            return Err(anyhow!("database.name must not be empty"));
        }
        if self.max_pool_size == 0 {
            return Err(anyhow!("database.max_pool_size must be >= 1"));
        }
        if self.max_pool_size < self.min_pool_size {
            return Err(anyhow!("database.max_pool_size must be >= min_pool_size"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(anyhow!("database.connect_timeout_secs must be a positive number of seconds"));
        }
        let c = &self.collections;
        if [&c.department, &c.employee, &c.benefit].iter().any(|n| n.trim().is_empty()) {
            return Err(anyhow!("database.collections names must not be empty"));
        }
        Ok(())
    }
}
