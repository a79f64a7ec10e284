use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Location of the backing store.
///
/// Handlers receive this at construction time and open a fresh connection
/// from it for every request; nothing reads the environment mid-request.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
}

impl DatabaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Filesystem path of the SQLite database. Accepts either a bare path or a
    /// `sqlite://` / `sqlite:` prefixed URL.
    pub fn db_path(&self) -> Result<PathBuf> {
        let raw = self.database_url.trim();
        let path = raw
            .strip_prefix("sqlite://")
            .or_else(|| raw.strip_prefix("sqlite:"))
            .unwrap_or(raw);

        if path.is_empty() {
            return Err(Error::Config("database url is empty".to_string()));
        }
        Ok(PathBuf::from(path))
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "./data/ejournal.db".to_string(),
        }
    }
}
