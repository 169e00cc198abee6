use std::net::SocketAddr;

use anyhow::{bail, Context};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5500";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    /// Required when `storage` is [`StorageBackend::Postgres`].
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => bail!("Invalid STORAGE_BACKEND: {}. Must be 'postgres' or 'memory'", other),
        };

        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {}", raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .with_context(|| format!("BIND_ADDR is not a socket address: {}", raw_addr))?;

        Ok(Self {
            storage,
            database_url,
            max_connections,
            bind_addr,
        })
    }
}
