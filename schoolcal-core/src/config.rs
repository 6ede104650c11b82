//! Server configuration.
//!
//! Values come from (later sources win):
//! 1. built-in defaults
//! 2. an optional `schoolcal.toml` in the working directory
//! 3. environment variables (`PORT`, `STORAGE`, `DATABASE_URL`, ...)

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{CalendarError, CalendarResult};

pub const DEFAULT_PORT: u16 = 3000;

static CONFIG_FILE: &str = "schoolcal";

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StorageKind,

    /// SQLite connection string, e.g. `sqlite://calendar.db`
    pub database_url: Option<String>,

    /// Path of the JSON document when `storage = "json"`
    pub data_file: Option<PathBuf>,
}

/// Where the store lives, resolved from `ServerConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    Sqlite { url: String },
    Json { path: PathBuf },
}

impl ServerConfig {
    /// Load from `schoolcal.toml` (if present) and the process environment.
    pub fn load() -> CalendarResult<Self> {
        Self::build(Environment::default().try_parsing(true))
    }

    /// Load with an explicit set of environment variables instead of the
    /// process environment.
    pub fn load_with_env<I, K, V>(vars: I) -> CalendarResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::build(Environment::default().try_parsing(true).source(Some(vars)))
    }

    fn build(env: Environment) -> CalendarResult<Self> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(env)
            .build()
            .map_err(|e| CalendarError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalendarError::Config(e.to_string()))
    }

    /// Resolve the storage backend, failing when its required settings are absent.
    pub fn storage_target(&self) -> CalendarResult<StorageTarget> {
        match self.storage {
            StorageKind::Sqlite => {
                let url = self
                    .database_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| {
                        CalendarError::Config(
                            "DATABASE_URL must be set when STORAGE is sqlite".into(),
                        )
                    })?;
                Ok(StorageTarget::Sqlite {
                    url: url.to_string(),
                })
            }
            StorageKind::Json => {
                let path = match &self.data_file {
                    Some(path) => {
                        PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
                    }
                    None => default_data_file()?,
                };
                Ok(StorageTarget::Json { path })
            }
        }
    }
}

fn default_data_file() -> CalendarResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| CalendarError::Config("Could not determine data directory".into()))?;
    Ok(data_dir.join("schoolcal").join("events.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = ServerConfig::load_with_env(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.storage, StorageKind::Sqlite);
    }

    #[test]
    fn sqlite_requires_database_url() {
        let config = ServerConfig::load_with_env(Vec::<(String, String)>::new()).unwrap();
        assert!(matches!(
            config.storage_target(),
            Err(CalendarError::Config(_))
        ));
    }

    #[test]
    fn reads_port_and_database_url_from_env() {
        let config = ServerConfig::load_with_env([
            ("PORT", "8080"),
            ("DATABASE_URL", "sqlite://calendar.db"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.storage_target().unwrap(),
            StorageTarget::Sqlite {
                url: "sqlite://calendar.db".to_string()
            }
        );
    }

    #[test]
    fn json_storage_uses_data_file() {
        let config =
            ServerConfig::load_with_env([("STORAGE", "json"), ("DATA_FILE", "/tmp/events.json")])
                .unwrap();
        assert_eq!(
            config.storage_target().unwrap(),
            StorageTarget::Json {
                path: PathBuf::from("/tmp/events.json")
            }
        );
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let result = ServerConfig::load_with_env([("PORT", "not-a-port")]);
        assert!(matches!(result, Err(CalendarError::Config(_))));
    }
}
