//! EcoEventos configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};
use crate::storage::JsonFileStorage;

static DEFAULT_DATA_FILE: &str = "~/ecoeventos/eventos.json";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

/// Environment variables `ECOEVENTOS_<KEY>` override the config file.
pub const ENV_PREFIX: &str = "ECOEVENTOS";

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Configuration at ~/.config/ecoeventos/config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct EcoConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for EcoConfig {
    fn default() -> Self {
        EcoConfig {
            data_file: default_data_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl EcoConfig {
    pub fn config_path() -> StoreResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| StoreError::Config("Could not determine config directory".into()))?
            .join("ecoeventos");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config, writing a commented-out template first if none exists.
    pub fn load() -> StoreResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit file (optional) plus `ECOEVENTOS_*` overrides.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: &Path, env: Environment) -> StoreResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env)
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| StoreError::Config(e.to_string()))
    }

    /// `data_file` with a leading `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_file.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn storage(&self) -> JsonFileStorage {
        JsonFileStorage::new(self.data_path()).with_lock_timeout(self.lock_timeout())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> StoreResult<()> {
        let contents = format!(
            "\
# EcoEventos configuration

# JSON file holding the event catalog:
# data_file = \"{}\"

# How long a write waits for the store lock, in milliseconds:
# lock_timeout_ms = {}

# HTTP listener:
# bind_address = \"{}\"
# port = {}
",
            DEFAULT_DATA_FILE, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_BIND_ADDRESS, DEFAULT_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| StoreError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
