// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;
use std::path::PathBuf;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use crate::config::db::DBConfig;
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;

pub const CONFIG_FILE_NAME:&str = "config.yaml";
const ENV_PREFIX:&str = "ARTIFACT_CACHE";
const DEFAULT_STORAGE_FOLDER:&str = ".artifact-cache";
const INDEX_FILE_NAME:&str = "index.db";

/// Configuration for the cache itself
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub db: DBConfig,

    #[serde(default)]
    pub upstreams: Vec<UpstreamConfig>,
}

impl AppConfig {

    /// Load a specific Application Config, overlaid by the ARTIFACT_CACHE__* environment variables
    pub fn load_file(source: &str, required: bool) -> Result<AppConfig, CacheError> {
        let config_error = |e: config::ConfigError| CacheError::new(ErrorKind::ConfigError)
            .with_context(format!("Failed to read config file {}", source))
            .with_error(e.to_string());

        let config = Config::builder()
            .set_default("storage.folder", DEFAULT_STORAGE_FOLDER).map_err(config_error)?
            .add_source(File::with_name(source).required(required))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build().map_err(config_error)?;

        config.try_deserialize().map_err(config_error)
    }

    /// Point the storage at another folder
    pub fn with_cache_dir(mut self, folder: &str) -> AppConfig {
        self.storage.folder = folder.to_string();
        self
    }

    /// Whether the AppConfig is valid
    pub fn is_valid(&self) -> bool {

        if self.storage.folder.is_empty() {
            tracing::error!("config has an empty storage->folder");
            return false;
        }

        if self.db.max_connections == 0 {
            tracing::error!("config has db->max_connections set to 0");
            return false;
        }

        for upstream in &self.upstreams {
            if upstream.schema != "http" && upstream.schema != "https" {
                tracing::error!("upstream {} has an invalid schema: {}", upstream.host, upstream.schema);
                return false;
            }
        }

        true
    }

    /// The SQLite URI of the reference index
    pub fn db_uri(&self) -> String {
        if self.db.uri.is_empty() {
            format!("sqlite:{}", PathBuf::from(&self.storage.folder).join(INDEX_FILE_NAME).display())
        } else {
            self.db.uri.clone()
        }
    }

    pub fn upstreams(&self) -> HashMap<String, UpstreamConfig> {
        let mut config = HashMap::default();
        for upstream in &self.upstreams {
            config.insert(upstream.host.clone(), upstream.clone());
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            storage: StorageConfig { folder: DEFAULT_STORAGE_FOLDER.to_string() },
            db: DBConfig::default(),
            upstreams: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StorageConfig {
    pub folder: String,
}

/// Overrides how a registry host is reached
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpstreamConfig {
    /// The host as written in the references
    pub host: String,

    /// The host:port actually contacted
    pub registry: String,

    /// http or https
    pub schema: String
}
