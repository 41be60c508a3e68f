// SPDX-License-Identifier: Apache-2.0
pub mod inspect;
pub mod pull;

use std::io::Write;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use crate::cli::inspect::InspectOptions;
use crate::config::app::AppConfig;
use crate::error::cache::CacheError;
use crate::error::error_kind::ErrorKind;
use crate::handlers::service::ReferenceService;
use crate::repository::filesystem::FilesystemStorage;

/// Local cache and attribute query for OCI artifacts
#[derive(Parser, Debug)]
#[command(name = "artifact-cache", version)]
pub struct Cli {
    /// Configuration file, optional
    #[arg(long, global = true, default_value = crate::config::app::CONFIG_FILE_NAME)]
    pub config: String,

    /// Cache folder, overrides storage.folder
    #[arg(long, global = true, env = "ARTIFACT_CACHE_DIR")]
    pub cache_dir: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub loglevel: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the cached descriptors of a reference matching the given attributes
    Inspect(InspectOptions),

    /// Fetch an artifact from its registry into the cache
    Pull(pull::PullOptions),
}

impl Cli {
    /// Load the configuration, with the command line overrides applied
    pub fn app_config(&self) -> Result<AppConfig, CacheError> {
        let explicit = self.config != crate::config::app::CONFIG_FILE_NAME;
        let mut config = AppConfig::load_file(&self.config, explicit)?;

        if let Some(ref folder) = self.cache_dir {
            config = config.with_cache_dir(folder);
        }

        if !config.is_valid() {
            return Err(CacheError::new(ErrorKind::ConfigError).with_context(format!("invalid configuration {}", self.config)));
        }

        Ok(config)
    }
}

/// The content store and reference index living in the configured folder
pub async fn open_cache(config: &AppConfig) -> Result<(Arc<FilesystemStorage>, Arc<ReferenceService>), CacheError> {
    tokio::fs::create_dir_all(&config.storage.folder).await
        .map_err(|e| CacheError::from(e).with_context(format!("failed to create the cache folder {}", config.storage.folder)))?;

    let storage = Arc::new(FilesystemStorage::new(&config.storage));
    let references = Arc::new(ReferenceService::new(config).await?);

    Ok((storage, references))
}

/// Run the command, writing its result to out
pub async fn dispatch<W: Write>(cli: Cli, out: &mut W) -> Result<(), CacheError> {
    // Validation happens before any I/O, config file included
    if let Commands::Inspect(ref options) = cli.command {
        options.validate()?;
    }

    let config = cli.app_config()?;

    match cli.command {
        Commands::Inspect(options) => {
            let (storage, references) = open_cache(&config).await?;
            options.run(storage, references, out).await
        }
        Commands::Pull(options) => {
            let (storage, references) = open_cache(&config).await?;
            options.run(&config, storage, references, out).await
        }
    }
}
