// SPDX-License-Identifier: Apache-2.0
use std::io::Write;
use std::sync::Arc;
use clap::Args;
use crate::config::app::AppConfig;
use crate::driver::{ContentStore, ReferenceIndex};
use crate::error::cache::CacheError;
use crate::handlers::pull::PullHandler;
use crate::registry::client::RegistryClient;
use crate::registry::reference::Reference;

#[derive(Args, Debug)]
pub struct PullOptions {
    /// Reference to fetch, host/repository[:tag|@digest]
    pub reference: String,
}

impl PullOptions {

    /// Fetch the artifact into the cache and print the digest the reference is now bound to
    pub async fn run<W: Write>(&self, config: &AppConfig, store: Arc<dyn ContentStore>, index: Arc<dyn ReferenceIndex>, out: &mut W) -> Result<(), CacheError> {
        let reference = Reference::parse(&self.reference)?;

        let client = Arc::new(RegistryClient::new(config)?);
        let handler = PullHandler::new(client, store, index);
        let digest = handler.pull(&reference).await?;

        writeln!(out, "{} {}", reference, digest)?;
        Ok(())
    }
}
