// SPDX-License-Identifier: Apache-2.0
use std::io::Write;
use std::sync::Arc;
use clap::Args;
use crate::driver::{ContentStore, ReferenceIndex};
use crate::error::cache::CacheError;
use crate::error::error_kind::ErrorKind;
use crate::models::types::PredicateSet;
use crate::output::table::write_descriptors;
use crate::query::engine::QueryEngine;
use crate::registry::reference::Reference;

#[derive(Args, Debug)]
pub struct InspectOptions {
    /// Cached reference to list, host/repository[:tag|@digest]
    #[arg(short, long)]
    pub reference: Option<String>,

    /// Required annotations, key=value, repeatable or comma separated
    #[arg(short, long, value_parser = parse_attribute, value_delimiter = ',')]
    pub attributes: Vec<(String, String)>,
}

impl InspectOptions {

    /// Checks the options before anything is opened
    pub fn validate(&self) -> Result<(), CacheError> {
        match self.reference {
            Some(ref reference) if !reference.is_empty() => Ok(()),
            _ => Err(CacheError::new(ErrorKind::Validation).with_context("must specify a reference with --reference")),
        }
    }

    /// Later duplicates of a key win
    pub fn predicates(&self) -> PredicateSet {
        self.attributes.iter().cloned().collect()
    }

    /// List the matching descriptors of the reference as a table
    pub async fn run<W: Write>(&self, store: Arc<dyn ContentStore>, index: Arc<dyn ReferenceIndex>, out: &mut W) -> Result<(), CacheError> {
        self.validate()?;

        // validate() guarantees the reference
        let raw = self.reference.as_deref().unwrap_or_default();

        // Pulls bind the canonical form, a reference that does not parse was never pulled
        let key = match Reference::parse(raw) {
            Ok(reference) => reference.to_string(),
            Err(e) => {
                tracing::debug!("Looking up unparsed reference {}: {}", raw, e);
                raw.to_string()
            }
        };

        let engine = QueryEngine::new(store, index);
        let descriptors = engine.list(&key, &self.predicates()).await.map_err(|e| match e.kind {
            ErrorKind::NotStored => CacheError::not_stored(raw),
            _ => e,
        })?;

        writeln!(out, "Listing matching descriptors for source:  {}", raw)?;
        write_descriptors(out, &descriptors)?;
        Ok(())
    }
}

/// Parse a single key=value attribute
fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid attribute {}, expected key=value", raw)),
    }
}
