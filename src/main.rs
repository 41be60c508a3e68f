// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::cli::{dispatch, Cli};

mod cli;
mod config;
mod db;
mod driver;
mod error;
mod handlers;
mod models;
mod output;
mod query;
mod registry;
mod repository;

#[tokio::main]
async fn main() {

    let cli = Cli::parse();

    // Logging goes to stderr, stdout only carries the command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("artifact_cache={}", cli.loglevel).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut stdout = std::io::stdout();
    if let Err(e) = dispatch(cli, &mut stdout).await {
        tracing::debug!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
