mod actor_framework;
mod app_system;
mod cli;
mod clients;
mod config;
mod domain;
mod ids;
mod journal;
mod product_actor;
mod receipt;
mod reports;
mod sale_actor;
mod session;

#[cfg(test)]
mod mock_framework;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use crate::app_system::{setup_tracing, RegisterSystem};
use crate::cli::{Cli, Command};
use crate::clients::Recovery;
use crate::config::RegisterConfig;
use crate::session::Authenticator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();

    let cli = Cli::parse();
    let mut config = RegisterConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    if cli.in_memory || matches!(cli.command, Command::Demo) {
        config.persist = false;
    }

    let session = Authenticator::new(config.accounts.clone())
        .login(&cli.user, &cli.password)
        .context("login failed")?;

    let system = RegisterSystem::start(&config).await.context("failed to start register")?;
    if system.recovery != Recovery::Clean {
        warn!(recovery = ?system.recovery, "Resolved an unfinished checkout from a previous run");
    }

    let result = cli::run(cli.command, &system, &session, &config.report_options()).await;

    session.logout();
    system.shutdown().await?;

    info!("Register closed");
    result
}
