mod auth;
mod cli;
mod config;
mod error;
mod models;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting AdoLens - Azure DevOps Pipeline Health Tool");
    cli.execute().await?;

    Ok(())
}
