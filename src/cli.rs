use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::auth::Token;
use crate::config;
use crate::providers::azure::AzureDevOpsProvider;

#[derive(Parser)]
#[command(name = "adolens")]
#[command(author, version, about = "Azure DevOps Pipeline Health Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output file path (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Azure DevOps personal access token
    #[arg(short, long, env = "AZURE_DEVOPS_PAT", hide_env_values = true)]
    token: String,

    /// Azure DevOps organization name
    #[arg(short = 'O', long, env = "AZURE_DEVOPS_ORG")]
    organization: String,

    /// Azure DevOps instance URL
    #[arg(short, long, default_value = "https://dev.azure.com")]
    url: String,
}

impl ConnectionArgs {
    fn provider(&self) -> Result<AzureDevOpsProvider> {
        Ok(AzureDevOpsProvider::new(
            &self.url,
            &self.organization,
            Token::from(self.token.as_str()),
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate pipeline health for every configured application
    Report {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Path to the applications JSON config file
        #[arg(short, long, default_value = "applications.json")]
        config: PathBuf,
    },

    /// Show the by-assembly test scope of one application
    Scope {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Path to the applications JSON config file
        #[arg(short, long, default_value = "applications.json")]
        config: PathBuf,

        /// Application id from the config file
        #[arg(short, long)]
        app: String,
    },

    /// List the projects reachable in the organization
    Projects {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Report { connection, config } => {
                let applications = config::load_applications(config)?;
                info!(
                    "Aggregating pipeline health for {} applications",
                    applications.len()
                );

                let provider = connection.provider()?;
                let report = provider.fetch_applications(&applications).await;

                self.write_output(&report)
            }

            Commands::Scope {
                connection,
                config,
                app,
            } => {
                let applications = config::load_applications(config)?;
                let application = applications
                    .iter()
                    .find(|a| a.id == *app)
                    .ok_or_else(|| anyhow!("No application with id '{app}' in config"))?;

                info!("Collecting test scope for application: {}", application.name);

                let provider = connection.provider()?;
                let scope = provider.fetch_test_scope(application).await;

                self.write_output(&scope)
            }

            Commands::Projects { connection } => {
                let provider = connection.provider()?;
                let projects = provider.list_projects().await?;

                info!("Found {} projects", projects.len());
                self.write_output(&projects)
            }
        }
    }

    fn write_output<T: Serialize>(&self, value: &T) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Results written to: {}", output_path.display());
        } else {
            println!("{}", json_output);
        }

        Ok(())
    }
}
