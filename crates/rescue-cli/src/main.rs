//! Rescue CLI Application
//!
//! Runs the plan gateway over HTTP and reads its stores from the terminal.

mod args;
mod cli;
mod renderer;
mod server;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use rescue_core::{GatewayBuilder, GatewayConfig};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let builder = GatewayBuilder::new().with_database_path(database_file);
    let renderer = TerminalRenderer::new(!no_color);

    match command {
        Some(Serve(args)) => {
            let bind = args.bind;
            let builder = if args.ephemeral {
                builder.with_memory_store()
            } else {
                builder
            };
            let config = GatewayConfig::from(args);
            if config.api_key.is_none() {
                info!("No upstream API key configured; only cached plans will be served");
            }
            let gateway = builder
                .with_config(config)
                .build()
                .await
                .context("Failed to initialize gateway")?;

            info!("Starting Rescue gateway");
            server::serve(gateway, bind).await
        }
        Some(Incident { command }) => {
            Cli::new(open(builder).await?, renderer)
                .handle_incident_command(command)
                .await
        }
        Some(Plan { command }) => {
            Cli::new(open(builder).await?, renderer)
                .handle_plan_command(command)
                .await
        }
        None => Cli::new(open(builder).await?, renderer).list_incidents().await,
    }
}

async fn open(builder: GatewayBuilder) -> Result<rescue_core::Gateway> {
    builder
        .without_rate_limit()
        .build()
        .await
        .context("Failed to initialize gateway")
}
