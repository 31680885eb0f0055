use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Args as ClapArgs, Parser, Subcommand};
use rescue_core::{
    GatewayConfig, ModelSelector, RatePolicy,
    upstream::{DEFAULT_ENDPOINT, HEAVY_MODEL, LIGHT_MODEL},
};

use crate::cli::{IncidentCommands, PlanCommands};

/// Plan generation and incident persistence gateway for disaster response
///
/// `rescue serve` runs the HTTP gateway that turns incident reports into
/// structured response plans through an OpenAI-compatible model and keeps
/// incident records. The other commands read the same database from the
/// terminal.
#[derive(Parser)]
#[command(version, about, name = "rescue")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/rescue/rescue.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Rescue CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway
    Serve(ServeArgs),
    /// Inspect stored incidents
    #[command(alias = "i")]
    Incident {
        #[command(subcommand)]
        command: IncidentCommands,
    },
    /// Inspect cached plans or draft one offline
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

/// Options for `rescue serve`
#[derive(ClapArgs)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    pub bind: SocketAddr,

    /// API key for the chat completion endpoint; without it only cached
    /// plans are served
    #[arg(long, env = "RESCUE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer token required for incident writes; without it writes are
    /// rejected
    #[arg(long, env = "RESCUE_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// OpenAI-compatible chat completion endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub upstream_url: String,

    /// Model used for small incidents
    #[arg(long, default_value = LIGHT_MODEL)]
    pub light_model: String,

    /// Model used for large or complex incidents
    #[arg(long, default_value = HEAVY_MODEL)]
    pub heavy_model: String,

    /// Upper bound for one upstream call, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Plan requests allowed per caller per window
    #[arg(long, default_value_t = 30)]
    pub rate_limit: u32,

    /// Rate limit window length, in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window_secs: u64,

    /// Keep all state in memory instead of the database file
    #[arg(long)]
    pub ephemeral: bool,
}

impl From<ServeArgs> for GatewayConfig {
    fn from(val: ServeArgs) -> Self {
        GatewayConfig {
            upstream_url: val.upstream_url,
            api_key: val.api_key.filter(|k| !k.is_empty()),
            auth_token: val.auth_token.filter(|t| !t.is_empty()),
            models: ModelSelector {
                light: val.light_model,
                heavy: val.heavy_model,
            },
            timeout: Duration::from_secs(val.timeout_secs),
            rate_policy: RatePolicy {
                limit: val.rate_limit,
                window_secs: val.rate_window_secs,
            },
        }
    }
}
