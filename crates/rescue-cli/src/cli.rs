//! Terminal commands over the gateway's stores.
//!
//! Every command reads through the same [`Gateway`] the HTTP server uses and
//! prints markdown produced by the core `Display` implementations.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use rescue_core::{
    Gateway,
    template::{DraftInput, draft_plan},
};

use crate::renderer::TerminalRenderer;

/// Show a single incident
#[derive(Args)]
pub struct ShowIncidentArgs {
    #[arg(help = "Identifier of the incident to show")]
    pub id: String,
}

#[derive(Subcommand)]
pub enum IncidentCommands {
    /// List stored incidents
    #[command(alias = "l")]
    List,
    /// Show an incident with its update log
    #[command(alias = "s")]
    Show(ShowIncidentArgs),
}

/// Show the cached plan of an incident
#[derive(Args)]
pub struct ShowPlanArgs {
    #[arg(help = "Identifier of the incident whose plan to show")]
    pub id: String,
}

/// Draft a plan offline from a stored incident
///
/// Uses keyword rules instead of a model: scenario type, resources,
/// constraints and up to five open updates become priorities and actions.
/// Nothing is cached.
#[derive(Args)]
pub struct DraftPlanArgs {
    #[arg(help = "Identifier of the incident to draft a plan for")]
    pub id: String,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List cached plans
    #[command(alias = "l")]
    List,
    /// Show a cached plan
    #[command(alias = "s")]
    Show(ShowPlanArgs),
    /// Draft a plan without calling a model
    #[command(alias = "d")]
    Draft(DraftPlanArgs),
}

pub struct Cli {
    gateway: Gateway,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(gateway: Gateway, renderer: TerminalRenderer) -> Self {
        Self { gateway, renderer }
    }

    pub async fn handle_incident_command(&self, command: IncidentCommands) -> Result<()> {
        match command {
            IncidentCommands::List => self.list_incidents().await,
            IncidentCommands::Show(args) => {
                let incident = self
                    .gateway
                    .incidents()?
                    .get(&args.id)
                    .await
                    .with_context(|| format!("Failed to load incident {}", args.id))?;
                self.renderer.render(&incident.to_string())
            }
        }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::List => {
                let manifest = self
                    .gateway
                    .plans()?
                    .list()
                    .await
                    .context("Failed to list cached plans")?;
                self.renderer.render(&manifest.to_string())
            }
            PlanCommands::Show(args) => {
                let cached = self
                    .gateway
                    .plans()?
                    .get(&args.id)
                    .await
                    .with_context(|| format!("Failed to load plan for {}", args.id))?;
                self.renderer.render(&cached.to_string())
            }
            PlanCommands::Draft(args) => {
                let incident = self
                    .gateway
                    .incidents()?
                    .get(&args.id)
                    .await
                    .with_context(|| format!("Failed to load incident {}", args.id))?;
                let plan = draft_plan(&DraftInput::from(&incident));
                self.renderer.render(&plan.to_string())
            }
        }
    }

    pub async fn list_incidents(&self) -> Result<()> {
        let manifest = self
            .gateway
            .incidents()?
            .list()
            .await
            .context("Failed to list incidents")?;
        self.renderer.render(&manifest.to_string())
    }
}
