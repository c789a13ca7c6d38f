//! CLI command definitions and dispatch.

pub mod buyer;
pub mod fraud;
pub mod ingest;
pub mod inspector;
pub mod status;
pub mod sync;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gstwatch")]
#[command(about = "GST reconciliation and fraud-graph analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a directory of JSON source files into the store
    Ingest(ingest::IngestArgs),

    /// Project the document collections into the Neo4j graph
    Sync,

    /// Buyer-side reconciliation views
    Buyer {
        #[command(subcommand)]
        command: buyer::BuyerCommands,
    },

    /// Fraud-pattern graph queries
    Fraud {
        #[command(subcommand)]
        command: fraud::FraudCommands,
    },

    /// Inspector-grade global queries
    Inspector {
        #[command(subcommand)]
        command: inspector::InspectorCommands,
    },

    /// Store and graph connection status
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Ingest(args) => ingest::execute(args).await,
            Commands::Sync => sync::execute().await,
            Commands::Buyer { command } => buyer::execute(command).await,
            Commands::Fraud { command } => fraud::execute(command).await,
            Commands::Inspector { command } => inspector::execute(command).await,
            Commands::Status => status::execute().await,
        }
    }
}
