use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "meal-lens")]
#[command(about = "Resolve meal descriptions and food photos to nutrition estimates")]
pub struct CliConfig {
    /// TOML config file; falls back to environment variables when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a free-text meal description
    Text {
        description: String,
        /// Overrides the configured locale, e.g. `pt-BR`
        #[arg(long)]
        locale: Option<String>,
    },
    /// Analyze a food photo with the dedicated image provider
    Image { path: PathBuf },
    /// Classify a food photo with the vision model
    Vision { path: PathBuf },
    /// Check that the vision model is reachable
    Probe,
    /// Resolve every row of a CSV file of meal descriptions
    Batch {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}
