pub mod analyze;
pub mod create;
pub mod shared;
pub mod validators;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Analyze a capture and print the inferred service model")]
    Analyze(analyze::AnalyzeArgs),
    #[command(about = "Generate an MCP proxy server from a capture")]
    Create(create::CreateArgs),
}

/// First arguments that select a subcommand explicitly.
pub const SUBCOMMAND_NAMES: &[&str] = &["analyze", "create", "help"];
