//! LexDraft CLI: a conversational legal drafting assistant.
//!
//! Classifies each request, pulls supporting passages from the knowledge
//! sidecar, and drafts or answers through the generation API.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
