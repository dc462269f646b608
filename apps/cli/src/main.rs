//! wpmigrate CLI: one-shot content migration from a WordPress site into a
//! Sanity dataset, plus read-side queries against the migrated content.

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
