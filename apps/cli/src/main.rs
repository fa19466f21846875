//! bibledata CLI: builds the Bible text bundle for the mobile app.
//!
//! Downloads translations from the remote chapter API or converts a local
//! dataset into per-chapter `{verse, text}` JSON files.

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
