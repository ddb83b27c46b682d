//! rad-extract - Radiology report entity extraction CLI
//!
//! Usage:
//!   rad-extract extract <input_file> [output_file]
//!   rad-extract batch <input_dir> [output_dir] [--pattern <glob>]
//!   rad-extract view <jsonl_file> [--record <n>] [--markup]

use std::process::ExitCode;

use clap::Parser;

use rad_cli::{logging, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = rad_cli::load_config(cli.config.as_deref())?;
    logging::init(&config.logging, cli.command.is_interactive())?;

    rad_cli::run(cli, config).await
}
