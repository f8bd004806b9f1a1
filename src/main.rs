//! frqkit CLI - UTAU Frequency-Track Toolkit
//!
//! Command-line interface for inspecting, correcting, and generating
//! frq pitch-track files.

use clap::Parser;
use env_logger::Env;
use log::info;

use frqkit::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("frqkit v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd).await,
        None => {
            println!("frqkit v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

async fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Info { path } => commands::info(&path),
        Commands::Correct { path, output } => commands::correct(&path, output.as_deref()),
        Commands::Gen {
            dir,
            engine,
            pool_size,
            samples_per_point,
            force,
            config,
        } => {
            commands::gen(
                &dir,
                engine,
                pool_size,
                samples_per_point,
                force,
                config.as_deref(),
            )
            .await
        }
    }
}
