//! Soundbank Registry CLI
//!
//! The command-line interface for applying generation batches to the bank
//! registry and inspecting what the registry holds.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            // No command provided - show help hint
            println!("{} Soundbank Registry CLI", "bankreg".green().bold());
            println!();
            println!("Run {} for available commands.", "bankreg --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    let cwd = std::env::current_dir()?;
    match cmd {
        Commands::Apply {
            added,
            removed,
            delta,
            json,
        } => commands::run_apply(&cwd, &added, &removed, delta.as_deref(), json),
        Commands::Status { json } => commands::run_status(&cwd, json),
        Commands::Banks { json } => commands::run_banks(&cwd, json),
        Commands::Show { name, json } => commands::run_show(&cwd, &name, json),
        Commands::Groups { json } => commands::run_groups(&cwd, json),
    }
}
