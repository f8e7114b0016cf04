//! Eventures CLI - browse geocoded events from the command line.
//!
//! Runs a map session against a JSON file of events and prints what a map
//! view would show: the marker list, the focused marker and page
//! availability.

mod commands;
mod config;
mod error;
mod source;
mod viewpoint;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::config::ConfigCommands;
use crate::commands::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "eventures", version, about = "Browse geocoded events on a map")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search an events file and walk through the results
    Search(SearchArgs),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search(args) => commands::search::run(args),
        Commands::Config(command) => commands::config::run(command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
