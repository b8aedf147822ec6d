//! Persistability CLI
//!
//! Command-line interface for schema preparation and round-trip verification

use clap::{Parser, Subcommand};
use persistability_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "persistability")]
#[command(about = "Persistability - object-relational round-trip verification", long_about = None)]
struct Cli {
    /// Emit JSON logs instead of human-readable ones
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending changesets to the database
    Migrate(commands::migrate::MigrateArgs),
    /// List applied and pending changesets
    Status(commands::status::StatusArgs),
    /// Prepare the schema and round-trip every registered type
    Verify(commands::verify::VerifyArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args),
        Commands::Status(args) => commands::status::execute(args),
        Commands::Verify(args) => commands::verify::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
