//! Migrate command
//!
//! Usage: persistability migrate [--database PATH] [--changelog ID] [--context CTX]...

use super::unit::UnitArgs;
use clap::Args;
use persistability_engine::commands::prepare::prepare_schema_with;
use persistability_store::{Contexts, EntityManagerFactory};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub unit: UnitArgs,

    /// Active context; repeat for several. Defaults to the unit's contexts
    #[arg(long = "context")]
    pub contexts: Vec<String>,
}

/// Execute migrate command
pub fn execute(args: MigrateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.unit.resolve()?;
    let contexts = if args.contexts.is_empty() {
        config.contexts()
    } else {
        Contexts::new(&args.contexts)
    };

    let em = EntityManagerFactory::new(config.clone()).create_entity_manager()?;
    let summary = prepare_schema_with(&em, &config, &contexts)?;

    for key in &summary.applied {
        println!("applied {}", key);
    }
    println!(
        "{} applied, {} already applied, {} filtered by context",
        summary.applied.len(),
        summary.skipped,
        summary.filtered
    );

    Ok(())
}
