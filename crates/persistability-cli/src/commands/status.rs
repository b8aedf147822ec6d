//! Status command
//!
//! Usage: persistability status [--database PATH] [--changelog ID]

use super::unit::UnitArgs;
use clap::Args;
use persistability_engine::commands::schema_status;
use persistability_store::EntityManagerFactory;

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub unit: UnitArgs,
}

/// Execute status command
pub fn execute(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.unit.resolve()?;
    let em = EntityManagerFactory::new(config.clone()).create_entity_manager()?;
    let status = schema_status(&em, &config)?;

    for applied in &status.applied {
        println!(
            "applied  {} ({}) at {}",
            applied.key(),
            applied.changelog,
            applied.executed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    for modified in &status.modified {
        println!("modified {} ({})", modified.key(), modified.changelog);
    }
    for pending in &status.pending {
        println!("pending  {} ({})", pending.key(), pending.changelog);
    }

    if status.is_up_to_date() {
        println!("up to date");
    } else {
        println!(
            "{} pending, {} modified",
            status.pending.len(),
            status.modified.len()
        );
    }

    Ok(())
}
