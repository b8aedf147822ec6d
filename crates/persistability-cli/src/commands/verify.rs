//! Verify command
//!
//! Usage: persistability verify [--database PATH] [--collect-all]

use super::unit::UnitArgs;
use clap::Args;
use persistability_engine::commands::run_verification;
use persistability_engine::FailurePolicy;

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub unit: UnitArgs,

    /// Run every case and report all failures instead of stopping at the first
    #[arg(long)]
    pub collect_all: bool,
}

/// Execute verify command
pub fn execute(args: VerifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.unit.resolve()?;
    let policy = if args.collect_all {
        FailurePolicy::CollectAll
    } else {
        FailurePolicy::FailFast
    };

    let report = run_verification(&config, policy)?;
    println!("{}", report);

    report.into_result()?;
    Ok(())
}
