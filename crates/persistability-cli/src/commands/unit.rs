//! Persistence unit selection shared by every command

use clap::Args;
use persistability_store::PersistenceUnitConfig;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct UnitArgs {
    /// Persistence unit; settings load from config/<UNIT>.toml and PERSISTABILITY__* variables
    #[arg(long, default_value = persistability_store::config::DEFAULT_UNIT)]
    pub unit: String,

    /// Database file, or :memory:
    #[arg(long)]
    pub database: Option<String>,

    /// Changelog resource to apply
    #[arg(long)]
    pub changelog: Option<String>,

    /// Read changelogs from this directory instead of the embedded ones
    #[arg(long)]
    pub changelog_dir: Option<PathBuf>,
}

impl UnitArgs {
    /// Load the unit and apply command-line overrides
    pub fn resolve(&self) -> Result<PersistenceUnitConfig, Box<dyn std::error::Error>> {
        let mut config = PersistenceUnitConfig::load(&self.unit)?;
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(changelog) = &self.changelog {
            config.changelog = changelog.clone();
        }
        if let Some(dir) = &self.changelog_dir {
            config.changelog_dir = Some(dir.clone());
        }
        Ok(config)
    }
}
