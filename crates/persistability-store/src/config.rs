//! Persistence unit configuration
//!
//! A persistence unit names the database the harness runs against and the
//! changelog that prepares it. Settings come from `config/<unit>.toml` when
//! the file exists, overridden by `PERSISTABILITY__*` environment variables
//! (`PERSISTABILITY__DATABASE=/tmp/it.db`,
//! `PERSISTABILITY__CONTEXTS=test,dev`).

use crate::changelog::resource::{EmbeddedResources, FileSystemResources, ResourceAccessor};
use crate::changelog::{Contexts, SchemaPreparer, DEFAULT_CHANGELOG};
use crate::db::IN_MEMORY;
use crate::errors::{config_error, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Unit used when none is named
pub const DEFAULT_UNIT: &str = "integration";

const ENV_PREFIX: &str = "PERSISTABILITY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersistenceUnitConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Database file path, or `:memory:` for a private in-memory database
    #[serde(default = "default_database")]
    pub database: String,
    /// Changelog resource applied before verification
    #[serde(default = "default_changelog")]
    pub changelog: String,
    /// Read changelogs from this directory instead of the embedded ones
    #[serde(default)]
    pub changelog_dir: Option<PathBuf>,
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

fn default_name() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_database() -> String {
    IN_MEMORY.to_string()
}

fn default_changelog() -> String {
    DEFAULT_CHANGELOG.to_string()
}

fn default_foreign_keys() -> bool {
    true
}

impl Default for PersistenceUnitConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            database: default_database(),
            changelog: default_changelog(),
            changelog_dir: None,
            contexts: Vec::new(),
            foreign_keys: default_foreign_keys(),
        }
    }
}

impl PersistenceUnitConfig {
    /// Load the unit `unit` from `config/<unit>.toml` (optional) and the
    /// environment
    pub fn load(unit: &str) -> Result<Self> {
        Self::load_from(unit, Path::new("config").join(format!("{}.toml", unit)))
    }

    /// Load the unit `unit` from an explicit file (optional) and the
    /// environment
    pub fn load_from(unit: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let builder = Self::builder(unit)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(environment());

        let settings = builder.build().map_err(config_error)?;
        let unit_config: PersistenceUnitConfig =
            settings.try_deserialize().map_err(config_error)?;

        tracing::debug!(
            unit = %unit_config.name,
            database = %unit_config.database,
            file = %path.display(),
            "persistence unit loaded"
        );
        Ok(unit_config)
    }

    /// Parse a unit from TOML text, without consulting the environment
    pub fn from_toml_str(unit: &str, toml: &str) -> Result<Self> {
        Self::builder(unit)?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)
    }

    fn builder(unit: &str) -> Result<ConfigBuilder<config::builder::DefaultState>> {
        Config::builder()
            .set_default("name", unit)
            .map_err(config_error)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database == IN_MEMORY
    }

    pub fn contexts(&self) -> Contexts {
        Contexts::new(&self.contexts)
    }

    /// Accessor for the configured changelog location
    pub fn resource_accessor(&self) -> Box<dyn ResourceAccessor> {
        match &self.changelog_dir {
            Some(dir) => Box::new(FileSystemResources::new(dir.clone())),
            None => Box::new(EmbeddedResources::builtin()),
        }
    }

    /// Preparer for the configured changelog
    pub fn schema_preparer(&self) -> SchemaPreparer<Box<dyn ResourceAccessor>> {
        SchemaPreparer::new(self.resource_accessor(), self.changelog.clone())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("contexts")
}
