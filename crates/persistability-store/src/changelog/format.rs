//! Changelog file schema
//!
//! Defines the YAML structure of a declarative changelog:
//!
//! ```yaml
//! databaseChangeLog:
//!   - changeSet:
//!       id: 1
//!       author: thinkinglabs
//!       changes:
//!         - createTable:
//!             tableName: company
//!             columns:
//!               - column:
//!                   name: id
//!                   type: INTEGER
//!                   autoIncrement: true
//!                   constraints:
//!                     primaryKey: true
//!   - include:
//!       file: db-changelog-indexes.yaml
//!       relativeToChangelogFile: true
//! ```

use serde::{Deserialize, Serialize};

/// Top-level changelog document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangeLogFile {
    /// Entries in declaration order
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub database_change_log: Vec<ChangeLogEntry>,
}

/// One entry of a changelog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeLogEntry {
    ChangeSet(ChangeSetDef),
    Include(IncludeDef),
}

/// A uniquely identified, immutable group of changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangeSetDef {
    /// Changeset ID (string or number in YAML)
    #[serde(deserialize_with = "deserialize_scalar_id")]
    pub id: String,

    pub author: String,

    /// Context expression; the changeset runs only when it matches
    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    pub changes: Vec<Change>,
}

/// Reference to another changelog resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IncludeDef {
    pub file: String,

    /// Resolve `file` against the including changelog's directory
    #[serde(default)]
    pub relative_to_changelog_file: bool,
}

/// A single schema change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Change {
    CreateTable(CreateTable),
    AddColumn(AddColumn),
    CreateIndex(CreateIndex),
    DropTable(DropTable),
    Sql(SqlChange),
}

impl Change {
    /// Short human-readable description, recorded in the history table
    pub fn describe(&self) -> String {
        match self {
            Change::CreateTable(c) => format!("createTable tableName={}", c.table_name),
            Change::AddColumn(c) => format!("addColumn tableName={}", c.table_name),
            Change::CreateIndex(c) => format!("createIndex indexName={}", c.index_name),
            Change::DropTable(c) => format!("dropTable tableName={}", c.table_name),
            Change::Sql(_) => "sql".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTable {
    pub table_name: String,
    pub columns: Vec<ColumnEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddColumn {
    pub table_name: String,
    pub columns: Vec<ColumnEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateIndex {
    pub index_name: String,
    pub table_name: String,
    #[serde(default)]
    pub unique: bool,
    pub columns: Vec<ColumnEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DropTable {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SqlChange {
    pub sql: String,
}

/// List item wrapper (`- column: {...}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnEntry {
    pub column: ColumnDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColumnDef {
    pub name: String,

    /// Column type; required everywhere except in `createIndex`
    #[serde(default, rename = "type")]
    pub column_type: Option<String>,

    #[serde(default)]
    pub auto_increment: bool,

    /// Literal SQL default value
    #[serde(default)]
    pub default_value: Option<String>,

    #[serde(default)]
    pub constraints: Option<ColumnConstraints>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColumnConstraints {
    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub nullable: Option<bool>,

    #[serde(default)]
    pub unique: bool,

    /// Foreign key target, `table(column)`
    #[serde(default)]
    pub references: Option<String>,

    #[serde(default)]
    pub foreign_key_name: Option<String>,
}

/// Accept a changeset ID written as a string or a number
fn deserialize_scalar_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer changeset id")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            if value.trim().is_empty() {
                return Err(E::custom("changeset id cannot be empty"));
            }
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
