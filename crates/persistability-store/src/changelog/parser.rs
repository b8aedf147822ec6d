//! Changelog loading
//!
//! Reads a changelog through a resource accessor, follows its includes and
//! flattens everything into the ordered list of changesets to apply.

use crate::changelog::checksums::changeset_checksum;
use crate::changelog::format::{Change, ChangeLogEntry, ChangeLogFile};
use crate::changelog::resource::{normalize, resolve_include, ResourceAccessor};
use crate::changelog::sql;
use crate::errors::{changelog_invalid, Result};
use persistability_core::errors::{ExError, PersistabilityError};
use std::collections::HashSet;

/// A changeset ready to apply
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub id: String,
    pub author: String,
    /// Resource the changeset was declared in; part of its identity
    pub changelog: String,
    pub context: Option<String>,
    pub comment: Option<String>,
    pub changes: Vec<Change>,
    /// SQL statements rendered from `changes`, in order
    pub statements: Vec<String>,
    pub checksum: String,
}

impl ChangeSet {
    /// `id::author`, the form used in logs and errors
    pub fn key(&self) -> String {
        format!("{}::{}", self.id, self.author)
    }

    /// Summary of the changes, recorded in the history table
    pub fn description(&self) -> String {
        self.changes
            .iter()
            .map(Change::describe)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A changelog with its includes expanded
#[derive(Debug, Clone)]
pub struct DatabaseChangeLog {
    /// Resource the changelog was loaded from
    pub resource: String,
    /// Changesets in declaration order, included files inlined
    pub change_sets: Vec<ChangeSet>,
}

impl DatabaseChangeLog {
    pub fn len(&self) -> usize {
        self.change_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_sets.is_empty()
    }
}

/// Load a changelog and everything it includes
///
/// Rejects include cycles and duplicate changeset identities before anything
/// is applied.
pub fn load_changelog<A: ResourceAccessor + ?Sized>(
    accessor: &A,
    resource: &str,
) -> Result<DatabaseChangeLog> {
    let resource = normalize(resource);
    let mut change_sets = Vec::new();
    let mut stack = Vec::new();
    load_into(accessor, &resource, &mut stack, &mut change_sets)?;

    let mut seen = HashSet::new();
    for cs in &change_sets {
        if !seen.insert((cs.id.as_str(), cs.author.as_str(), cs.changelog.as_str())) {
            return Err(PersistabilityError::DuplicateChangeSet {
                id: cs.id.clone(),
                author: cs.author.clone(),
                changelog: cs.changelog.clone(),
            }
            .into());
        }
    }

    Ok(DatabaseChangeLog {
        resource,
        change_sets,
    })
}

/// Parse a single changelog document; includes are not followed
pub fn parse_changelog_str(resource: &str, content: &str) -> Result<ChangeLogFile> {
    serde_yaml::from_str(content).map_err(|e| changelog_invalid(resource, e.to_string()))
}

fn load_into<A: ResourceAccessor + ?Sized>(
    accessor: &A,
    resource: &str,
    stack: &mut Vec<String>,
    out: &mut Vec<ChangeSet>,
) -> Result<()> {
    if stack.iter().any(|r| r == resource) {
        return Err(PersistabilityError::IncludeCycle {
            resource: resource.to_string(),
        }
        .into());
    }

    let content = accessor.read(resource)?;
    let file = parse_changelog_str(resource, &content)?;

    stack.push(resource.to_string());
    for entry in file.database_change_log {
        match entry {
            ChangeLogEntry::ChangeSet(def) => {
                if def.author.trim().is_empty() {
                    return Err(changelog_invalid(
                        resource,
                        format!("changeset {} has no author", def.id),
                    ));
                }
                let statements = render_all(resource, &def.id, &def.author, &def.changes)?;
                let checksum = changeset_checksum(&def.changes).map_err(|e| {
                    ExError::from(PersistabilityError::Serialization {
                        message: e.to_string(),
                    })
                })?;
                out.push(ChangeSet {
                    id: def.id,
                    author: def.author,
                    changelog: resource.to_string(),
                    context: def.context,
                    comment: def.comment,
                    changes: def.changes,
                    statements,
                    checksum,
                });
            }
            ChangeLogEntry::Include(include) => {
                let target =
                    resolve_include(resource, &include.file, include.relative_to_changelog_file);
                load_into(accessor, &target, stack, out)?;
            }
        }
    }
    stack.pop();

    Ok(())
}

fn render_all(resource: &str, id: &str, author: &str, changes: &[Change]) -> Result<Vec<String>> {
    let mut statements = Vec::new();
    for change in changes {
        let rendered = sql::render(change).map_err(|reason| {
            changelog_invalid(resource, reason).with_changeset(format!("{}::{}", id, author))
        })?;
        statements.extend(rendered);
    }
    Ok(statements)
}
