//! Changeset contexts
//!
//! A changeset may declare a `context` expression such as `test` or
//! `test, dev`. An update runs with a set of active contexts; an empty set
//! runs every changeset.

use std::collections::BTreeSet;
use std::fmt;

/// Active contexts for an update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contexts {
    names: BTreeSet<String>,
}

impl Contexts {
    /// No active contexts: every changeset runs
    pub fn all() -> Self {
        Self::default()
    }

    /// Build from context names, ignoring blanks and case
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .flat_map(|n| split(n.as_ref()))
                .collect(),
        }
    }

    /// Parse a comma separated list (`"test, dev"`)
    pub fn parse(expression: &str) -> Self {
        Self::new([expression])
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether a changeset carrying `expression` runs under these contexts
    ///
    /// A changeset without an expression always runs. Otherwise one of its
    /// names must be active; a `!name` entry matches when `name` is not
    /// active.
    pub fn matches(&self, expression: Option<&str>) -> bool {
        if self.names.is_empty() {
            return true;
        }
        let entries = match expression {
            Some(e) => split(e),
            None => return true,
        };
        if entries.is_empty() {
            return true;
        }
        entries.iter().any(|entry| match entry.strip_prefix('!') {
            Some(negated) => !self.names.contains(negated.trim()),
            None => self.names.contains(entry),
        })
    }
}

impl fmt::Display for Contexts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        write!(f, "{}", names.join(","))
    }
}

fn split(expression: &str) -> Vec<String> {
    expression
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
