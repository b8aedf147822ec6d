//! Structural property comparison
//!
//! Compares two values through their serde representation: every serialized
//! field is a property, nested objects and sequences are compared by value,
//! and fields marked `#[serde(skip)]` are internal state that never takes
//! part. Differences are reported by property path, e.g.
//! `employees[0].name`.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::errors::{PersistabilityError, Result};

/// One property whose values differ between the two compared objects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDifference {
    /// Concrete property path, with sequence indices
    pub path: String,
    /// Value on the expected side, `None` when the property is absent there
    pub expected: Option<Value>,
    /// Value on the actual side, `None` when the property is absent there
    pub actual: Option<Value>,
}

impl PropertyDifference {
    pub fn new(path: impl Into<String>, expected: Option<Value>, actual: Option<Value>) -> Self {
        Self {
            path: path.into(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for PropertyDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn render(value: &Option<Value>) -> String {
            value
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_else(|| "<absent>".to_string())
        }
        write!(
            f,
            "{}: expected {}, was {}",
            self.path,
            render(&self.expected),
            render(&self.actual)
        )
    }
}

/// Compares objects property by property
///
/// No property is ignored unless registered with [`ignoring`](Self::ignoring).
/// An ignored path matches either its concrete form (`employees[0].id`) or
/// its index-free pattern form (`employees[].id`), and covers everything
/// nested below it.
#[derive(Debug, Clone, Default)]
pub struct PropertyComparator {
    ignored: BTreeSet<String>,
}

impl PropertyComparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow the property at `path` to differ
    pub fn ignoring(mut self, path: impl Into<String>) -> Self {
        self.ignored.insert(path.into());
        self
    }

    /// Paths allowed to differ
    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.ignored.iter().map(String::as_str)
    }

    /// List every differing property, in path order
    pub fn differences<T: Serialize + ?Sized>(
        &self,
        expected: &T,
        actual: &T,
    ) -> Result<Vec<PropertyDifference>> {
        let expected = to_value(expected)?;
        let actual = to_value(actual)?;
        let mut out = Vec::new();
        self.diff("", "", Some(&expected), Some(&actual), &mut out);
        Ok(out)
    }

    /// Fail with a `PropertyMismatch` naming `label` unless all properties match
    pub fn assert_same<T: Serialize + ?Sized>(
        &self,
        label: &str,
        expected: &T,
        actual: &T,
    ) -> Result<()> {
        let differences = self.differences(expected, actual)?;
        if differences.is_empty() {
            Ok(())
        } else {
            Err(PersistabilityError::PropertyMismatch {
                label: label.to_string(),
                differences,
            })
        }
    }

    fn is_ignored(&self, path: &str, pattern: &str) -> bool {
        !path.is_empty() && (self.ignored.contains(path) || self.ignored.contains(pattern))
    }

    fn diff(
        &self,
        path: &str,
        pattern: &str,
        expected: Option<&Value>,
        actual: Option<&Value>,
        out: &mut Vec<PropertyDifference>,
    ) {
        if self.is_ignored(path, pattern) {
            return;
        }

        match (expected, actual) {
            (Some(Value::Object(e)), Some(Value::Object(a))) => {
                let keys: BTreeSet<&String> = e.keys().chain(a.keys()).collect();
                for key in keys {
                    self.diff(
                        &join(path, key),
                        &join(pattern, key),
                        e.get(key.as_str()),
                        a.get(key.as_str()),
                        out,
                    );
                }
            }
            (Some(Value::Array(e)), Some(Value::Array(a))) => {
                let item_pattern = format!("{}[]", pattern);
                for i in 0..e.len().max(a.len()) {
                    self.diff(
                        &format!("{}[{}]", path, i),
                        &item_pattern,
                        e.get(i),
                        a.get(i),
                        out,
                    );
                }
            }
            (e, a) if e != a => out.push(PropertyDifference::new(
                if path.is_empty() { "<root>" } else { path },
                e.cloned(),
                a.cloned(),
            )),
            _ => {}
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| PersistabilityError::Serialization {
        message: format!("Failed to read properties: {}", e),
    })
}
