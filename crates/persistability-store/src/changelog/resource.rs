//! Changelog resource accessors
//!
//! A changelog and the files it includes are addressed by resource
//! identifiers such as `db-changelog.yaml` or `schema/indexes.yaml`.
//! Accessors turn an identifier into the changelog text.

use crate::errors::{changelog_not_found, io_error, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Reads changelog resources by identifier
pub trait ResourceAccessor {
    /// Read the resource's full text
    fn read(&self, resource: &str) -> Result<String>;

    /// Where resources come from, for diagnostics
    fn describe(&self) -> String;
}

impl<A: ResourceAccessor + ?Sized> ResourceAccessor for &A {
    fn read(&self, resource: &str) -> Result<String> {
        (**self).read(resource)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<A: ResourceAccessor + ?Sized> ResourceAccessor for Box<A> {
    fn read(&self, resource: &str) -> Result<String> {
        (**self).read(resource)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Changelogs compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    resources: BTreeMap<String, String>,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource
    pub fn with(mut self, resource: impl Into<String>, content: impl Into<String>) -> Self {
        self.resources.insert(resource.into(), content.into());
        self
    }

    /// The changelogs shipped with this crate
    pub fn builtin() -> Self {
        Self::new()
            .with(
                "db-changelog.yaml",
                include_str!("../../changelog/db-changelog.yaml"),
            )
            .with(
                "db-changelog-indexes.yaml",
                include_str!("../../changelog/db-changelog-indexes.yaml"),
            )
    }

    /// Identifiers of every embedded resource
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

impl ResourceAccessor for EmbeddedResources {
    fn read(&self, resource: &str) -> Result<String> {
        self.resources
            .get(&normalize(resource))
            .cloned()
            .ok_or_else(|| changelog_not_found(resource))
    }

    fn describe(&self) -> String {
        "embedded".to_string()
    }
}

/// Changelogs below a root directory
#[derive(Debug, Clone)]
pub struct FileSystemResources {
    root: PathBuf,
}

impl FileSystemResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceAccessor for FileSystemResources {
    fn read(&self, resource: &str) -> Result<String> {
        let normalized = normalize(resource);
        if normalized.starts_with("../") || normalized == ".." {
            return Err(changelog_not_found(resource));
        }
        let path = self.root.join(&normalized);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(changelog_not_found(resource))
            }
            Err(e) => Err(io_error("read_changelog", e).with_entity_id(resource)),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Resolve an include relative to the changelog that declares it
pub fn resolve_include(including: &str, file: &str, relative_to_changelog_file: bool) -> String {
    if !relative_to_changelog_file {
        return normalize(file);
    }
    match Path::new(including).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            normalize(&dir.join(file).to_string_lossy())
        }
        _ => normalize(file),
    }
}

/// Canonical resource identifier: forward slashes, no `.` segments, `..`
/// folded into its parent where possible
pub fn normalize(resource: &str) -> String {
    let unified = resource.replace('\\', "/");
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => match parts.last() {
                Some(last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push("..".to_string()),
            },
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistability_core::errors::ExErrorKind;

    #[test]
    fn test_builtin_contains_master_changelog() {
        let resources = EmbeddedResources::builtin();
        let content = resources.read("db-changelog.yaml").unwrap();
        assert!(content.contains("databaseChangeLog"));
    }

    #[test]
    fn test_missing_resource() {
        let err = EmbeddedResources::new().read("nope.yaml").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ResourceNotFound);
    }

    #[test]
    fn test_resolve_include() {
        assert_eq!(
            resolve_include("schema/master.yaml", "tables.yaml", true),
            "schema/tables.yaml"
        );
        assert_eq!(
            resolve_include("schema/master.yaml", "tables.yaml", false),
            "tables.yaml"
        );
        assert_eq!(
            resolve_include("schema/master.yaml", "../shared/x.yaml", true),
            "shared/x.yaml"
        );
        assert_eq!(resolve_include("master.yaml", "./a.yaml", true), "a.yaml");
    }

    #[test]
    fn test_filesystem_refuses_to_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSystemResources::new(dir.path())
            .read("../etc/passwd")
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ResourceNotFound);
    }
}
