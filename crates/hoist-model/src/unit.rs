//! Source units.

use hoist_common::UnitId;
use serde::Serialize;
use std::path::PathBuf;

/// One source file of the program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    pub id: UnitId,
    pub path: PathBuf,
    /// Declared package, empty for the default package.
    pub package: String,
    pub text: String,
}

impl SourceUnit {
    /// Directory that package directories are relative to.
    ///
    /// For `src/p/q/A.java` in package `p.q` this is `src`. When the path
    /// does not follow the package layout, the unit's own directory is used.
    #[must_use]
    pub fn source_root(&self) -> PathBuf {
        let dir = self
            .path
            .parent()
            .map(std::path::Path::to_path_buf)
            .unwrap_or_default();
        if self.package.is_empty() {
            return dir;
        }
        let segments: Vec<&str> = self.package.split('.').collect();
        let mut root = dir.clone();
        for segment in segments.iter().rev() {
            if root.file_name().and_then(|n| n.to_str()) != Some(*segment) {
                return dir;
            }
            root.pop();
        }
        root
    }

    /// Path a top-level type `name` of `package` gets next to this unit.
    #[must_use]
    pub fn sibling_path(&self, package: &str, name: &str) -> PathBuf {
        if package == self.package {
            let mut path = self
                .path
                .parent()
                .map(std::path::Path::to_path_buf)
                .unwrap_or_default();
            path.push(format!("{name}.java"));
            return path;
        }
        let mut path = self.source_root();
        if !package.is_empty() {
            path.extend(package.split('.'));
        }
        path.push(format!("{name}.java"));
        path
    }
}
