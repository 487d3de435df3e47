//! Visibility Threshold Analyzer.
//!
//! `threshold(scope, target)` is the least visibility `target` must have
//! for a reference written in `scope` to stay legal. Placement questions
//! (owner, unit, package) are asked through a [`Layout`], so the same
//! analyzer serves both the program as it is and the program as it will be
//! after a pending move.
//!
//! For a member or nested type declared in type `D`, referenced from a
//! scope whose type is `S`:
//!
//! | condition (first match wins)                   | threshold        |
//! |------------------------------------------------|------------------|
//! | `S` and `D` share their top-level type         | `private`        |
//! | `D` is a supertype of `S`                      | `protected`      |
//! | `S` and `D` are declared in the same unit      | package-default  |
//! | `S` and `D` are in the same package            | package-default  |
//! | otherwise                                      | `public`         |
//!
//! Top-level types only distinguish same-package from other-package
//! access. Unit and package scopes short-circuit to the package rule
//! without consulting the hierarchy.

use crate::hierarchy::HierarchyCache;
use crate::layout::Layout;
use crate::locator::ReferencingScope;
use hoist_common::Cancelled;
use hoist_model::{Program, SymbolId, Visibility};
use tracing::trace;

pub struct VisibilityAnalyzer<'a> {
    program: &'a dyn Program,
    layout: &'a Layout<'a>,
    hierarchy: &'a HierarchyCache<'a>,
}

impl<'a> VisibilityAnalyzer<'a> {
    #[must_use]
    pub fn new(program: &'a dyn Program, layout: &'a Layout<'a>, hierarchy: &'a HierarchyCache<'a>) -> Self {
        Self {
            program,
            layout,
            hierarchy,
        }
    }

    pub fn threshold(&self, scope: &ReferencingScope, target: SymbolId) -> Result<Visibility, Cancelled> {
        let required = match scope {
            ReferencingScope::Package(package) => self.package_threshold(package, target),
            ReferencingScope::Unit(unit) => {
                let package = self.program.unit(*unit).map_or("", |u| u.package.as_str());
                self.package_threshold(package, target)
            }
            ReferencingScope::Type(ty) => self.type_threshold(*ty, target)?,
            ReferencingScope::Member(member) => match self.layout.owner(*member) {
                Some(ty) => self.type_threshold(ty, target)?,
                None => Visibility::Public,
            },
        };
        trace!(target = target.0, ?scope, %required, "visibility threshold");
        Ok(required)
    }

    fn package_threshold(&self, package: &str, target: SymbolId) -> Visibility {
        if self.layout.package(target) == package {
            Visibility::PackageDefault
        } else {
            Visibility::Public
        }
    }

    fn type_threshold(&self, scope_type: SymbolId, target: SymbolId) -> Result<Visibility, Cancelled> {
        let layout = self.layout;
        let Some(declaring) = layout.owner(target) else {
            let package = layout.package(scope_type).to_string();
            return Ok(self.package_threshold(&package, target));
        };
        if layout.top_level_of(scope_type) == layout.top_level_of(declaring) {
            return Ok(Visibility::Private);
        }
        // Protected access also reaches code nested in a subclass.
        let mut scope_types = vec![scope_type];
        scope_types.extend(layout.enclosing_chain(scope_type));
        for ty in scope_types {
            if self.hierarchy.has_supertype(ty, declaring)? {
                return Ok(Visibility::Protected);
            }
        }
        if layout.same_unit(scope_type, declaring) || layout.package(scope_type) == layout.package(declaring) {
            return Ok(Visibility::PackageDefault);
        }
        Ok(Visibility::Public)
    }
}

impl std::fmt::Debug for VisibilityAnalyzer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityAnalyzer")
            .field("layout", self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/analyzer_tests.rs"]
mod analyzer_tests;
