//! Options and results of a relocation.

use crate::emit::UnitRewrites;
use hoist_common::{Change, RefactoringConfig, RefactoringStatus, UnitId};
use hoist_model::{NodeIndex, SymbolId, Visibility};
use hoist_visibility::{AccessorSubstitution, AdjustmentMap, ReferenceEdge};
use serde::Serialize;
use std::path::PathBuf;

/// Caller choices for one move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveOptions {
    /// Give the moved type a field holding its former enclosing instance.
    /// Ignored when the moved code needs that instance anyway.
    pub create_enclosing_field: bool,
    pub mark_field_final: bool,
    /// Explicit field name; derived from the enclosing type when `None`.
    pub enclosing_field_name: Option<String>,
    /// Package of the new unit; the enclosing type's package when `None`.
    pub destination_package: Option<String>,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            create_enclosing_field: true,
            mark_field_final: true,
            enclosing_field_name: None,
            destination_package: None,
        }
    }
}

impl MoveOptions {
    /// Defaults, with `final` taken from the configuration.
    #[must_use]
    pub fn from_config(config: &RefactoringConfig) -> Self {
        Self {
            mark_field_final: config.mark_field_final,
            ..Self::default()
        }
    }
}

/// Whether the moved type keeps a reference to its enclosing instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnclosingLink {
    /// The type is static; there is no enclosing instance.
    #[default]
    Unavailable,
    /// The type is inner but never touches the enclosing instance.
    Optional,
    /// The type uses the enclosing instance; the field must be created.
    Mandatory,
}

/// The field that carries the enclosing instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SynthesizedField {
    pub name: String,
    /// Declared type, as written in the new unit.
    pub type_text: String,
    pub is_final: bool,
}

/// A type parameter of an enclosing type that the moved type now declares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InheritedParam {
    pub name: String,
    /// Declaration text including bounds: `T extends Comparable<T>`.
    pub declaration: String,
}

/// Everything decided about a move before any text is produced.
#[derive(Clone, Debug, Serialize)]
pub struct RelocationPlan {
    pub moved_type: SymbolId,
    pub enclosing_type: SymbolId,
    pub type_name: String,
    pub destination_package: String,
    pub new_unit_path: PathBuf,
    pub link: EnclosingLink,
    pub enclosing_field: Option<SynthesizedField>,
    pub constructor_parameter_name: String,
    pub inherited_params: Vec<InheritedParam>,
    /// Visibility the declaration gets as a top-level type.
    pub top_level_visibility: Visibility,
    /// References from the moved code to declarations outside it.
    pub escaping_references: Vec<ReferenceEdge>,
    pub adjustments: AdjustmentMap,
    pub substitutions: Vec<AccessorSubstitution>,
    pub status: RefactoringStatus,
    #[serde(skip)]
    pub(crate) unit: UnitId,
    #[serde(skip)]
    pub(crate) decl_node: NodeIndex,
    #[serde(skip)]
    pub(crate) synthesize_constructor: bool,
    #[serde(skip)]
    pub(crate) rewrites: UnitRewrites,
    #[serde(skip)]
    pub(crate) new_unit_imports: Vec<String>,
}

impl RelocationPlan {
    #[must_use]
    pub fn is_field_mandatory(&self) -> bool {
        self.link == EnclosingLink::Mandatory
    }

    /// Number of units the move will edit, not counting the new one.
    #[must_use]
    pub fn edited_units(&self) -> usize {
        let mut units = self.rewrites.units();
        if !units.contains(&self.unit) {
            units.push(self.unit);
        }
        units.len()
    }
}

/// A committed move: the change set and the merged status.
#[derive(Clone, Debug, Serialize)]
pub struct RelocationOutcome {
    pub changes: Vec<Change>,
    pub status: RefactoringStatus,
}
