//! Entry points of the relocation engine.

use crate::context::RelocationContext;
use crate::emit::Emitter;
use crate::plan::{MoveOptions, RelocationOutcome, RelocationPlan};
use hoist_common::messages::diagnostic_messages;
use hoist_common::{CancellationToken, RefactoringConfig, RefactoringStatus};
use hoist_model::{SymbolId, Workspace};
use hoist_visibility::{Directions, VisibilityReport, adjust_visibility, display_name};
use tracing::{debug, info, instrument};

/// Plans and commits moves of member types to top level, and standalone
/// visibility adjustments, against one workspace snapshot.
pub struct Relocator<'a> {
    workspace: &'a dyn Workspace,
    config: &'a RefactoringConfig,
    cancel: &'a CancellationToken,
}

impl std::fmt::Debug for Relocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relocator")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<'a> Relocator<'a> {
    #[must_use]
    pub fn new(
        workspace: &'a dyn Workspace,
        config: &'a RefactoringConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            workspace,
            config,
            cancel,
        }
    }

    /// Analyse a move of `ty` to top level without producing text.
    ///
    /// `Err` carries a status with at least one fatal entry; the move
    /// cannot go ahead. An `Ok` plan may still carry warnings and errors
    /// the caller should show before committing.
    #[instrument(level = "debug", skip(self, options))]
    pub fn plan_move(&self, ty: SymbolId, options: &MoveOptions) -> Result<RelocationPlan, RefactoringStatus> {
        let context = RelocationContext::new(self.workspace, self.config, self.cancel, ty, options.clone())
            .map_err(|abort| abort.into_status(RefactoringStatus::new()))?;
        let mut status = RefactoringStatus::new();
        let planned = context
            .analyze()
            .and_then(|c| {
                status = c.status.clone();
                c.plan()
            })
            .and_then(|c| {
                status = c.status.clone();
                c.qualify()
            })
            .and_then(|c| {
                status = c.status.clone();
                c.widen()
            });
        match planned {
            Ok(context) => {
                let plan = context.into_plan();
                info!(
                    moved = %plan.type_name,
                    destination = %plan.destination_package,
                    link = ?plan.link,
                    units = plan.edited_units(),
                    "move planned"
                );
                Ok(plan)
            }
            Err(abort) => Err(abort.into_status(status)),
        }
    }

    /// Turn `plan` into a change set.
    ///
    /// Refuses plans with fatal entries, plans from before a cancellation
    /// and plans whose moved type no longer matches the workspace.
    #[instrument(level = "debug", skip(self, plan), fields(moved = %plan.type_name))]
    pub fn commit(&self, plan: &RelocationPlan) -> Result<RelocationOutcome, RefactoringStatus> {
        if plan.status.has_fatal() {
            return Err(plan.status.clone());
        }
        if self.cancel.is_cancelled() {
            let mut status = plan.status.clone();
            status.add_message(&diagnostic_messages::CANCELLED, &[], None);
            return Err(status);
        }
        let symbols = self.workspace.symbols();
        let current = symbols.get(plan.moved_type).filter(|s| {
            s.is_type()
                && s.name == plan.type_name
                && s.decl.is_some_and(|d| d.unit == plan.unit && d.node == plan.decl_node)
        });
        if current.is_none() {
            let mut status = plan.status.clone();
            status.add_message(&diagnostic_messages::STALE_PLAN, &[&plan.type_name], None);
            return Err(status);
        }

        let changes = Emitter::new(self.workspace, self.config, plan)
            .changes()
            .map_err(|fatal| {
                let mut status = plan.status.clone();
                status.merge(fatal);
                status
            })?;
        debug!(
            changes = changes.len(),
            moved = %display_name(symbols, plan.moved_type),
            "move committed"
        );
        Ok(RelocationOutcome {
            changes,
            status: plan.status.clone(),
        })
    }

    /// Plan and commit in one step.
    pub fn move_to_top_level(&self, ty: SymbolId, options: &MoveOptions) -> Result<RelocationOutcome, RefactoringStatus> {
        let plan = self.plan_move(ty, options)?;
        self.commit(&plan)
    }

    /// Widen `symbol` for its references, what it references, or both.
    pub fn adjust_visibility(&self, symbol: SymbolId, directions: Directions) -> Result<VisibilityReport, RefactoringStatus> {
        adjust_visibility(self.workspace, self.config, self.cancel, symbol, directions).map_err(|_| {
            RefactoringStatus::from_message(&diagnostic_messages::CANCELLED, &[], None)
        })
    }
}

#[cfg(test)]
#[path = "../tests/relocator_tests.rs"]
mod relocator_tests;
