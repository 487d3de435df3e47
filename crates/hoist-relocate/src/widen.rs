//! Visibility widening for a move.
//!
//! Thresholds are evaluated against the layout after the move: the moved
//! type sits at top level in the destination package, everything else
//! stays put. References into the moved type, references out of it and
//! the qualifiers the move introduced all feed one adjustor.

use crate::context::{Abort, RelocationContext, Stage};
use hoist_model::{SearchScope, Visibility};
use hoist_visibility::{
    EdgeTarget, Layout, MemberVisibilityAdjustor, ReferenceLocator, ReferencingScope,
    declaration_edits, substitution_edits,
};
use tracing::debug;

impl RelocationContext<'_> {
    pub(crate) fn widen(mut self) -> Result<Self, Abort> {
        self.enter(Stage::Widen)?;
        let workspace = self.workspace;
        let symbols = self.symbols();
        let moved = self.moved;

        let layout = Layout::after_move(symbols, moved, self.destination.clone());
        let mut adjustor = MemberVisibilityAdjustor::with_layout(workspace, self.config, self.cancel, layout);
        adjustor.adjust_incoming(moved, &SearchScope::Workspace)?;
        let nested: Vec<_> = symbols
            .iter()
            .filter(|s| s.id != moved && !s.is_local && symbols.is_within(s.id, moved))
            .map(|s| s.id)
            .collect();
        for member in nested {
            adjustor.adjust_incoming(member, &SearchScope::Workspace)?;
        }
        adjustor.adjust_outgoing(moved, None)?;
        let scope = ReferencingScope::Type(moved);
        for (holder, location) in self.introduced_qualifiers.clone() {
            adjustor.require(&scope, holder, location)?;
        }
        let mut report = adjustor.finish();

        self.escaping = ReferenceLocator::new(workspace, self.cancel)
            .outgoing(moved)?
            .into_iter()
            .filter(|edge| match &edge.target {
                EdgeTarget::Resolved(target) => !symbols[*target].is_binary(),
                _ => true,
            })
            .collect();

        let own = report.adjustments.remove(moved);
        let required = own.as_ref().map_or(Visibility::Private, |a| a.required);
        self.top_level_visibility = if symbols.is_interface_member(moved) {
            Visibility::Public
        } else {
            symbols
                .visibility(moved)
                .widen(required)
                .for_top_level()
        };

        for (unit, edits) in declaration_edits(workspace, &report.adjustments, self.config) {
            self.rewrites.extend(unit, edits);
        }
        for (unit, edits) in substitution_edits(workspace, &report.substitutions) {
            self.rewrites.extend(unit, edits);
        }
        if let Some(own) = own {
            report.adjustments.merge(own);
        }

        debug!(
            adjustments = report.adjustments.len(),
            substitutions = report.substitutions.len(),
            escaping = self.escaping.len(),
            top_level = %self.top_level_visibility,
            "visibility widened"
        );
        self.adjustments = report.adjustments;
        self.substitutions = report.substitutions;
        self.status.merge(report.status);
        Ok(self)
    }
}
