//! Move a member type to top level.
//!
//! A move runs in stages over one shared relocation context:
//! - `collector` - sites in the moved code that depend on enclosing types
//! - `link` - the enclosing-instance field, constructor threading and
//!   creation sites
//! - `qualify` - qualification of enclosing accesses, references to the
//!   moved type and imports
//! - `widen` - visibility adjustments under the post-move layout
//! - `emit` - the final change set
//!
//! [`Relocator`] is the entry point: `plan_move` analyses, `commit` emits.

pub mod collector;
mod context;
pub(crate) mod emit;
mod link;
pub mod naming;
pub mod plan;
mod qualify;
pub mod relocator;
mod widen;

pub use collector::{AccessKind, EnclosingAccess, EnclosingAccessCollector};
pub use context::Stage;
pub use plan::{
    EnclosingLink, InheritedParam, MoveOptions, RelocationOutcome, RelocationPlan,
    SynthesizedField,
};
pub use relocator::Relocator;
