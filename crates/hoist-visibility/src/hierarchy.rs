//! Per-invocation type hierarchy cache.
//!
//! Hierarchy computation is one of the two suspending collaborator calls.
//! A single analysis asks for the same hierarchies over and over (once per
//! reference edge), so results are memoised for the lifetime of one cache.
//! A cache must not outlive the invocation that created it: the next
//! refactoring may run against a changed program.

use hoist_common::{CancellationToken, Cancelled};
use hoist_model::{HierarchyProvider, SymbolId, TypeHierarchy};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

pub struct HierarchyCache<'a> {
    provider: &'a dyn HierarchyProvider,
    cancel: &'a CancellationToken,
    entries: RefCell<FxHashMap<SymbolId, Rc<TypeHierarchy>>>,
    computed: Cell<usize>,
}

impl<'a> HierarchyCache<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn HierarchyProvider, cancel: &'a CancellationToken) -> Self {
        Self {
            provider,
            cancel,
            entries: RefCell::new(FxHashMap::default()),
            computed: Cell::new(0),
        }
    }

    pub fn hierarchy(&self, ty: SymbolId) -> Result<Rc<TypeHierarchy>, Cancelled> {
        if let Some(found) = self.entries.borrow().get(&ty) {
            return Ok(Rc::clone(found));
        }
        let hierarchy = Rc::new(self.provider.type_hierarchy(ty, self.cancel)?);
        self.computed.set(self.computed.get() + 1);
        trace!(ty = ty.0, "computed type hierarchy");
        self.entries.borrow_mut().insert(ty, Rc::clone(&hierarchy));
        Ok(hierarchy)
    }

    /// Whether `ancestor` is a proper supertype of `ty`.
    pub fn has_supertype(&self, ty: SymbolId, ancestor: SymbolId) -> Result<bool, Cancelled> {
        Ok(self.hierarchy(ty)?.supertypes.contains(&ancestor))
    }

    /// Number of hierarchies fetched from the provider so far.
    #[must_use]
    pub fn computed(&self) -> usize {
        self.computed.get()
    }
}

impl std::fmt::Debug for HierarchyCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyCache")
            .field("entries", &self.entries.borrow().len())
            .field("computed", &self.computed.get())
            .finish()
    }
}
