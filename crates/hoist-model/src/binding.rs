//! Results of name resolution.

use crate::symbols::SymbolId;
use serde::Serialize;

/// What a name, type reference or invocation node resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Binding {
    /// A declaration reached through a qualifier, an import or the
    /// package.
    Symbol(SymbolId),
    /// A member found by unqualified lookup in the lexically enclosing
    /// type `holder` (or one of its supertypes).
    Member { symbol: SymbolId, holder: SymbolId },
    /// Several overloads match and the front end cannot choose.
    Ambiguous(Vec<SymbolId>),
    /// A local variable or parameter.
    Variable,
    TypeParameter,
    Package(String),
}

impl Binding {
    /// The single symbol this binding denotes, if any.
    #[must_use]
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            Binding::Symbol(id) | Binding::Member { symbol: id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Every symbol the binding could denote.
    #[must_use]
    pub fn candidates(&self) -> Vec<SymbolId> {
        match self {
            Binding::Symbol(id) | Binding::Member { symbol: id, .. } => vec![*id],
            Binding::Ambiguous(ids) => ids.clone(),
            _ => Vec::new(),
        }
    }

    /// The lexically enclosing type an unqualified member came from.
    #[must_use]
    pub const fn holder(&self) -> Option<SymbolId> {
        match self {
            Binding::Member { holder, .. } => Some(*holder),
            _ => None,
        }
    }

    #[must_use]
    pub fn refers_to(&self, id: SymbolId) -> bool {
        match self {
            Binding::Symbol(s) | Binding::Member { symbol: s, .. } => *s == id,
            Binding::Ambiguous(ids) => ids.contains(&id),
            _ => false,
        }
    }
}
