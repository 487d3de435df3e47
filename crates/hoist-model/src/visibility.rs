//! Visibility keywords and declaration modifier flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Declared access level, ordered from most to least restrictive.
///
/// Widening is `max`: a merged requirement is never more restrictive than
/// any of its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Private,
    PackageDefault,
    Protected,
    Public,
}

impl Visibility {
    /// Source keyword, `None` for package-default access.
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Private => Some("private"),
            Visibility::PackageDefault => None,
            Visibility::Protected => Some("protected"),
            Visibility::Public => Some("public"),
        }
    }

    /// Human-readable name used in status messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::PackageDefault => "package",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }

    #[must_use]
    pub fn widen(self, other: Visibility) -> Visibility {
        self.max(other)
    }

    #[must_use]
    pub fn is_at_least(self, required: Visibility) -> bool {
        self >= required
    }

    /// Visibility written by `flags`; members of interfaces are handled
    /// by the symbol table, not here.
    #[must_use]
    pub const fn from_flags(flags: ModifierFlags) -> Visibility {
        if flags.contains(ModifierFlags::PUBLIC) {
            Visibility::Public
        } else if flags.contains(ModifierFlags::PROTECTED) {
            Visibility::Protected
        } else if flags.contains(ModifierFlags::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::PackageDefault
        }
    }

    /// The flag carrying this keyword, empty for package-default.
    #[must_use]
    pub const fn flag(self) -> ModifierFlags {
        match self {
            Visibility::Private => ModifierFlags::PRIVATE,
            Visibility::PackageDefault => ModifierFlags::empty(),
            Visibility::Protected => ModifierFlags::PROTECTED,
            Visibility::Public => ModifierFlags::PUBLIC,
        }
    }

    /// Access levels a top-level type can have.
    #[must_use]
    pub const fn for_top_level(self) -> Visibility {
        match self {
            Visibility::Private | Visibility::PackageDefault => Visibility::PackageDefault,
            Visibility::Protected | Visibility::Public => Visibility::Public,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

bitflags! {
    /// Modifier keywords present on a declaration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModifierFlags: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;

        const VISIBILITY = Self::PUBLIC.bits() | Self::PROTECTED.bits() | Self::PRIVATE.bits();
    }
}

impl ModifierFlags {
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<ModifierFlags> {
        Some(match keyword {
            "public" => ModifierFlags::PUBLIC,
            "protected" => ModifierFlags::PROTECTED,
            "private" => ModifierFlags::PRIVATE,
            "static" => ModifierFlags::STATIC,
            "final" => ModifierFlags::FINAL,
            "abstract" => ModifierFlags::ABSTRACT,
            "native" => ModifierFlags::NATIVE,
            "synchronized" => ModifierFlags::SYNCHRONIZED,
            "transient" => ModifierFlags::TRANSIENT,
            "volatile" => ModifierFlags::VOLATILE,
            "strictfp" => ModifierFlags::STRICTFP,
            "default" => ModifierFlags::DEFAULT,
            _ => return None,
        })
    }
}

#[cfg(test)]
#[path = "../tests/visibility_tests.rs"]
mod visibility_tests;
