//! Interned entity names.
//!
//! Every library, cell, and cell-view name in the database is interned once
//! and referred to by a compact [`Ident`] afterwards. Name comparison during
//! path resolution is then an integer compare, and sibling-name indexes key
//! on `Ident` instead of owned strings.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned entity name.
///
/// `Ident` is a `u32` index into the [`Interner`] that produced it. Two
/// idents compare equal iff they were interned from the same string by the
/// same interner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an ident from a raw index. Intended for deserialization and
    /// tests; normal code obtains idents from [`Interner::intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this ident.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` is a plain `u32`, which always fits in `usize` on the
// platforms we target. `try_from_usize` rejects indexes wider than `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// String interner for entity names, backed by [`lasso::ThreadedRodeo`].
///
/// Owned by the database; a single interner covers every name in the
/// library tree for the lifetime of the database.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a name, returning its [`Ident`]. Re-interning an existing
    /// name returns the same ident without allocating.
    pub fn intern(&self, name: &str) -> Ident {
        self.rodeo.get_or_intern(name)
    }

    /// Looks up the ident of a name without interning it.
    pub fn get(&self, name: &str) -> Option<Ident> {
        self.rodeo.get(name)
    }

    /// Resolves an ident back to its name.
    ///
    /// # Panics
    ///
    /// Panics if the ident did not come from this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
