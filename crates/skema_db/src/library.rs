//! Library nodes of the namespace tree.

use crate::ids::{CellId, LibraryId};
use serde::{Deserialize, Serialize};
use skema_common::Ident;
use std::collections::HashMap;

/// A named node in the library tree.
///
/// A library owns a set of child libraries and a set of cells, each with a
/// name index for O(1) sibling lookup. Names are unique within a sibling
/// scope; the indexes silently overwrite on duplicate insertion, so
/// uniqueness is the caller's responsibility.
///
/// Libraries are created and wired up through
/// [`Database::add_library`](crate::database::Database::add_library); the
/// struct itself is a passive record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub(crate) name: Ident,
    pub(crate) parent: Option<LibraryId>,
    pub(crate) libraries: Vec<LibraryId>,
    pub(crate) library_names: HashMap<Ident, LibraryId>,
    pub(crate) cells: Vec<CellId>,
    pub(crate) cell_names: HashMap<Ident, CellId>,
}

impl Library {
    pub(crate) fn new(name: Ident, parent: Option<LibraryId>) -> Self {
        Self {
            name,
            parent,
            libraries: Vec::new(),
            library_names: HashMap::new(),
            cells: Vec::new(),
            cell_names: HashMap::new(),
        }
    }

    /// The library's name.
    pub fn name(&self) -> Ident {
        self.name
    }

    /// The parent library, or `None` for a top-level library.
    pub fn parent_library(&self) -> Option<LibraryId> {
        self.parent
    }

    /// Child libraries in insertion order.
    pub fn libraries(&self) -> &[LibraryId] {
        &self.libraries
    }

    /// Cells in insertion order.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Looks up a child library by name.
    pub fn library_by_name(&self, name: Ident) -> Option<LibraryId> {
        self.library_names.get(&name).copied()
    }

    /// Looks up a cell by name.
    pub fn cell_by_name(&self, name: Ident) -> Option<CellId> {
        self.cell_names.get(&name).copied()
    }

    pub(crate) fn insert_library(&mut self, name: Ident, id: LibraryId) {
        self.libraries.push(id);
        self.library_names.insert(name, id);
    }

    pub(crate) fn detach_library(&mut self, name: Ident, id: LibraryId) {
        self.libraries.retain(|&l| l != id);
        self.library_names.remove(&name);
    }

    pub(crate) fn insert_cell(&mut self, name: Ident, id: CellId) {
        self.cells.push(id);
        self.cell_names.insert(name, id);
    }

    pub(crate) fn detach_cell(&mut self, name: Ident, id: CellId) {
        self.cells.retain(|&c| c != id);
        self.cell_names.remove(&name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_child_library() {
        let name = Ident::from_raw(0);
        let child = Ident::from_raw(1);
        let mut lib = Library::new(name, None);
        lib.insert_library(child, LibraryId::from_raw(1));
        assert_eq!(lib.library_by_name(child), Some(LibraryId::from_raw(1)));
        assert_eq!(lib.libraries().len(), 1);
    }

    #[test]
    fn detach_restores_index() {
        let name = Ident::from_raw(0);
        let cell = Ident::from_raw(1);
        let mut lib = Library::new(name, None);
        lib.insert_cell(cell, CellId::from_raw(0));
        lib.detach_cell(cell, CellId::from_raw(0));
        assert!(lib.cell_by_name(cell).is_none());
        assert!(lib.cells().is_empty());
    }

    #[test]
    fn duplicate_insert_overwrites_index() {
        let name = Ident::from_raw(0);
        let dup = Ident::from_raw(1);
        let mut lib = Library::new(name, None);
        lib.insert_library(dup, LibraryId::from_raw(1));
        lib.insert_library(dup, LibraryId::from_raw(2));
        assert_eq!(lib.library_by_name(dup), Some(LibraryId::from_raw(2)));
    }
}
