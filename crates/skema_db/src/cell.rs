//! Cells — the unit of reuse within a library.

use crate::ids::{CellViewId, LibraryId};
use serde::{Deserialize, Serialize};
use skema_common::Ident;
use std::collections::HashMap;

/// A named cell owning one or more views of the same circuit.
///
/// The owning library is fixed at construction. View names are unique per
/// cell; the index silently overwrites on duplicate insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) name: Ident,
    pub(crate) library: LibraryId,
    pub(crate) cell_views: Vec<CellViewId>,
    pub(crate) cell_view_names: HashMap<Ident, CellViewId>,
}

impl Cell {
    pub(crate) fn new(name: Ident, library: LibraryId) -> Self {
        Self {
            name,
            library,
            cell_views: Vec::new(),
            cell_view_names: HashMap::new(),
        }
    }

    /// The cell's name.
    pub fn name(&self) -> Ident {
        self.name
    }

    /// The owning library.
    pub fn library(&self) -> LibraryId {
        self.library
    }

    /// Views in insertion order.
    pub fn cell_views(&self) -> &[CellViewId] {
        &self.cell_views
    }

    /// Looks up a view by name.
    pub fn cell_view_by_name(&self, name: Ident) -> Option<CellViewId> {
        self.cell_view_names.get(&name).copied()
    }

    pub(crate) fn insert_cell_view(&mut self, name: Ident, id: CellViewId) {
        self.cell_views.push(id);
        self.cell_view_names.insert(name, id);
    }

    pub(crate) fn detach_cell_view(&mut self, name: Ident, id: CellViewId) {
        self.cell_views.retain(|&v| v != id);
        self.cell_view_names.remove(&name);
    }
}
