//! Instances and target resolution.
//!
//! An [`Instance`] is a placement of one cell-view inside another, targeted
//! by a `(library path, cell name, view name)` string triple. The library
//! path is relative to the instance's owning library; an empty path means
//! "same library as the instance".
//!
//! Resolution is memoized in three independent slots (library, cell, view).
//! A slot is only written on a successful resolution, and is *not* cleared
//! when the underlying namespace changes; callers that edit a target after
//! first resolution must call
//! [`Database::invalidate_instance_cache`](crate::database::Database::invalidate_instance_cache).
//!
//! When the target does not resolve, each accessor independently degrades to
//! the default placeholder symbol instead of failing, so a broken reference
//! still displays as *something*.

use crate::database::Database;
use crate::ids::{CellId, CellViewId, InstanceId, LibraryId};
use crate::path::concat_paths;
use serde::{Deserialize, Serialize};

/// Library path of the default placeholder symbol.
pub const FALLBACK_LIBRARY_PATH: &str = "/sym/analog";

/// Cell name of the default placeholder symbol.
pub const FALLBACK_CELL_NAME: &str = "voltage-1";

/// View name of the default placeholder symbol.
pub const FALLBACK_VIEW_NAME: &str = "symbol";

/// A placed reference to another cell-view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub(crate) cell_view: CellViewId,
    pub(crate) library_path: String,
    pub(crate) cell_name: String,
    pub(crate) view_name: String,
    pub(crate) cached_library: Option<LibraryId>,
    pub(crate) cached_cell: Option<CellId>,
    pub(crate) cached_cell_view: Option<CellViewId>,
}

impl Instance {
    pub(crate) fn new(cell_view: CellViewId) -> Self {
        Self {
            cell_view,
            library_path: String::new(),
            cell_name: String::new(),
            view_name: String::new(),
            cached_library: None,
            cached_cell: None,
            cached_cell_view: None,
        }
    }

    /// The cell-view this instance is placed in.
    pub fn cell_view(&self) -> CellViewId {
        self.cell_view
    }

    /// The target's library path, relative to the owning library.
    pub fn library_path(&self) -> &str {
        &self.library_path
    }

    /// The target's cell name.
    pub fn cell_name(&self) -> &str {
        &self.cell_name
    }

    /// The target's view name.
    pub fn view_name(&self) -> &str {
        &self.view_name
    }
}

impl Database {
    /// Retargets an instance.
    ///
    /// The memo slots are deliberately left untouched; an already-resolved
    /// instance keeps answering with its old target until
    /// [`invalidate_instance_cache`](Self::invalidate_instance_cache) is
    /// called.
    pub fn set_instance_target(
        &mut self,
        instance: InstanceId,
        library_path: &str,
        cell_name: &str,
        view_name: &str,
    ) {
        let inst = self.instances.get_mut(instance);
        inst.library_path = library_path.to_string();
        inst.cell_name = cell_name.to_string();
        inst.view_name = view_name.to_string();
    }

    /// Clears all three memo slots so the next access re-resolves.
    pub fn invalidate_instance_cache(&mut self, instance: InstanceId) {
        let inst = self.instances.get_mut(instance);
        inst.cached_library = None;
        inst.cached_cell = None;
        inst.cached_cell_view = None;
    }

    /// The library the instance is placed in (the owner of its diagram).
    pub fn instance_owner_library(&self, instance: InstanceId) -> LibraryId {
        let view = self.instances[instance].cell_view;
        let cell = self.cell_views[view].cell;
        self.cells[cell].library
    }

    /// The target's absolute library path: the owning library's path with
    /// the instance's relative path concatenated onto it.
    pub fn instance_absolute_path(&self, instance: InstanceId) -> String {
        let base = self.library_path(self.instance_owner_library(instance));
        concat_paths(&base, &self.instances[instance].library_path)
    }

    /// Resolves the instance's requested target, without fallback and
    /// without touching the memo slots.
    ///
    /// An empty library path resolves the cell within the instance's own
    /// library; anything else resolves the absolute path from the database
    /// root.
    pub fn requested_instance_cell_view(&self, instance: InstanceId) -> Option<CellViewId> {
        let inst = &self.instances[instance];
        if inst.library_path.is_empty() {
            let lib = self.instance_owner_library(instance);
            self.library_cell_view_by_name(lib, &inst.cell_name, &inst.view_name)
        } else {
            let path = self.instance_absolute_path(instance);
            self.cell_view_by_path(&path, &inst.cell_name, &inst.view_name)
        }
    }

    /// The resolved target library, falling back to the placeholder
    /// symbol's library when the target does not resolve. Memoized.
    pub fn instance_library(&mut self, instance: InstanceId) -> Option<LibraryId> {
        if let Some(lib) = self.instances[instance].cached_library {
            return Some(lib);
        }
        let resolved = match self.requested_instance_cell_view(instance) {
            Some(cv) => Some(self.cells[self.cell_views[cv].cell].library),
            None => self.library_by_path(FALLBACK_LIBRARY_PATH),
        };
        if let Some(lib) = resolved {
            self.instances.get_mut(instance).cached_library = Some(lib);
        }
        resolved
    }

    /// The resolved target cell, falling back to the placeholder cell when
    /// the target does not resolve. Memoized.
    pub fn instance_cell(&mut self, instance: InstanceId) -> Option<CellId> {
        if let Some(cell) = self.instances[instance].cached_cell {
            return Some(cell);
        }
        let resolved = match self.requested_instance_cell_view(instance) {
            Some(cv) => Some(self.cell_views[cv].cell),
            None => self.cell_by_path(FALLBACK_LIBRARY_PATH, FALLBACK_CELL_NAME),
        };
        if let Some(cell) = resolved {
            self.instances.get_mut(instance).cached_cell = Some(cell);
        }
        resolved
    }

    /// The resolved target cell-view, falling back to the placeholder
    /// symbol when the target does not resolve. Memoized.
    pub fn instance_cell_view(&mut self, instance: InstanceId) -> Option<CellViewId> {
        if let Some(cv) = self.instances[instance].cached_cell_view {
            return Some(cv);
        }
        let resolved = match self.requested_instance_cell_view(instance) {
            Some(cv) => Some(cv),
            None => {
                self.cell_view_by_path(FALLBACK_LIBRARY_PATH, FALLBACK_CELL_NAME, FALLBACK_VIEW_NAME)
            }
        };
        if let Some(cv) = resolved {
            self.instances.get_mut(instance).cached_cell_view = Some(cv);
        }
        resolved
    }
}
