//! The database: root of the library tree and owner of every entity arena.
//!
//! There is no ambient global state; a [`Database`] is the explicit context
//! object for one design database. It owns the name interner, the arenas
//! for libraries, cells, cell-views and instances, the registry of open
//! designs, and the observer set notified on structural mutations.
//!
//! Every structural mutation completes its container update, index update,
//! and observer pass before returning. Callers must not mutate the database
//! from inside an observer callback; a mutation that panics midway leaves
//! the database inconsistent (there is no rollback).

use crate::arena::Arena;
use crate::cell::Cell;
use crate::cell_view::{CellView, SCHEMATIC_VIEW, SYMBOL_VIEW};
use crate::designs::Designs;
use crate::ids::{CellId, CellViewId, InstanceId, LibraryId};
use crate::instance::Instance;
use crate::layers::Layers;
use crate::library::Library;
use crate::observer::DatabaseObserver;
use crate::path::split_path;
use skema_common::{Ident, InternalError, Interner, SkemaResult};
use std::collections::HashMap;

/// A complete design database.
pub struct Database {
    pub(crate) interner: Interner,
    pub(crate) libraries: Arena<LibraryId, Library>,
    pub(crate) cells: Arena<CellId, Cell>,
    pub(crate) cell_views: Arena<CellViewId, CellView>,
    pub(crate) instances: Arena<InstanceId, Instance>,
    root_libraries: Vec<LibraryId>,
    root_library_names: HashMap<Ident, LibraryId>,
    layers: Layers,
    observers: Vec<Box<dyn DatabaseObserver>>,
    pub(crate) designs: Designs,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            libraries: Arena::new(),
            cells: Arena::new(),
            cell_views: Arena::new(),
            instances: Arena::new(),
            root_libraries: Vec::new(),
            root_library_names: HashMap::new(),
            layers: Layers::new(),
            observers: Vec::new(),
            designs: Designs::new(),
        }
    }

    /// The name interner shared by every entity in this database.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns the library record behind a handle.
    pub fn library(&self, id: LibraryId) -> &Library {
        &self.libraries[id]
    }

    /// Returns the cell record behind a handle.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Returns the cell-view record behind a handle.
    pub fn cell_view(&self, id: CellViewId) -> &CellView {
        &self.cell_views[id]
    }

    /// Returns the instance record behind a handle.
    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id]
    }

    /// Top-level libraries in creation order.
    pub fn libraries(&self) -> &[LibraryId] {
        &self.root_libraries
    }

    /// Names of the top-level libraries.
    pub fn library_names(&self) -> Vec<&str> {
        self.root_libraries
            .iter()
            .map(|&l| self.interner.resolve(self.libraries[l].name))
            .collect()
    }

    /// Names of a library's child libraries.
    pub fn child_library_names(&self, lib: LibraryId) -> Vec<&str> {
        self.libraries[lib]
            .libraries
            .iter()
            .map(|&l| self.interner.resolve(self.libraries[l].name))
            .collect()
    }

    /// Names of a library's cells.
    pub fn cell_names(&self, lib: LibraryId) -> Vec<&str> {
        self.libraries[lib]
            .cells
            .iter()
            .map(|&c| self.interner.resolve(self.cells[c].name))
            .collect()
    }

    /// Names of a cell's views.
    pub fn cell_view_names(&self, cell: CellId) -> Vec<&str> {
        self.cells[cell]
            .cell_views
            .iter()
            .map(|&v| self.interner.resolve(self.cell_views[v].name))
            .collect()
    }

    // --- Observer plumbing ---

    /// Registers a database-view observer. Observers are notified in
    /// registration order.
    pub fn install_update_database_views_hook(&mut self, observer: Box<dyn DatabaseObserver>) {
        self.observers.push(observer);
    }

    /// Notifies observers on the preparation channel, before a multi-step
    /// structural change. Never called implicitly by mutations.
    pub fn update_database_views_preparation(&mut self) {
        for observer in &mut self.observers {
            observer.prepare_for_update();
        }
    }

    /// Notifies observers that the database layout has changed. One pass per
    /// structural mutation, synchronous, no batching.
    pub fn update_database_views(&mut self) {
        for observer in &mut self.observers {
            observer.update();
        }
    }

    // --- Library tree ---

    /// Creates a library under `parent`, or at the top level when `parent`
    /// is `None`.
    ///
    /// Sibling-name uniqueness is the caller's responsibility; a duplicate
    /// name overwrites the sibling index entry.
    pub fn add_library(&mut self, name: &str, parent: Option<LibraryId>) -> LibraryId {
        let name = self.interner.intern(name);
        let id = self.libraries.alloc(Library::new(name, parent));
        match parent {
            Some(p) => self.libraries.get_mut(p).insert_library(name, id),
            None => {
                self.root_libraries.push(id);
                self.root_library_names.insert(name, id);
            }
        }
        self.update_database_views();
        id
    }

    /// Removes a library: all of its cells and child libraries first, then
    /// the library itself is detached from its parent (or the top level).
    pub fn remove_library(&mut self, lib: LibraryId) {
        for cell in self.libraries[lib].cells.clone() {
            self.remove_cell(cell);
        }
        for child in self.libraries[lib].libraries.clone() {
            self.remove_library(child);
        }
        let name = self.libraries[lib].name;
        match self.libraries[lib].parent {
            Some(p) => self.libraries.get_mut(p).detach_library(name, lib),
            None => {
                self.root_libraries.retain(|&l| l != lib);
                self.root_library_names.remove(&name);
            }
        }
        self.update_database_views();
    }

    /// Resolves an absolute path from the database root.
    ///
    /// Empty expressions resolve to nothing; leading `/` and `.` segments
    /// are skipped. Any unresolvable segment yields `None`.
    pub fn library_by_path(&self, path: &str) -> Option<LibraryId> {
        if path.is_empty() {
            return None;
        }
        let (first, rest) = split_path(path);
        if first.is_empty() || first == "." {
            return self.library_by_path(rest);
        }
        let name = self.interner.get(first)?;
        let lib = self.root_library_names.get(&name).copied()?;
        if rest.is_empty() {
            Some(lib)
        } else {
            self.library_by_path_from(lib, rest)
        }
    }

    /// Resolves a path expression relative to a library.
    ///
    /// `..` ascends to the parent and fails at a top-level library; `.`
    /// stays in scope; an empty segment (leading `/`) restarts from the
    /// database root.
    pub fn library_by_path_from(&self, lib: LibraryId, path: &str) -> Option<LibraryId> {
        let (first, rest) = split_path(path);
        match first {
            ".." => {
                let parent = self.libraries[lib].parent?;
                self.library_by_path_from(parent, rest)
            }
            "." => self.library_by_path_from(lib, rest),
            "" => self.library_by_path(rest),
            _ => {
                let name = self.interner.get(first)?;
                let child = self.libraries[lib].library_by_name(name)?;
                if rest.is_empty() {
                    Some(child)
                } else {
                    self.library_by_path_from(child, rest)
                }
            }
        }
    }

    /// The library's absolute path, `/`-separated and rooted at `/`.
    pub fn library_path(&self, lib: LibraryId) -> String {
        let name = self.interner.resolve(self.libraries[lib].name);
        match self.libraries[lib].parent {
            Some(p) => format!("{}/{}", self.library_path(p), name),
            None => format!("/{name}"),
        }
    }

    /// Creates every missing library along `path`, relative to `root` (the
    /// database root when `None`), and returns the final one.
    ///
    /// Idempotent: an already-existing path returns the existing library
    /// without duplicating any index entry. Returns `None` for an empty
    /// path or a leading `..`.
    pub fn make_library_from_path(
        &mut self,
        path: &str,
        root: Option<LibraryId>,
    ) -> Option<LibraryId> {
        let (first, rest) = split_path(path);
        if path.is_empty() || first == ".." {
            return None;
        }
        if first.is_empty() || first == "." {
            // Absolute prefix resets the scope to the database root.
            return self.make_library_from_path(rest, None);
        }
        let existing = match root {
            Some(r) => self.library_by_path_from(r, first),
            None => self.library_by_path(first),
        };
        let lib = match existing {
            Some(l) => l,
            None => self.add_library(first, root),
        };
        if rest.is_empty() {
            Some(lib)
        } else {
            self.make_library_from_path(rest, Some(lib))
        }
    }

    // --- Cells ---

    /// Creates a cell in a library.
    pub fn add_cell(&mut self, lib: LibraryId, name: &str) -> CellId {
        let name = self.interner.intern(name);
        let id = self.cells.alloc(Cell::new(name, lib));
        self.libraries.get_mut(lib).insert_cell(name, id);
        self.update_database_views();
        id
    }

    /// Removes a cell: all of its views first, then the cell is detached
    /// from its library.
    pub fn remove_cell(&mut self, cell: CellId) {
        for view in self.cells[cell].cell_views.clone() {
            self.remove_cell_view(view);
        }
        let name = self.cells[cell].name;
        let lib = self.cells[cell].library;
        self.libraries.get_mut(lib).detach_cell(name, cell);
        self.update_database_views();
    }

    /// Looks up a cell by name within a library.
    pub fn cell_by_name(&self, lib: LibraryId, name: &str) -> Option<CellId> {
        let name = self.interner.get(name)?;
        self.libraries[lib].cell_by_name(name)
    }

    /// Looks up a cell by absolute library path and name.
    pub fn cell_by_path(&self, library_path: &str, cell_name: &str) -> Option<CellId> {
        let lib = self.library_by_path(library_path)?;
        self.cell_by_name(lib, cell_name)
    }

    // --- Cell-views ---

    /// Creates a view on a cell.
    pub fn add_cell_view(&mut self, cell: CellId, name: &str) -> CellViewId {
        let name = self.interner.intern(name);
        let id = self.cell_views.alloc(CellView::new(name, cell));
        self.cells.get_mut(cell).insert_cell_view(name, id);
        self.update_database_views();
        id
    }

    /// Removes a view from its cell, detaching any placed instances.
    ///
    /// Designs rooted at or expanded through this view must be closed by
    /// the caller first.
    pub fn remove_cell_view(&mut self, view: CellViewId) {
        self.cell_views.get_mut(view).instances.clear();
        let name = self.cell_views[view].name;
        let cell = self.cell_views[view].cell;
        self.cells.get_mut(cell).detach_cell_view(name, view);
        self.update_database_views();
    }

    /// Looks up a view by name on a cell.
    pub fn cell_view_by_name(&self, cell: CellId, name: &str) -> Option<CellViewId> {
        let name = self.interner.get(name)?;
        self.cells[cell].cell_view_by_name(name)
    }

    /// Looks up a cell's view by cell and view name within a library.
    pub fn library_cell_view_by_name(
        &self,
        lib: LibraryId,
        cell_name: &str,
        view_name: &str,
    ) -> Option<CellViewId> {
        let cell = self.cell_by_name(lib, cell_name)?;
        self.cell_view_by_name(cell, view_name)
    }

    /// Looks up a view by absolute library path, cell name, and view name.
    pub fn cell_view_by_path(
        &self,
        library_path: &str,
        cell_name: &str,
        view_name: &str,
    ) -> Option<CellViewId> {
        let lib = self.library_by_path(library_path)?;
        self.library_cell_view_by_name(lib, cell_name, view_name)
    }

    /// The cell's implementation view, conventionally named `schematic`.
    pub fn cell_implementation(&self, cell: CellId) -> Option<CellViewId> {
        self.cell_view_by_name(cell, SCHEMATIC_VIEW)
    }

    /// The cell's symbol view, conventionally named `symbol`.
    pub fn cell_symbol(&self, cell: CellId) -> Option<CellViewId> {
        self.cell_view_by_name(cell, SYMBOL_VIEW)
    }

    // --- Instances ---

    /// Places a new, untargeted instance in a cell-view.
    pub fn place_instance(&mut self, view: CellViewId) -> InstanceId {
        let id = self.instances.alloc(Instance::new(view));
        self.cell_views.get_mut(view).instances.push(id);
        self.update_database_views();
        id
    }

    /// Removes an instance from its cell-view.
    pub fn unplace_instance(&mut self, instance: InstanceId) {
        let view = self.instances[instance].cell_view;
        self.cell_views.get_mut(view).detach_instance(instance);
        self.update_database_views();
    }

    // --- Layers ---

    /// Installs the active layer-definition set.
    pub fn set_layers(&mut self, layers: Layers) {
        self.layers = layers;
    }

    /// The active layer-definition set.
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    // --- Consistency audit ---

    /// Audits the cross-references between entities and their name indexes.
    ///
    /// Intended for tests and debugging after a batch of edits. `Err` means
    /// the core itself desynchronized an index, not that the caller misused
    /// the API; name lookups keep returning `Option` for expected misses.
    pub fn verify(&self) -> SkemaResult<()> {
        for (&name, &lib) in &self.root_library_names {
            if !self.root_libraries.contains(&lib) {
                return Err(InternalError::new(format!(
                    "root index entry `{}` points at a non-root library",
                    self.interner.resolve(name)
                )));
            }
        }
        for &lib in &self.root_libraries {
            if self.root_library_names.get(&self.libraries[lib].name) != Some(&lib) {
                return Err(InternalError::new(format!(
                    "top-level library `{}` is missing from the root index",
                    self.interner.resolve(self.libraries[lib].name)
                )));
            }
            self.verify_library(lib, None)?;
        }
        Ok(())
    }

    fn verify_library(&self, lib: LibraryId, parent: Option<LibraryId>) -> SkemaResult<()> {
        let record = &self.libraries[lib];
        if record.parent != parent {
            return Err(InternalError::new(format!(
                "library `{}` disagrees with its parent about ownership",
                self.interner.resolve(record.name)
            )));
        }
        for &child in &record.libraries {
            let child_name = self.libraries[child].name;
            if record.library_by_name(child_name) != Some(child) {
                return Err(InternalError::new(format!(
                    "child library `{}` is missing from the sibling index",
                    self.interner.resolve(child_name)
                )));
            }
            self.verify_library(child, Some(lib))?;
        }
        for &cell in &record.cells {
            self.verify_cell(cell, lib)?;
        }
        Ok(())
    }

    fn verify_cell(&self, cell: CellId, lib: LibraryId) -> SkemaResult<()> {
        let record = &self.cells[cell];
        if record.library != lib {
            return Err(InternalError::new(format!(
                "cell `{}` disagrees with its library about ownership",
                self.interner.resolve(record.name)
            )));
        }
        if self.libraries[lib].cell_by_name(record.name) != Some(cell) {
            return Err(InternalError::new(format!(
                "cell `{}` is missing from its library's name index",
                self.interner.resolve(record.name)
            )));
        }
        for &view in &record.cell_views {
            let view_record = &self.cell_views[view];
            if view_record.cell != cell || record.cell_view_by_name(view_record.name) != Some(view)
            {
                return Err(InternalError::new(format!(
                    "view `{}` is out of sync with cell `{}`",
                    self.interner.resolve(view_record.name),
                    self.interner.resolve(record.name)
                )));
            }
            for &instance in &view_record.instances {
                if self.instances[instance].cell_view != view {
                    return Err(InternalError::new(format!(
                        "view `{}` lists an instance placed elsewhere",
                        self.interner.resolve(view_record.name)
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
