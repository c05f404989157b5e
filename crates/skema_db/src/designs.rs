//! The registry of open designs.
//!
//! One [`Designs`] lives inside each database; it owns the design-unit
//! arena, tracks which units are open roots, and notifies hierarchy-view
//! observers (tree browsers) when membership changes. Membership is a set;
//! no ordering is guaranteed to observers.

use crate::arena::Arena;
use crate::database::Database;
use crate::design_unit::DesignUnit;
use crate::ids::{CellViewId, DesignUnitId};
use crate::observer::HierarchyObserver;

/// The set of open designs and their hierarchy observers.
pub struct Designs {
    pub(crate) units: Arena<DesignUnitId, DesignUnit>,
    roots: Vec<DesignUnitId>,
    observers: Vec<Box<dyn HierarchyObserver>>,
}

impl Designs {
    pub(crate) fn new() -> Self {
        Self {
            units: Arena::new(),
            roots: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Currently open design roots.
    pub fn roots(&self) -> &[DesignUnitId] {
        &self.roots
    }

    /// Whether a unit is an open design root.
    pub fn is_open(&self, design: DesignUnitId) -> bool {
        self.roots.contains(&design)
    }

    pub(crate) fn attach_root(&mut self, design: DesignUnitId) {
        self.roots.push(design);
    }

    pub(crate) fn detach_root(&mut self, design: DesignUnitId) {
        self.roots.retain(|&r| r != design);
    }

    pub(crate) fn install_hook(&mut self, observer: Box<dyn HierarchyObserver>) {
        self.observers.push(observer);
    }

    /// Notifies observers on the preparation channel.
    pub(crate) fn update_hierarchy_views_preparation(&mut self) {
        for observer in &mut self.observers {
            observer.prepare_for_update();
        }
    }

    /// Notifies observers that the set of open designs changed.
    pub(crate) fn update_hierarchy_views(&mut self) {
        for observer in &mut self.observers {
            observer.update();
        }
    }
}

impl Database {
    /// The open-designs registry.
    pub fn designs(&self) -> &Designs {
        &self.designs
    }

    /// Registers a hierarchy-view observer, notified when the set of open
    /// designs changes.
    pub fn install_update_hierarchy_views_hook(&mut self, observer: Box<dyn HierarchyObserver>) {
        self.designs.install_hook(observer);
    }

    /// Notifies hierarchy observers on the preparation channel, before a
    /// multi-step change to the set of open designs. Never called
    /// implicitly by mutations.
    pub fn update_hierarchy_views_preparation(&mut self) {
        self.designs.update_hierarchy_views_preparation();
    }

    /// Opens a design rooted at `cell_view` and returns its root unit.
    ///
    /// The root has no owning instance and is its own design; hierarchy
    /// observers are notified of the membership change.
    pub fn open_design(&mut self, cell_view: CellViewId) -> DesignUnitId {
        let id = self.designs.units.alloc(DesignUnit::new_root(cell_view));
        self.designs.units.get_mut(id).design = id;
        self.designs.attach_root(id);
        self.designs.update_hierarchy_views();
        id
    }

    /// Closes an open design: removes its whole unit tree, deregisters it,
    /// and notifies hierarchy observers.
    pub fn close_design(&mut self, design: DesignUnitId) {
        self.remove_design_unit(design);
    }
}
