//! Design units — nodes of the lazily materialized design hierarchy.
//!
//! A design unit pairs an instance with its recursively resolved children,
//! mirroring how cell-view instances nest to form the complete circuit. The
//! child map is built on first access, by walking the `schematic` view of
//! the unit's resolved cell, and is cached: once a unit is expanded (or its
//! map becomes non-empty through incremental edits) it is treated as fully
//! populated until [`Database::invalidate_design_unit`] clears it.
//!
//! Nothing prevents a cell from instantiating itself; instead of recursing
//! forever on such a design, expansion past [`MAX_HIERARCHY_DEPTH`] fails
//! with [`HierarchyError::TooDeep`]. Removal treats an over-deep unit as a
//! leaf, so tearing down a cyclic design terminates.

use crate::database::Database;
use crate::ids::{CellViewId, DesignUnitId, InstanceId};
use crate::observer::DesignUnitView;
use std::collections::HashMap;

/// Maximum depth of the design hierarchy before expansion reports a
/// probable instantiation cycle.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Failure surfaced by hierarchy expansion.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// The hierarchy is deeper than [`MAX_HIERARCHY_DEPTH`]; almost
    /// certainly a cell instantiating itself, directly or transitively.
    #[error("design hierarchy exceeds {depth} levels (possible instantiation cycle)")]
    TooDeep {
        /// Depth at which expansion stopped.
        depth: usize,
    },
}

/// What a design unit is rooted in.
pub enum DesignUnitKind {
    /// A top-level design: wraps the cell-view under edit, has no owning
    /// instance and no parent.
    Root {
        /// The cell-view this design was opened on.
        cell_view: CellViewId,
    },
    /// An interior node: one instantiation inside a parent unit.
    Node {
        /// The instance this unit was created for.
        instance: InstanceId,
        /// The parent design unit.
        parent: DesignUnitId,
    },
}

/// One node of the design hierarchy.
pub struct DesignUnit {
    pub(crate) kind: DesignUnitKind,
    pub(crate) design: DesignUnitId,
    pub(crate) children: HashMap<InstanceId, DesignUnitId>,
    pub(crate) expanded: bool,
    pub(crate) view: Option<Box<dyn DesignUnitView>>,
}

impl DesignUnit {
    pub(crate) fn new_root(cell_view: CellViewId) -> Self {
        Self {
            kind: DesignUnitKind::Root { cell_view },
            // Fixed up to the unit's own handle right after allocation.
            design: DesignUnitId::from_raw(0),
            children: HashMap::new(),
            expanded: false,
            view: None,
        }
    }

    pub(crate) fn new_node(
        instance: InstanceId,
        parent: DesignUnitId,
        design: DesignUnitId,
    ) -> Self {
        Self {
            kind: DesignUnitKind::Node { instance, parent },
            design,
            children: HashMap::new(),
            expanded: false,
            view: None,
        }
    }

    /// Whether this unit is a design root or an interior node.
    pub fn kind(&self) -> &DesignUnitKind {
        &self.kind
    }

    /// The instance this unit wraps, or `None` for a design root.
    pub fn instance(&self) -> Option<InstanceId> {
        match self.kind {
            DesignUnitKind::Root { .. } => None,
            DesignUnitKind::Node { instance, .. } => Some(instance),
        }
    }

    /// The parent unit, or `None` for a design root.
    pub fn parent_design_unit(&self) -> Option<DesignUnitId> {
        match self.kind {
            DesignUnitKind::Root { .. } => None,
            DesignUnitKind::Node { parent, .. } => Some(parent),
        }
    }

    /// The root of the design this unit belongs to (itself for a root).
    pub fn design(&self) -> DesignUnitId {
        self.design
    }

    /// The cached child map, as currently materialized. Use
    /// [`Database::child_design_units`] to force expansion.
    pub fn children(&self) -> &HashMap<InstanceId, DesignUnitId> {
        &self.children
    }

    /// Whether lazy expansion has run (a unit whose cell has no schematic
    /// stays expanded with zero children).
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether a hierarchy view is attached.
    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }
}

impl Database {
    /// Returns the design-unit record behind a handle.
    pub fn design_unit(&self, id: DesignUnitId) -> &DesignUnit {
        &self.designs.units[id]
    }

    /// The cell-view a unit presents: the edited view for a root, the
    /// instance's resolved target (with placeholder fallback) for a node.
    pub fn design_unit_cell_view(&mut self, unit: DesignUnitId) -> Option<CellViewId> {
        match self.designs.units[unit].kind {
            DesignUnitKind::Root { cell_view } => Some(cell_view),
            DesignUnitKind::Node { instance, .. } => self.instance_cell_view(instance),
        }
    }

    /// Number of ancestors above a unit (0 for a design root).
    pub fn design_unit_depth(&self, unit: DesignUnitId) -> usize {
        match self.designs.units[unit].kind {
            DesignUnitKind::Root { .. } => 0,
            DesignUnitKind::Node { parent, .. } => 1 + self.design_unit_depth(parent),
        }
    }

    /// The child design units of `unit`, keyed by instance.
    ///
    /// Materialized lazily on first call by walking the `schematic` view of
    /// the unit's resolved cell; cached afterwards. A non-empty map is
    /// treated as fully populated and never recomputed.
    pub fn child_design_units(
        &mut self,
        unit: DesignUnitId,
    ) -> Result<&HashMap<InstanceId, DesignUnitId>, HierarchyError> {
        self.expand_design_unit(unit)?;
        Ok(&self.designs.units[unit].children)
    }

    fn expand_design_unit(&mut self, unit: DesignUnitId) -> Result<(), HierarchyError> {
        {
            let u = &self.designs.units[unit];
            if u.expanded || !u.children.is_empty() {
                return Ok(());
            }
        }
        let depth = self.design_unit_depth(unit);
        if depth >= MAX_HIERARCHY_DEPTH {
            return Err(HierarchyError::TooDeep { depth });
        }
        let schematic = self
            .design_unit_cell_view(unit)
            .map(|cv| self.cell_views[cv].cell)
            .and_then(|cell| self.cell_implementation(cell));
        if let Some(schematic) = schematic {
            let design = self.designs.units[unit].design;
            for instance in self.cell_views[schematic].instances.clone() {
                // Two-step: allocate the child, then index it in the parent.
                let child = self
                    .designs
                    .units
                    .alloc(DesignUnit::new_node(instance, unit, design));
                self.designs.units.get_mut(unit).children.insert(instance, child);
            }
        }
        self.designs.units.get_mut(unit).expanded = true;
        Ok(())
    }

    /// Incremental maintenance: an instance was added to the unit's
    /// schematic while the design is open. Creates the child unit, indexes
    /// it, and notifies the attached view. Works whether or not lazy
    /// expansion has run.
    pub fn design_unit_add_instance(
        &mut self,
        unit: DesignUnitId,
        instance: InstanceId,
    ) -> DesignUnitId {
        let design = self.designs.units[unit].design;
        let child = self
            .designs
            .units
            .alloc(DesignUnit::new_node(instance, unit, design));
        self.designs.units.get_mut(unit).children.insert(instance, child);
        if let Some(view) = self.designs.units.get_mut(unit).view.as_mut() {
            view.add_instance(child);
        }
        child
    }

    /// Incremental maintenance: an instance was removed from the unit's
    /// schematic. Notifies the attached view, then drops the child from the
    /// map. A miss (instance never materialized here) is a no-op.
    pub fn design_unit_remove_instance(&mut self, unit: DesignUnitId, instance: InstanceId) {
        if !self.designs.units[unit].children.contains_key(&instance) {
            return;
        }
        if let Some(view) = self.designs.units.get_mut(unit).view.as_mut() {
            view.remove_instance();
        }
        self.designs.units.get_mut(unit).children.remove(&instance);
    }

    /// Attaches a hierarchy view to a unit and registers the unit with its
    /// resolved cell-view. Re-attaching replaces the view without
    /// registering the unit twice.
    pub fn attach_design_unit_view(&mut self, unit: DesignUnitId, view: Box<dyn DesignUnitView>) {
        self.designs.units.get_mut(unit).view = Some(view);
        if let Some(cv) = self.design_unit_cell_view(unit) {
            let registered = &mut self.cell_views.get_mut(cv).design_units;
            if !registered.contains(&unit) {
                registered.push(unit);
            }
        }
    }

    /// Forwards an attribute change to the unit's attached view.
    pub fn design_unit_update_item(&mut self, unit: DesignUnitId) {
        if let Some(view) = self.designs.units.get_mut(unit).view.as_mut() {
            view.update_item();
        }
    }

    /// Discards a unit's cached children (tearing them down with removal
    /// notifications) and clears the expanded flag, so the next access
    /// re-walks the schematic.
    pub fn invalidate_design_unit(&mut self, unit: DesignUnitId) {
        let children: Vec<_> = self.designs.units[unit].children.values().copied().collect();
        for child in children {
            self.remove_design_unit(child);
        }
        let u = self.designs.units.get_mut(unit);
        u.children.clear();
        u.expanded = false;
    }

    /// Removes a design unit and its whole subtree, depth-first post-order.
    ///
    /// Removal forces expansion of still-unexpanded descendants so they are
    /// torn down too; a unit past the depth guard is treated as a leaf.
    /// Each removed unit notifies its own attached view and is deregistered
    /// from its cell-view; a root is additionally dropped from the open
    /// designs and the hierarchy observers are notified.
    pub fn remove_design_unit(&mut self, unit: DesignUnitId) {
        let _ = self.expand_design_unit(unit);
        let children: Vec<_> = self.designs.units[unit].children.values().copied().collect();
        for child in children {
            self.remove_design_unit(child);
        }
        if let Some(mut view) = self.designs.units.get_mut(unit).view.take() {
            view.remove_instance();
            if let Some(cv) = self.design_unit_cell_view(unit) {
                self.cell_views.get_mut(cv).design_units.retain(|&u| u != unit);
            }
        }
        match self.designs.units[unit].kind {
            DesignUnitKind::Node { instance, parent } => {
                self.designs.units.get_mut(parent).children.remove(&instance);
            }
            DesignUnitKind::Root { .. } => {
                self.designs.detach_root(unit);
                self.designs.update_hierarchy_views();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A hierarchy-browser row that counts the notifications it receives.
    struct CountingView {
        added: Arc<AtomicUsize>,
        removed: Arc<AtomicUsize>,
        updated: Arc<AtomicUsize>,
    }

    impl CountingView {
        fn boxed() -> (Box<Self>, Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let added = Arc::new(AtomicUsize::new(0));
            let removed = Arc::new(AtomicUsize::new(0));
            let updated = Arc::new(AtomicUsize::new(0));
            let view = Box::new(CountingView {
                added: Arc::clone(&added),
                removed: Arc::clone(&removed),
                updated: Arc::clone(&updated),
            });
            (view, added, removed, updated)
        }
    }

    impl DesignUnitView for CountingView {
        fn add_instance(&mut self, _unit: DesignUnitId) {
            self.added.fetch_add(1, Ordering::Relaxed);
        }

        fn remove_instance(&mut self) {
            self.removed.fetch_add(1, Ordering::Relaxed);
        }

        fn update_item(&mut self) {
            self.updated.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Two-level design: /work/top/schematic placing two `inv` instances;
    /// `inv` has a symbol and a schematic of its own containing one `res`.
    fn make_two_level_db() -> (Database, CellViewId, Vec<InstanceId>) {
        let mut db = Database::new();
        let work = db.make_library_from_path("/work", None).unwrap();

        let res = db.add_cell(work, "res");
        db.add_cell_view(res, "symbol");

        let inv = db.add_cell(work, "inv");
        db.add_cell_view(inv, "symbol");
        let inv_sch = db.add_cell_view(inv, "schematic");
        let r = db.place_instance(inv_sch);
        db.set_instance_target(r, "", "res", "symbol");

        let top = db.add_cell(work, "top");
        let top_sch = db.add_cell_view(top, "schematic");
        let i0 = db.place_instance(top_sch);
        db.set_instance_target(i0, "", "inv", "symbol");
        let i1 = db.place_instance(top_sch);
        db.set_instance_target(i1, "", "inv", "symbol");

        (db, top_sch, vec![i0, i1])
    }

    #[test]
    fn first_access_materializes_children() {
        let (mut db, top_sch, instances) = make_two_level_db();
        let root = db.open_design(top_sch);
        let children = db.child_design_units(root).unwrap();
        assert_eq!(children.len(), 2);
        for inst in &instances {
            assert!(children.contains_key(inst));
        }
    }

    #[test]
    fn second_access_is_cached() {
        let (mut db, top_sch, instances) = make_two_level_db();
        let root = db.open_design(top_sch);
        let first: HashMap<_, _> = db.child_design_units(root).unwrap().clone();
        let allocated = db.designs.units.len();
        let second: HashMap<_, _> = db.child_design_units(root).unwrap().clone();
        assert_eq!(first, second);
        // No duplicate child construction on the second access.
        assert_eq!(db.designs.units.len(), allocated);
        assert_eq!(first[&instances[0]], second[&instances[0]]);
    }

    #[test]
    fn expansion_descends_through_resolved_targets() {
        let (mut db, top_sch, instances) = make_two_level_db();
        let root = db.open_design(top_sch);
        db.child_design_units(root).unwrap();
        let inv_unit = db.design_unit(root).children()[&instances[0]];
        // The node's cell-view is the inv symbol; its children come from
        // the inv schematic.
        let grandchildren = db.child_design_units(inv_unit).unwrap().clone();
        assert_eq!(grandchildren.len(), 1);
        assert_eq!(db.design_unit_depth(inv_unit), 1);
        let res_unit = *grandchildren.values().next().unwrap();
        assert_eq!(db.design_unit_depth(res_unit), 2);
        assert_eq!(db.design_unit(res_unit).design(), root);
    }

    #[test]
    fn cell_without_schematic_expands_to_zero_children() {
        let mut db = Database::new();
        let work = db.make_library_from_path("/work", None).unwrap();
        let res = db.add_cell(work, "res");
        let sym = db.add_cell_view(res, "symbol");
        let root = db.open_design(sym);
        assert!(db.child_design_units(root).unwrap().is_empty());
        assert!(db.design_unit(root).is_expanded());
    }

    #[test]
    fn add_instance_before_expansion_populates_map() {
        let (mut db, top_sch, _) = make_two_level_db();
        let root = db.open_design(top_sch);

        // Edit the schematic while the design is open, without ever having
        // expanded the root.
        let extra = db.place_instance(top_sch);
        db.set_instance_target(extra, "", "inv", "symbol");
        let child = db.design_unit_add_instance(root, extra);

        assert_eq!(db.design_unit(root).children()[&extra], child);
        // The non-empty map short-circuits lazy expansion from here on.
        assert_eq!(db.child_design_units(root).unwrap().len(), 1);
    }

    #[test]
    fn add_and_remove_instance_notify_attached_view() {
        let (mut db, top_sch, _) = make_two_level_db();
        let root = db.open_design(top_sch);
        let (view, added, removed, _) = CountingView::boxed();
        db.attach_design_unit_view(root, view);

        let extra = db.place_instance(top_sch);
        db.design_unit_add_instance(root, extra);
        assert_eq!(added.load(Ordering::Relaxed), 1);

        db.design_unit_remove_instance(root, extra);
        assert_eq!(removed.load(Ordering::Relaxed), 1);
        assert!(!db.design_unit(root).children().contains_key(&extra));

        // Removing an instance that never materialized here is a no-op.
        db.design_unit_remove_instance(root, extra);
        assert_eq!(removed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn attach_view_registers_with_cell_view() {
        let (mut db, top_sch, _) = make_two_level_db();
        let root = db.open_design(top_sch);
        let (view, _, _, updated) = CountingView::boxed();
        db.attach_design_unit_view(root, view);
        assert_eq!(db.cell_view(top_sch).design_units(), &[root]);

        db.design_unit_update_item(root);
        assert_eq!(updated.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn reattaching_a_view_registers_once() {
        let (mut db, top_sch, _) = make_two_level_db();
        let root = db.open_design(top_sch);
        let (first, _, _, _) = CountingView::boxed();
        db.attach_design_unit_view(root, first);
        let (second, _, _, updated) = CountingView::boxed();
        db.attach_design_unit_view(root, second);

        assert_eq!(db.cell_view(top_sch).design_units(), &[root]);
        // Only the replacement view receives notifications.
        db.design_unit_update_item(root);
        assert_eq!(updated.load(Ordering::Relaxed), 1);

        db.remove_design_unit(root);
        assert!(db.cell_view(top_sch).design_units().is_empty());
    }

    #[test]
    fn removal_cascades_through_unexpanded_descendants() {
        let (mut db, top_sch, instances) = make_two_level_db();
        let root = db.open_design(top_sch);
        db.child_design_units(root).unwrap();
        let inv_unit = db.design_unit(root).children()[&instances[0]];
        // inv_unit's own children (the res instance) are never accessed.
        let (view, _, removed, _) = CountingView::boxed();
        db.attach_design_unit_view(inv_unit, view);
        let before = db.designs.units.len();

        db.remove_design_unit(root);

        // Teardown forced expansion of the untouched inv subtrees.
        assert!(db.designs.units.len() > before);
        assert_eq!(removed.load(Ordering::Relaxed), 1);
        assert!(db.design_unit(root).children().is_empty());
        assert!(db.designs().roots().is_empty());
        // Deregistered from the cell-view it was registered with.
        let inv_sym = db.cell_view_by_path("/work", "inv", "symbol").unwrap();
        assert!(db.cell_view(inv_sym).design_units().is_empty());
    }

    #[test]
    fn self_instantiating_cell_hits_depth_guard() {
        let mut db = Database::new();
        let work = db.make_library_from_path("/work", None).unwrap();
        let top = db.add_cell(work, "top");
        let sch = db.add_cell_view(top, "schematic");
        let inst = db.place_instance(sch);
        db.set_instance_target(inst, "", "top", "schematic");

        let root = db.open_design(sch);
        let mut unit = root;
        let mut levels = 0;
        let err = loop {
            match db.child_design_units(unit) {
                Ok(children) => {
                    unit = *children.values().next().unwrap();
                    levels += 1;
                    assert!(levels <= MAX_HIERARCHY_DEPTH, "expansion never bounded");
                }
                Err(e) => break e,
            }
        };
        assert!(matches!(err, HierarchyError::TooDeep { depth } if depth == MAX_HIERARCHY_DEPTH));
    }

    #[test]
    fn self_instantiating_design_teardown_terminates() {
        let mut db = Database::new();
        let work = db.make_library_from_path("/work", None).unwrap();
        let top = db.add_cell(work, "top");
        let sch = db.add_cell_view(top, "schematic");
        let inst = db.place_instance(sch);
        db.set_instance_target(inst, "", "top", "schematic");

        let root = db.open_design(sch);
        db.close_design(root);
        assert!(db.designs().roots().is_empty());
    }

    #[test]
    fn invalidation_rebuilds_children() {
        let (mut db, top_sch, _) = make_two_level_db();
        let root = db.open_design(top_sch);
        assert_eq!(db.child_design_units(root).unwrap().len(), 2);

        // A third instance placed after expansion is invisible until the
        // cache is explicitly invalidated.
        let extra = db.place_instance(top_sch);
        db.set_instance_target(extra, "", "inv", "symbol");
        assert_eq!(db.child_design_units(root).unwrap().len(), 2);

        db.invalidate_design_unit(root);
        assert!(!db.design_unit(root).is_expanded());
        assert_eq!(db.child_design_units(root).unwrap().len(), 3);
    }
}
