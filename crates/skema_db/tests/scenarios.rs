//! End-to-end scenarios exercising the namespace, instance resolution, and
//! the design hierarchy together.

use skema_db::database::Database;
use skema_db::design_unit::{HierarchyError, MAX_HIERARCHY_DEPTH};
use skema_db::instance::{FALLBACK_CELL_NAME, FALLBACK_LIBRARY_PATH, FALLBACK_VIEW_NAME};
use skema_db::path::concat_paths;

/// Builds a small namespace tree: /a/b/c and /a/d.
fn make_tree() -> Database {
    let mut db = Database::new();
    db.make_library_from_path("/a/b/c", None).unwrap();
    db.make_library_from_path("/a/d", None).unwrap();
    db
}

#[test]
fn resolving_a_concatenated_path_matches_walking_it() {
    let db = make_tree();
    let base = "/a/b";

    // For each relative expression, resolve(concat(base, p)) must land on
    // the same library as resolving p relative to the base library.
    let cases = ["c", "./c", "../d", ".././d", "../b/c", "/a/d"];
    let base_lib = db.library_by_path(base).unwrap();
    for p in cases {
        let via_concat = db.library_by_path(&concat_paths(base, p));
        let via_walk = db.library_by_path_from(base_lib, p);
        assert_eq!(via_concat, via_walk, "path expression {p:?}");
        assert!(via_concat.is_some(), "path expression {p:?} resolved to nothing");
    }
}

#[test]
fn concatenation_identities() {
    assert_eq!(concat_paths("/a/b", ""), "/a/b");
    assert_eq!(concat_paths("/a/b", "/x"), "/x");
    assert_eq!(concat_paths("/a/b", "../c"), "/a/c");
    assert_eq!(concat_paths("/a", "../c"), "/c");
}

#[test]
fn broken_reference_degrades_to_placeholder_symbol() {
    let mut db = Database::new();
    let analog = db.make_library_from_path(FALLBACK_LIBRARY_PATH, None).unwrap();
    let voltage = db.add_cell(analog, FALLBACK_CELL_NAME);
    let placeholder = db.add_cell_view(voltage, FALLBACK_VIEW_NAME);

    let work = db.make_library_from_path("/work", None).unwrap();
    let top = db.add_cell(work, "top");
    let sch = db.add_cell_view(top, "schematic");
    let inst = db.place_instance(sch);
    db.set_instance_target(inst, "/vanished", "amp", "symbol");

    assert_eq!(db.requested_instance_cell_view(inst), None);
    assert_eq!(db.instance_cell_view(inst), Some(placeholder));
}

#[test]
fn self_referencing_schematic_is_bounded() {
    // create database -> /analog -> opamp -> schematic -> instance of
    // (., opamp, schematic): a direct self-reference.
    let mut db = Database::new();
    let analog = db.make_library_from_path("/analog", None).unwrap();
    let opamp = db.add_cell(analog, "opamp");
    let sch = db.add_cell_view(opamp, "schematic");
    let inst = db.place_instance(sch);
    db.set_instance_target(inst, ".", "opamp", "schematic");

    assert_eq!(db.instance_absolute_path(inst), "/analog");
    assert_eq!(db.requested_instance_cell_view(inst), Some(sch));

    // Descending must hit the depth guard instead of looping.
    let root = db.open_design(sch);
    let mut unit = root;
    let outcome = loop {
        match db.child_design_units(unit) {
            Ok(children) => unit = *children.values().next().unwrap(),
            Err(e) => break e,
        }
    };
    assert!(matches!(outcome, HierarchyError::TooDeep { depth } if depth == MAX_HIERARCHY_DEPTH));

    // Teardown of the partially expanded cyclic design terminates too.
    db.close_design(root);
    assert!(db.designs().roots().is_empty());
}

#[test]
fn edit_open_design_end_to_end() {
    let mut db = Database::new();
    let work = db.make_library_from_path("/work", None).unwrap();

    let inv = db.add_cell(work, "inv");
    db.add_cell_view(inv, "symbol");

    let top = db.add_cell(work, "top");
    let top_sch = db.add_cell_view(top, "schematic");
    let i0 = db.place_instance(top_sch);
    db.set_instance_target(i0, "", "inv", "symbol");

    let root = db.open_design(top_sch);
    assert_eq!(db.child_design_units(root).unwrap().len(), 1);

    // The user drops another inv into the open schematic; the drawing
    // layer mirrors the edit into the hierarchy.
    let i1 = db.place_instance(top_sch);
    db.set_instance_target(i1, "", "inv", "symbol");
    let child = db.design_unit_add_instance(root, i1);
    assert_eq!(db.design_unit(root).children().len(), 2);
    assert_eq!(db.design_unit(child).instance(), Some(i1));

    // And deletes the first one again.
    db.unplace_instance(i0);
    db.design_unit_remove_instance(root, i0);
    assert_eq!(db.design_unit(root).children().len(), 1);

    db.close_design(root);
    assert!(db.designs().roots().is_empty());
}
