//! Skema design database — hierarchical storage for circuit libraries,
//! cells, and cell-views, plus the derived design-unit hierarchy.
//!
//! The database is organized around two interlocking trees: the
//! library/cell/view namespace, addressed by `/`-separated paths, and the
//! design hierarchy, a lazily materialized overlay that follows cell-view
//! instance references to reconstruct the full instantiation tree.
//!
//! All entities live in arenas inside one [`Database`] and are referred to
//! by opaque handles; external views register as observers and pull state
//! through read accessors when notified.

#![warn(missing_docs)]

pub mod arena;
pub mod cell;
pub mod cell_view;
pub mod database;
pub mod design_unit;
pub mod designs;
pub mod ids;
pub mod instance;
pub mod layers;
pub mod library;
pub mod observer;
pub mod path;

pub use cell::Cell;
pub use cell_view::CellView;
pub use database::Database;
pub use design_unit::{DesignUnit, DesignUnitKind, HierarchyError, MAX_HIERARCHY_DEPTH};
pub use designs::Designs;
pub use ids::{CellId, CellViewId, DesignUnitId, InstanceId, LibraryId};
pub use instance::Instance;
pub use layers::{Layer, Layers};
pub use library::Library;
pub use observer::{DatabaseObserver, DesignUnitView, HierarchyObserver};
