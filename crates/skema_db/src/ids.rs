//! Opaque handle newtypes for every database entity.
//!
//! Each handle is a thin `u32` wrapper that is `Copy`, `Hash`, and
//! serde-serializable. Handles are created by
//! [`Arena::alloc`](crate::arena::Arena::alloc) and stay valid for the
//! lifetime of the database, even after the entity is detached.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates a handle from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Handle of a library node in the namespace tree.
    LibraryId
);

define_id!(
    /// Handle of a cell within a library.
    CellId
);

define_id!(
    /// Handle of one view (schematic, symbol, ...) of a cell.
    CellViewId
);

define_id!(
    /// Handle of an instance placed in a cell-view.
    InstanceId
);

define_id!(
    /// Handle of a node in the design hierarchy.
    DesignUnitId
);
