//! Cell-views — one concrete drawing of a cell.
//!
//! The drawing content itself (lines, rectangles, labels) is a collaborator
//! concern; this core tracks only what the hierarchy needs: the placed
//! instances and the design units currently wrapping this view.

use crate::ids::{CellId, DesignUnitId, InstanceId};
use serde::{Deserialize, Serialize};
use skema_common::Ident;

/// The conventional view name the hierarchy descends through.
pub const SCHEMATIC_VIEW: &str = "schematic";

/// The conventional view name used for symbol placement.
pub const SYMBOL_VIEW: &str = "symbol";

/// One named view of a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellView {
    pub(crate) name: Ident,
    pub(crate) cell: CellId,
    pub(crate) instances: Vec<InstanceId>,
    /// Design units registered against this view; written when a hierarchy
    /// view attaches to a unit, read at unit teardown.
    pub(crate) design_units: Vec<DesignUnitId>,
}

impl CellView {
    pub(crate) fn new(name: Ident, cell: CellId) -> Self {
        Self {
            name,
            cell,
            instances: Vec::new(),
            design_units: Vec::new(),
        }
    }

    /// The view's name.
    pub fn name(&self) -> Ident {
        self.name
    }

    /// The owning cell.
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// Instances placed in this view, in placement order.
    pub fn instances(&self) -> &[InstanceId] {
        &self.instances
    }

    /// Design units currently registered against this view.
    pub fn design_units(&self) -> &[DesignUnitId] {
        &self.design_units
    }

    pub(crate) fn detach_instance(&mut self, id: InstanceId) {
        self.instances.retain(|&i| i != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let view = CellView::new(Ident::from_raw(0), CellId::from_raw(0));
        assert!(view.instances().is_empty());
        assert!(view.design_units().is_empty());
    }
}
