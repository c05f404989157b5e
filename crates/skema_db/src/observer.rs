//! Notification contracts between the database and external views.
//!
//! Observers carry no payload describing *what* changed; the contract is
//! "something changed, re-pull state" through the read accessors. All
//! notification is synchronous and per-mutation, with no batching.

use crate::ids::DesignUnitId;

/// An observer of the library/cell namespace, registered through
/// [`Database::install_update_database_views_hook`](crate::database::Database::install_update_database_views_hook).
///
/// `update` fires once after every structural mutation, in registration
/// order. `prepare_for_update` fires only when a caller explicitly invokes
/// [`Database::update_database_views_preparation`](crate::database::Database::update_database_views_preparation)
/// ahead of a multi-step change, so layout-sensitive views can snapshot
/// pre-change state.
pub trait DatabaseObserver {
    /// Called before a structural change, on the preparation channel.
    fn prepare_for_update(&mut self);

    /// Called after a structural change.
    fn update(&mut self);
}

/// An observer of the set of open designs, registered through
/// [`Database::install_update_hierarchy_views_hook`](crate::database::Database::install_update_hierarchy_views_hook).
///
/// `update` fires on every design membership change. `prepare_for_update`
/// fires only when a caller explicitly invokes
/// [`Database::update_hierarchy_views_preparation`](crate::database::Database::update_hierarchy_views_preparation)
/// ahead of a multi-step change. Membership is a set; observers must not
/// assume any ordering among roots.
pub trait HierarchyObserver {
    /// Called before the design set changes, on the preparation channel.
    fn prepare_for_update(&mut self);

    /// Called after the design set has changed.
    fn update(&mut self);
}

/// The view attached to a single design unit (one row of a hierarchy
/// browser). Called synchronously as the unit's structure changes; the view
/// is expected to re-render or re-index on each call.
pub trait DesignUnitView {
    /// A child design unit was created under the observed unit.
    fn add_instance(&mut self, unit: DesignUnitId);

    /// The observed unit is being removed.
    fn remove_instance(&mut self);

    /// The observed unit's attributes changed.
    fn update_item(&mut self);
}
