//! Layer-definition set.
//!
//! The database owns the active layer set so that drawing collaborators can
//! look layers up by name and purpose. The format is external to this core;
//! nothing here interprets a layer beyond its identity.

use serde::{Deserialize, Serialize};

/// One layer definition, identified by a (name, purpose) pair such as
/// `("net", "drawing")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// The layer name.
    pub name: String,
    /// The layer purpose.
    pub purpose: String,
}

/// The set of layer definitions currently installed on a database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layers {
    layers: Vec<Layer>,
}

impl Layers {
    /// Creates an empty layer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer definition.
    pub fn add(&mut self, name: impl Into<String>, purpose: impl Into<String>) {
        self.layers.push(Layer {
            name: name.into(),
            purpose: purpose.into(),
        });
    }

    /// Looks up a layer by name and purpose.
    pub fn layer_by_name(&self, name: &str, purpose: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|l| l.name == name && l.purpose == purpose)
    }

    /// Iterates over all layer definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }
}
