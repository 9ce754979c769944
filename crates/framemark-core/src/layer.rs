//! Layer model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// An ordered, toggle-able grouping of elements.
///
/// Layers do not hold elements directly; elements carry a `layer_id`
/// back-reference, which makes merge an O(1)-per-element reassignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    /// Unique among layers.
    pub name: String,
    pub visible: bool,
    pub locked: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            locked: false,
        }
    }
}
