//! Annotation document: the element set and its layers.

use crate::element::{Element, ElementId};
use crate::layer::{Layer, LayerId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected user input. Always recovered locally with a visible notice,
/// never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Layer \"{0}\" is locked")]
    LayerLocked(String),
    #[error("Layer name cannot be empty")]
    EmptyLayerName,
    #[error("A layer named \"{0}\" already exists")]
    DuplicateLayerName(String),
    #[error("The last remaining layer cannot be deleted")]
    LastLayer,
    #[error("Merging requires at least two layers")]
    MergeTooFew,
    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),
}

/// The element set plus its layer list.
///
/// Layer array position determines paint order (lower index painted first);
/// within a layer, elements paint in insertion order. At least one layer
/// always exists, and every element's `layer_id` resolves to a present
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// All elements in insertion order.
    pub elements: Vec<Element>,
    /// Layers in paint order (back to front).
    pub layers: Vec<Layer>,
    /// The active layer; new elements land here.
    pub current_layer: LayerId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with a single default layer.
    pub fn new() -> Self {
        let layer = Layer::new("Layer 1");
        let current = layer.id;
        Self {
            elements: Vec::new(),
            layers: vec![layer],
            current_layer: current,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer, EngineError> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(EngineError::UnknownLayer(id))
    }

    /// The active layer. A document always has one.
    pub fn active_layer(&self) -> &Layer {
        self.layer(self.current_layer)
            .unwrap_or_else(|| &self.layers[0])
    }

    pub fn set_current_layer(&mut self, id: LayerId) -> Result<(), EngineError> {
        if self.layer(id).is_none() {
            return Err(EngineError::UnknownLayer(id));
        }
        self.current_layer = id;
        Ok(())
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Append a committed element.
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Elements in paint order: layer order first, insertion order within a
    /// layer.
    pub fn paint_order(&self) -> impl Iterator<Item = &Element> {
        self.layers
            .iter()
            .flat_map(|layer| self.elements.iter().filter(move |e| e.layer_id == layer.id))
    }

    /// Paint order restricted to visible layers.
    pub fn visible_paint_order(&self) -> impl Iterator<Item = &Element> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .flat_map(|layer| self.elements.iter().filter(move |e| e.layer_id == layer.id))
    }

    /// Resolve the topmost element hit at a surface point. Invisible layers
    /// are skipped; `pad` widens thin strokes for easier grabbing.
    pub fn hit_test_top(&self, point: Point, pad: f64) -> Option<ElementId> {
        let ordered: Vec<&Element> = self.visible_paint_order().collect();
        ordered
            .iter()
            .rev()
            .find(|e| e.hit_test(point, pad))
            .map(|e| e.id)
    }

    /// Append a new layer with an auto-numbered unique name and make it
    /// active.
    pub fn add_layer(&mut self) -> LayerId {
        let mut n = self.layers.len() + 1;
        let mut name = format!("Layer {n}");
        while self.layers.iter().any(|l| l.name == name) {
            n += 1;
            name = format!("Layer {n}");
        }
        let layer = Layer::new(name);
        let id = layer.id;
        self.layers.push(layer);
        self.current_layer = id;
        log::debug!("added layer {id}");
        id
    }

    pub fn toggle_visibility(&mut self, id: LayerId) -> Result<(), EngineError> {
        let layer = self.layer_mut(id)?;
        layer.visible = !layer.visible;
        Ok(())
    }

    pub fn toggle_lock(&mut self, id: LayerId) -> Result<(), EngineError> {
        let layer = self.layer_mut(id)?;
        layer.locked = !layer.locked;
        Ok(())
    }

    /// Rename a layer. Empty or duplicate names are rejected and the prior
    /// name is left intact.
    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> Result<(), EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyLayerName);
        }
        if self.layers.iter().any(|l| l.id != id && l.name == name) {
            return Err(EngineError::DuplicateLayerName(name.to_string()));
        }
        self.layer_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Move a layer from one position to another, producing a new explicit
    /// ordering (drag-and-drop reorder).
    pub fn reorder_layers(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
        if from >= self.layers.len() || to >= self.layers.len() {
            return Err(EngineError::UnknownLayer(LayerId::nil()));
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        Ok(())
    }

    /// Delete a layer and every element it owns in one operation, so no
    /// element is left referencing a missing layer. The last remaining
    /// layer cannot be deleted.
    pub fn delete_layer(&mut self, id: LayerId) -> Result<(), EngineError> {
        if self.layer(id).is_none() {
            return Err(EngineError::UnknownLayer(id));
        }
        if self.layers.len() == 1 {
            return Err(EngineError::LastLayer);
        }
        self.layers.retain(|l| l.id != id);
        self.elements.retain(|e| e.layer_id != id);
        if self.current_layer == id {
            self.current_layer = self.layers[0].id;
        }
        log::debug!("deleted layer {id}");
        Ok(())
    }

    /// Merge the source layers into the target: every element owned by a
    /// source is reassigned to the target, then the sources are removed.
    /// The active layer switches to the target if it was among the removed.
    pub fn merge_layers(
        &mut self,
        target: LayerId,
        sources: &[LayerId],
    ) -> Result<(), EngineError> {
        if self.layer(target).is_none() {
            return Err(EngineError::UnknownLayer(target));
        }
        let mut removed: Vec<LayerId> = Vec::new();
        for &id in sources {
            if self.layer(id).is_none() {
                return Err(EngineError::UnknownLayer(id));
            }
            if id != target && !removed.contains(&id) {
                removed.push(id);
            }
        }
        if removed.is_empty() {
            return Err(EngineError::MergeTooFew);
        }
        for element in &mut self.elements {
            if removed.contains(&element.layer_id) {
                element.layer_id = target;
            }
        }
        self.layers.retain(|l| !removed.contains(&l.id));
        if removed.contains(&self.current_layer) {
            self.current_layer = target;
        }
        log::debug!("merged {} layer(s) into {target}", removed.len());
        Ok(())
    }

    /// Drop elements whose layer no longer exists. Used after a history
    /// restore, since layer deletions are not reversed by element-set undo.
    pub fn remove_orphans(&mut self) {
        let layers = &self.layers;
        self.elements
            .retain(|e| layers.iter().any(|l| l.id == e.layer_id));
    }
}
