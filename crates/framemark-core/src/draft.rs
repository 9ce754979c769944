//! Serialized in-progress drawing state, keyed by the external target.

use crate::element::Element;
use crate::layer::{Layer, LayerId};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A snapshot of unsaved work, written on every committed change and read
/// back when a session reopens for the same target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub elements: Vec<Element>,
    pub layers: Vec<Layer>,
    pub current_layer_id: LayerId,
    /// Display duration in seconds.
    pub duration: u32,
    /// Video timestamp of the paused frame, in seconds.
    pub timestamp: f64,
    /// Unix epoch seconds at write time.
    pub saved_at: u64,
}

impl Draft {
    pub fn new(
        elements: Vec<Element>,
        layers: Vec<Layer>,
        current_layer_id: LayerId,
        duration: u32,
        timestamp: f64,
    ) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            elements,
            layers,
            current_layer_id,
            duration,
            timestamp,
            saved_at,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored draft. Anything unreadable (malformed JSON, an
    /// unknown element kind from an incompatible schema) is treated as
    /// "no draft available", never an error.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(draft) => Some(draft),
            Err(e) => {
                log::warn!("ignoring unreadable draft: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, SerializableColor};
    use kurbo::Point;

    fn sample() -> Draft {
        let layer = Layer::new("Layer 1");
        let element = Element::new(
            ElementKind::Freehand,
            Point::new(1.0, 2.0),
            SerializableColor::black(),
            3.0,
            layer.id,
        );
        Draft::new(vec![element], vec![layer.clone()], layer.id, 5, 12.75)
    }

    #[test]
    fn test_roundtrip() {
        let draft = sample();
        let json = draft.to_json().unwrap();
        let back = Draft::from_json(&json).unwrap();
        assert_eq!(back.elements, draft.elements);
        assert_eq!(back.current_layer_id, draft.current_layer_id);
        assert_eq!(back.duration, 5);
        assert!((back.timestamp - 12.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_corrupt_draft_is_absent() {
        assert!(Draft::from_json("not json at all").is_none());
        assert!(Draft::from_json("{\"elements\": 7}").is_none());
    }

    #[test]
    fn test_unknown_kind_is_absent() {
        let draft = sample();
        let json = draft.to_json().unwrap().replace("Freehand", "Hologram");
        assert!(Draft::from_json(&json).is_none());
    }
}
