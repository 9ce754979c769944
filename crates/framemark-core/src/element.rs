//! Annotation element model.

use crate::geometry;
use crate::layer::LayerId;
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Approximate bounding box for text hit-testing, anchored at the text origin.
pub const TEXT_HIT_WIDTH: f64 = 120.0;
pub const TEXT_HIT_HEIGHT: f64 = 28.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The closed set of annotation primitives.
///
/// Unknown kinds fail draft deserialization, which callers treat as an
/// absent draft rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Freehand,
    Rectangle,
    Ellipse,
    Arrow,
    Text,
    Highlight,
}

impl ElementKind {
    /// Whether the kind is defined by exactly an anchor and an end point.
    /// A degenerate click with no drag is discarded for these kinds.
    pub fn requires_two_points(&self) -> bool {
        matches!(
            self,
            ElementKind::Rectangle
                | ElementKind::Ellipse
                | ElementKind::Arrow
                | ElementKind::Highlight
        )
    }
}

/// A single annotation primitive.
///
/// `points` stores every sample for freehand strokes; every other kind keeps
/// exactly the anchor (first) and end (last) point. Style attributes are
/// copied at creation time, not live-bound to the current tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub points: Vec<Point>,
    pub color: SerializableColor,
    pub stroke_width: f64,
    /// Present only for text elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Back-reference to the owning layer.
    pub layer_id: LayerId,
}

impl Element {
    /// Create a new element starting at a single anchor point.
    pub fn new(
        kind: ElementKind,
        anchor: Point,
        color: SerializableColor,
        stroke_width: f64,
        layer_id: LayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            points: vec![anchor],
            color,
            stroke_width,
            text: None,
            layer_id,
        }
    }

    /// Create a committed text element at a position.
    pub fn text(
        position: Point,
        content: String,
        color: SerializableColor,
        stroke_width: f64,
        layer_id: LayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ElementKind::Text,
            points: vec![position],
            color,
            stroke_width,
            text: Some(content),
            layer_id,
        }
    }

    /// The anchor (first) point.
    pub fn anchor(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    /// The current end (last) point.
    pub fn end(&self) -> Point {
        self.points.last().copied().unwrap_or(Point::ZERO)
    }

    /// Record a pointer-move sample. Freehand appends; every other kind
    /// keeps exactly the anchor/current pair.
    pub fn update_end(&mut self, point: Point) {
        match self.kind {
            ElementKind::Freehand => self.points.push(point),
            _ => {
                let anchor = self.anchor();
                self.points = vec![anchor, point];
            }
        }
    }

    /// Whether the element is a degenerate click for a two-point kind.
    pub fn is_degenerate(&self) -> bool {
        self.kind.requires_two_points() && self.points.len() < 2
    }

    /// Rigid translation of every point; preserves shape.
    pub fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Bounding box in surface coordinates.
    pub fn bounds(&self) -> Rect {
        match self.kind {
            ElementKind::Text => {
                let p = self.anchor();
                Rect::new(p.x, p.y, p.x + TEXT_HIT_WIDTH, p.y + TEXT_HIT_HEIGHT)
            }
            _ => {
                if self.points.is_empty() {
                    return Rect::ZERO;
                }
                let mut rect = geometry::corner_rect(self.anchor(), self.anchor());
                for p in &self.points {
                    rect = rect.union_pt(*p);
                }
                rect
            }
        }
    }

    /// Check whether a surface-space point hits this element, using a fixed
    /// padding to make thin strokes easier to grab.
    pub fn hit_test(&self, point: Point, pad: f64) -> bool {
        match self.kind {
            ElementKind::Rectangle | ElementKind::Highlight => {
                if self.points.len() < 2 {
                    return false;
                }
                geometry::point_in_rect(point, self.anchor(), self.end(), pad)
            }
            ElementKind::Ellipse => {
                if self.points.len() < 2 {
                    return false;
                }
                geometry::point_in_ellipse(point, self.anchor(), self.end(), pad)
            }
            ElementKind::Arrow => {
                if self.points.len() < 2 {
                    return false;
                }
                geometry::point_to_segment_dist(point, self.anchor(), self.end()) <= pad
            }
            ElementKind::Freehand => {
                if self.points.len() < 2 {
                    let p = self.anchor();
                    let d = ((point.x - p.x).powi(2) + (point.y - p.y).powi(2)).sqrt();
                    return d <= pad;
                }
                geometry::point_to_polyline_dist(point, &self.points) <= pad
            }
            ElementKind::Text => {
                let p = self.anchor();
                point.x >= p.x
                    && point.x <= p.x + TEXT_HIT_WIDTH
                    && point.y >= p.y
                    && point.y <= p.y + TEXT_HIT_HEIGHT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> LayerId {
        Uuid::new_v4()
    }

    #[test]
    fn test_two_point_kinds_replace_end() {
        let mut el = Element::new(
            ElementKind::Rectangle,
            Point::new(10.0, 10.0),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        el.update_end(Point::new(50.0, 30.0));
        el.update_end(Point::new(110.0, 60.0));
        assert_eq!(el.points.len(), 2);
        assert_eq!(el.anchor(), Point::new(10.0, 10.0));
        assert_eq!(el.end(), Point::new(110.0, 60.0));
    }

    #[test]
    fn test_freehand_accumulates_points() {
        let mut el = Element::new(
            ElementKind::Freehand,
            Point::new(0.0, 0.0),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        el.update_end(Point::new(1.0, 1.0));
        el.update_end(Point::new(2.0, 2.0));
        assert_eq!(el.points.len(), 3);
    }

    #[test]
    fn test_degenerate_rules() {
        let rect = Element::new(
            ElementKind::Rectangle,
            Point::new(0.0, 0.0),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        assert!(rect.is_degenerate());

        let stroke = Element::new(
            ElementKind::Freehand,
            Point::new(0.0, 0.0),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        assert!(!stroke.is_degenerate());
    }

    #[test]
    fn test_translate_preserves_shape() {
        let mut el = Element::new(
            ElementKind::Arrow,
            Point::new(0.0, 0.0),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        el.update_end(Point::new(100.0, 0.0));
        el.translate(Vec2::new(10.0, 20.0));
        assert_eq!(el.anchor(), Point::new(10.0, 20.0));
        assert_eq!(el.end(), Point::new(110.0, 20.0));
    }

    #[test]
    fn test_rectangle_hit() {
        let mut el = Element::new(
            ElementKind::Rectangle,
            Point::new(10.0, 10.0),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        el.update_end(Point::new(110.0, 60.0));
        assert!(el.hit_test(Point::new(60.0, 35.0), 10.0));
        assert!(!el.hit_test(Point::new(500.0, 500.0), 10.0));
    }

    #[test]
    fn test_arrow_hit_near_shaft() {
        let mut el = Element::new(
            ElementKind::Arrow,
            Point::new(0.0, 0.0),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        el.update_end(Point::new(100.0, 0.0));
        assert!(el.hit_test(Point::new(50.0, 8.0), 10.0));
        assert!(!el.hit_test(Point::new(50.0, 30.0), 10.0));
    }

    #[test]
    fn test_text_hit_box() {
        let el = Element::text(
            Point::new(40.0, 40.0),
            "note".to_string(),
            SerializableColor::black(),
            2.0,
            layer(),
        );
        assert!(el.hit_test(Point::new(60.0, 50.0), 10.0));
        assert!(!el.hit_test(Point::new(300.0, 50.0), 10.0));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut el = Element::new(
            ElementKind::Ellipse,
            Point::new(1.0, 2.0),
            SerializableColor::new(255, 0, 0, 255),
            4.0,
            layer(),
        );
        el.update_end(Point::new(9.0, 8.0));
        let json = serde_json::to_string(&el).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(el, back);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"{"id":"6f6f6f6f-6f6f-4f6f-8f6f-6f6f6f6f6f6f","kind":"Spline",
            "points":[],"color":{"r":0,"g":0,"b":0,"a":255},"stroke_width":2.0,
            "layer_id":"6f6f6f6f-6f6f-4f6f-8f6f-6f6f6f6f6f6f"}"#;
        assert!(serde_json::from_str::<Element>(json).is_err());
    }
}
