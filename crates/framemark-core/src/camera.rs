//! View transform for zoom/pan over the drawing surface.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level (base, 1:1 with the surface).
pub const MIN_ZOOM: f64 = 1.0;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 5.0;

/// Maps device (input) coordinates to surface (drawing) coordinates and back.
///
/// `to_surface` must be the exact inverse of the composer's paint-time
/// transform, or hit-testing and drawing visibly diverge. View state is not
/// part of undo history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Current zoom level.
    pub zoom: f64,
    /// Current pan offset in device pixels.
    pub pan: Vec2,
    /// Drawing surface origin within the device coordinate space.
    pub origin: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: MIN_ZOOM,
            pan: Vec2::ZERO,
            origin: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a device point to surface coordinates:
    /// `surface = (device - origin - pan) / zoom`.
    pub fn to_surface(&self, device: Point) -> Point {
        Point::new(
            (device.x - self.origin.x - self.pan.x) / self.zoom,
            (device.y - self.origin.y - self.pan.y) / self.zoom,
        )
    }

    /// Convert a surface point to device coordinates (paint-time transform).
    pub fn to_device(&self, surface: Point) -> Point {
        Point::new(
            surface.x * self.zoom + self.pan.x + self.origin.x,
            surface.y * self.zoom + self.pan.y + self.origin.y,
        )
    }

    /// Update zoom from a pinch gesture using the ratio of the current to
    /// previous inter-contact distance.
    pub fn pinch(&mut self, prev_dist: f64, curr_dist: f64) {
        if prev_dist < f64::EPSILON {
            return;
        }
        self.zoom = (self.zoom * curr_dist / prev_dist).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pan by a delta in device pixels. Only active when zoomed in; returns
    /// whether the pan was applied.
    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        if self.zoom <= MIN_ZOOM {
            return false;
        }
        self.pan += delta;
        true
    }

    /// Reset to base zoom with no pan.
    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.pan = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_at_base_zoom() {
        let view = ViewTransform::new();
        let p = view.to_surface(Point::new(100.0, 200.0));
        assert!((p.x - 100.0).abs() < f64::EPSILON);
        assert!((p.y - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_origin_subtracted() {
        let mut view = ViewTransform::new();
        view.origin = Vec2::new(40.0, 80.0);
        let p = view.to_surface(Point::new(100.0, 200.0));
        assert!((p.x - 60.0).abs() < f64::EPSILON);
        assert!((p.y - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_under_zoom_and_pan() {
        let mut view = ViewTransform::new();
        view.zoom = 3.5;
        view.pan = Vec2::new(-42.0, 17.0);
        view.origin = Vec2::new(12.0, 3.0);

        let original = Point::new(123.0, 456.0);
        let back = view.to_surface(view.to_device(original));
        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
    }

    #[test]
    fn test_pinch_ratio_and_clamp() {
        let mut view = ViewTransform::new();
        view.pinch(100.0, 200.0);
        assert!((view.zoom - 2.0).abs() < f64::EPSILON);

        view.pinch(10.0, 1000.0);
        assert!((view.zoom - MAX_ZOOM).abs() < f64::EPSILON);

        view.pinch(1000.0, 1.0);
        assert!((view.zoom - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_gated_on_zoom() {
        let mut view = ViewTransform::new();
        assert!(!view.pan_by(Vec2::new(10.0, 10.0)));
        assert_eq!(view.pan, Vec2::ZERO);

        view.zoom = 2.0;
        assert!(view.pan_by(Vec2::new(10.0, 10.0)));
        assert!((view.pan.x - 10.0).abs() < f64::EPSILON);
    }
}
