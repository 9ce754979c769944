//! Point/shape math used by hit-testing and the composer.
//!
//! Pure functions only; all coordinates are in surface space.

use kurbo::{Point, Rect, Vec2};

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Axis-aligned bounding box of two corner points.
pub fn corner_rect(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Test whether a point lies within the corner bbox inflated by `pad`.
pub fn point_in_rect(point: Point, a: Point, b: Point, pad: f64) -> bool {
    corner_rect(a, b).inflate(pad, pad).contains(point)
}

/// Test whether a point lies within the implicit ellipse whose bounding box
/// is spanned by the two corner points, inflated by `pad`.
///
/// Normalizes to unit-circle space; a hit is squared radial distance ≤ 1.
pub fn point_in_ellipse(point: Point, a: Point, b: Point, pad: f64) -> bool {
    let rect = corner_rect(a, b);
    let rx = rect.width() / 2.0 + pad;
    let ry = rect.height() / 2.0 + pad;
    if rx < f64::EPSILON || ry < f64::EPSILON {
        return false;
    }
    let center = rect.center();
    let dx = (point.x - center.x) / rx;
    let dy = (point.y - center.y) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Compute the two wing points of an arrowhead ending at `end`.
///
/// The wings sit `size` back along the shaft, offset half a head-width to
/// either side of the shaft direction.
pub fn arrow_head(start: Point, end: Point, size: f64) -> (Point, Point) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len = (dx * dx + dy * dy).sqrt();
    let dir = if len < f64::EPSILON {
        Vec2::new(1.0, 0.0)
    } else {
        Vec2::new(dx / len, dy / len)
    };
    let perp = Vec2::new(-dir.y, dir.x);
    let back = Point::new(end.x - dir.x * size, end.y - dir.y * size);
    let left = Point::new(back.x + perp.x * size * 0.5, back.y + perp.y * size * 0.5);
    let right = Point::new(back.x - perp.x * size * 0.5, back.y - perp.y * size * 0.5);
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_dist_perpendicular() {
        let d = point_to_segment_dist(
            Point::new(50.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((d - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segment_dist_beyond_endpoint() {
        let d = point_to_segment_dist(
            Point::new(110.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((d - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segment_dist_degenerate_segment() {
        let d = point_to_segment_dist(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_polyline_dist_picks_nearest() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        let d = point_to_polyline_dist(Point::new(105.0, 50.0), &pts);
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_in_rect_with_padding() {
        let a = Point::new(10.0, 10.0);
        let b = Point::new(110.0, 60.0);
        assert!(point_in_rect(Point::new(60.0, 35.0), a, b, 0.0));
        assert!(point_in_rect(Point::new(115.0, 35.0), a, b, 10.0));
        assert!(!point_in_rect(Point::new(500.0, 500.0), a, b, 10.0));
    }

    #[test]
    fn test_point_in_rect_reversed_corners() {
        // Drag direction must not matter
        let a = Point::new(110.0, 60.0);
        let b = Point::new(10.0, 10.0);
        assert!(point_in_rect(Point::new(60.0, 35.0), a, b, 0.0));
    }

    #[test]
    fn test_point_in_ellipse() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 50.0);
        assert!(point_in_ellipse(Point::new(50.0, 25.0), a, b, 0.0));
        // Corner of the bbox is outside the inscribed ellipse
        assert!(!point_in_ellipse(Point::new(2.0, 2.0), a, b, 0.0));
        assert!(point_in_ellipse(Point::new(100.0, 25.0), a, b, 0.0));
    }

    #[test]
    fn test_arrow_head_symmetric() {
        let (left, right) = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 15.0);
        assert!((left.x - 85.0).abs() < f64::EPSILON);
        assert!((right.x - 85.0).abs() < f64::EPSILON);
        assert!((left.y + right.y).abs() < f64::EPSILON);
        assert!((left.y - 7.5).abs() < f64::EPSILON);
    }
}
