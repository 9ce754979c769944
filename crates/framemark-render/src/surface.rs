//! RGBA8 pixel surface with source-over blending.

use framemark_core::geometry::point_to_segment_dist;
use kurbo::Point;
use peniko::Color;

/// An owned RGBA8 pixel buffer, row-major, non-premultiplied.
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major.
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    /// Flood the surface with an opaque color (used for frame backdrops).
    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgba.r, rgba.g, rgba.b, rgba.a]);
        }
    }

    /// Source-over blend a single pixel. Out-of-bounds coordinates are
    /// silently dropped so callers can paint clipped shapes freely.
    pub fn blend(&mut self, x: i64, y: i64, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let sa = rgba[3] as f32 / 255.0;
        if sa <= 0.0 {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let dst = &mut self.pixels[idx..idx + 4];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let s = rgba[c] as f32;
            let d = dst[c] as f32;
            dst[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round() as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Stroke a line segment with round caps and a one-pixel antialiased
    /// edge, by coverage testing every pixel in the inflated bbox.
    pub fn stroke_segment(&mut self, a: Point, b: Point, width: f64, rgba: [u8; 4]) {
        let half = (width / 2.0).max(0.5);
        let pad = half + 1.0;
        let x0 = (a.x.min(b.x) - pad).floor() as i64;
        let x1 = (a.x.max(b.x) + pad).ceil() as i64;
        let y0 = (a.y.min(b.y) - pad).floor() as i64;
        let y1 = (a.y.max(b.y) + pad).ceil() as i64;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let dist = point_to_segment_dist(p, a, b);
                let coverage = (half + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let alpha = (rgba[3] as f64 * coverage).round() as u8;
                    self.blend(x, y, [rgba[0], rgba[1], rgba[2], alpha]);
                }
            }
        }
    }

    /// Fill a filled disc (used for single-sample freehand dots).
    pub fn fill_disc(&mut self, center: Point, radius: f64, rgba: [u8; 4]) {
        self.stroke_segment(center, center, radius * 2.0, rgba);
    }

    /// Fill an axis-aligned rectangle given by two corner points.
    pub fn fill_rect(&mut self, a: Point, b: Point, rgba: [u8; 4]) {
        let x0 = a.x.min(b.x).floor() as i64;
        let x1 = a.x.max(b.x).ceil() as i64;
        let y0 = a.y.min(b.y).floor() as i64;
        let y1 = a.y.max(b.y).ceil() as i64;
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, rgba);
            }
        }
    }

    /// The pixel at (x, y), for inspection.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = Surface::new(4, 4);
        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(surface.data().len(), 64);
    }

    #[test]
    fn test_blend_opaque_overwrites() {
        let mut surface = Surface::new(4, 4);
        surface.blend(1, 1, [255, 0, 0, 255]);
        assert_eq!(surface.pixel(1, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn test_blend_out_of_bounds_dropped() {
        let mut surface = Surface::new(4, 4);
        surface.blend(-1, 0, [255, 0, 0, 255]);
        surface.blend(0, 99, [255, 0, 0, 255]);
        assert!(surface.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_translucent_over_opaque_mixes() {
        let mut surface = Surface::new(2, 2);
        surface.blend(0, 0, [0, 0, 255, 255]);
        surface.blend(0, 0, [255, 255, 0, 128]);
        let px = surface.pixel(0, 0);
        assert_eq!(px[3], 255);
        assert!(px[0] > 100 && px[0] < 160);
        assert!(px[2] > 100 && px[2] < 160);
    }

    #[test]
    fn test_stroke_segment_covers_center() {
        let mut surface = Surface::new(20, 20);
        surface.stroke_segment(Point::new(2.0, 10.0), Point::new(18.0, 10.0), 4.0, [0, 0, 0, 255]);
        assert_eq!(surface.pixel(10, 10)[3], 255);
        assert_eq!(surface.pixel(10, 2)[3], 0);
    }

    #[test]
    fn test_fill_rect() {
        let mut surface = Surface::new(10, 10);
        surface.fill_rect(Point::new(2.0, 2.0), Point::new(8.0, 8.0), [0, 255, 0, 255]);
        assert_eq!(surface.pixel(5, 5), [0, 255, 0, 255]);
        assert_eq!(surface.pixel(0, 0)[3], 0);
    }
}
