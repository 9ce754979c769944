//! CPU composer: paints a document to a pixel surface and flattens it to PNG.

use crate::surface::Surface;
use ab_glyph::{point as glyph_point, Font, FontRef, PxScale, ScaleFont};
use framemark_core::document::Document;
use framemark_core::element::{Element, ElementKind};
use framemark_core::geometry;
use framemark_core::camera::ViewTransform;
use kurbo::Point;
use thiserror::Error;

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Text size in surface units; scales with zoom at paint time.
const TEXT_SIZE: f64 = 24.0;
/// Opacity applied to highlight fills, out of 255.
const HIGHLIGHT_ALPHA: f64 = 0.35;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Embedded font failed to load")]
    Font,
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("Surface dimensions cannot be zero")]
    EmptySurface,
}

/// Paints committed elements (and the in-progress preview) into pixels.
///
/// Screen paint applies the view transform so the painted image and
/// `ViewTransform::to_surface` stay exact inverses; flatten paints at
/// identity with no preview, producing exactly the committed, visible
/// content.
pub struct Composer {
    font: FontRef<'static>,
}

impl Composer {
    pub fn new() -> Result<Self, ComposeError> {
        let font = FontRef::try_from_slice(DEJAVU_SANS).map_err(|_| ComposeError::Font)?;
        Ok(Self { font })
    }

    /// Paint the document for on-screen display: visible layers in paint
    /// order, then the uncommitted preview on top of everything.
    pub fn paint(
        &self,
        surface: &mut Surface,
        document: &Document,
        preview: Option<&Element>,
        view: &ViewTransform,
    ) {
        for element in document.visible_paint_order() {
            self.paint_element(surface, element, view);
        }
        if let Some(element) = preview {
            self.paint_element(surface, element, view);
        }
    }

    /// Flatten the committed, visible content to PNG bytes at identity
    /// transform. Zoom/pan never leak into the saved image.
    pub fn flatten(
        &self,
        document: &Document,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ComposeError> {
        if width == 0 || height == 0 {
            return Err(ComposeError::EmptySurface);
        }
        let mut surface = Surface::new(width, height);
        let identity = ViewTransform::new();
        self.paint(&mut surface, document, None, &identity);
        log::debug!("flattened {} element(s) to {width}x{height}", document.len());
        encode_png(surface.data(), width, height)
    }

    fn paint_element(&self, surface: &mut Surface, element: &Element, view: &ViewTransform) {
        let rgba = [
            element.color.r,
            element.color.g,
            element.color.b,
            element.color.a,
        ];
        let width = element.stroke_width * view.zoom;
        match element.kind {
            ElementKind::Freehand => {
                if element.points.len() < 2 {
                    surface.fill_disc(view.to_device(element.anchor()), width / 2.0, rgba);
                    return;
                }
                for pair in element.points.windows(2) {
                    surface.stroke_segment(
                        view.to_device(pair[0]),
                        view.to_device(pair[1]),
                        width,
                        rgba,
                    );
                }
            }
            ElementKind::Rectangle => {
                let rect = geometry::corner_rect(element.anchor(), element.end());
                let corners = [
                    view.to_device(Point::new(rect.x0, rect.y0)),
                    view.to_device(Point::new(rect.x1, rect.y0)),
                    view.to_device(Point::new(rect.x1, rect.y1)),
                    view.to_device(Point::new(rect.x0, rect.y1)),
                ];
                for i in 0..4 {
                    surface.stroke_segment(corners[i], corners[(i + 1) % 4], width, rgba);
                }
            }
            ElementKind::Ellipse => {
                let rect = geometry::corner_rect(element.anchor(), element.end());
                let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
                let center = rect.center();
                let steps = ((rx + ry) * view.zoom).clamp(24.0, 256.0) as usize;
                let mut prev = None;
                for i in 0..=steps {
                    let t = (i as f64 / steps as f64) * std::f64::consts::TAU;
                    let p = view.to_device(Point::new(
                        center.x + rx * t.cos(),
                        center.y + ry * t.sin(),
                    ));
                    if let Some(prev) = prev {
                        surface.stroke_segment(prev, p, width, rgba);
                    }
                    prev = Some(p);
                }
            }
            ElementKind::Arrow => {
                let start = view.to_device(element.anchor());
                let end = view.to_device(element.end());
                surface.stroke_segment(start, end, width, rgba);
                let head = (width * 4.0).max(12.0);
                let (left, right) = geometry::arrow_head(start, end, head);
                surface.stroke_segment(end, left, width, rgba);
                surface.stroke_segment(end, right, width, rgba);
            }
            ElementKind::Highlight => {
                let alpha = (element.color.a as f64 * HIGHLIGHT_ALPHA).round() as u8;
                let a = view.to_device(element.anchor());
                let b = view.to_device(element.end());
                surface.fill_rect(a, b, [rgba[0], rgba[1], rgba[2], alpha]);
                // Thin border at full opacity to keep the extent readable
                let corners = [
                    a,
                    Point::new(b.x, a.y),
                    b,
                    Point::new(a.x, b.y),
                ];
                let border = view.zoom.max(1.0);
                for i in 0..4 {
                    surface.stroke_segment(corners[i], corners[(i + 1) % 4], border, rgba);
                }
            }
            ElementKind::Text => {
                if let Some(text) = element.text.as_deref() {
                    let origin = view.to_device(element.anchor());
                    self.paint_text(surface, text, origin, TEXT_SIZE * view.zoom, rgba);
                }
            }
        }
    }

    fn paint_text(
        &self,
        surface: &mut Surface,
        text: &str,
        origin: Point,
        size: f64,
        rgba: [u8; 4],
    ) {
        let scale = PxScale::from(size as f32);
        let scaled = self.font.as_scaled(scale);
        let mut caret = origin.x as f32;
        let baseline = origin.y as f32 + scaled.ascent();
        let mut prev = None;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let mut glyph = scaled.scaled_glyph(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, glyph.id);
            }
            glyph.position = glyph_point(caret, baseline);
            prev = Some(glyph.id);
            caret += scaled.h_advance(glyph.id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    let alpha = (rgba[3] as f32 * coverage).round() as u8;
                    surface.blend(
                        bounds.min.x as i64 + x as i64,
                        bounds.min.y as i64 + y as i64,
                        [rgba[0], rgba[1], rgba[2], alpha],
                    );
                });
            }
        }
    }
}

fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ComposeError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}
