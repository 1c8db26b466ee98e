//! Raster surface backed by a tiny-skia pixmap.

use crate::context::{Composite, DrawContext, RenderResult, RendererError};
use chalkgrid_core::{LineCap, RasterSnapshot};
use kurbo::{Point, Rect};
use peniko::Color;
use tiny_skia::{BlendMode, FillRule, Mask, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Style and clip that `save`/`restore` operate on.
#[derive(Clone)]
struct ContextState {
    stroke_color: tiny_skia::Color,
    line_width: f32,
    line_cap: tiny_skia::LineCap,
    anti_alias: bool,
    composite: Composite,
    clip: Option<Mask>,
}

impl Default for ContextState {
    // Canvas defaults: opaque black, 1px, butt caps, no clip.
    fn default() -> Self {
        Self {
            stroke_color: tiny_skia::Color::BLACK,
            line_width: 1.0,
            line_cap: tiny_skia::LineCap::Butt,
            anti_alias: true,
            composite: Composite::SourceOver,
            clip: None,
        }
    }
}

/// A fully transparent RGBA pixel buffer with a canvas-style context.
pub struct Surface {
    pixmap: Pixmap,
    state: ContextState,
    stack: Vec<ContextState>,
    path: PathBuilder,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RendererError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            state: ContextState::default(),
            stack: Vec::new(),
            path: PathBuilder::new(),
        })
    }

    /// The underlying pixmap (premultiplied RGBA).
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Number of saved states.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether a clip region is currently active.
    pub fn has_clip(&self) -> bool {
        self.state.clip.is_some()
    }

    /// Copy the pixels into an owned, straight-alpha snapshot.
    pub fn snapshot(&self) -> RasterSnapshot {
        let mut rgba = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RasterSnapshot::new(self.pixmap.width(), self.pixmap.height(), rgba)
    }

    fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.state.stroke_color);
        paint.anti_alias = self.state.anti_alias;
        paint.blend_mode = match self.state.composite {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::Replace => BlendMode::Source,
        };
        paint
    }
}

fn to_skia_color(color: Color) -> tiny_skia::Color {
    let rgba = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

impl DrawContext for Surface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn begin_path(&mut self) {
        self.path = PathBuilder::new();
    }

    fn move_to(&mut self, point: Point) {
        self.path.move_to(point.x as f32, point.y as f32);
    }

    fn line_to(&mut self, point: Point) {
        self.path.line_to(point.x as f32, point.y as f32);
    }

    fn add_circle(&mut self, center: Point, radius: f64) {
        // A degenerate circle encloses no area
        if !(radius.is_finite() && radius > 0.0) {
            return;
        }
        self.path.push_circle(center.x as f32, center.y as f32, radius as f32);
    }

    fn stroke(&mut self) {
        // A lone move_to or empty path has nothing to stroke
        let Some(path) = self.path.clone().finish() else {
            return;
        };
        let stroke = Stroke {
            width: self.state.line_width,
            line_cap: self.state.line_cap,
            ..Stroke::default()
        };
        let paint = self.paint();
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            Transform::identity(),
            self.state.clip.as_ref(),
        );
    }

    fn clip(&mut self) {
        let Some(path) = self.path.clone().finish() else {
            // An empty path clips everything away
            if let Some(mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) {
                self.state.clip = Some(mask);
            }
            return;
        };
        match &mut self.state.clip {
            Some(mask) => {
                mask.intersect_path(&path, FillRule::Winding, true, Transform::identity());
            }
            None => {
                let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
                    return;
                };
                mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
                self.state.clip = Some(mask);
            }
        }
    }

    fn clear_rect(&mut self, rect: Rect) {
        let Some(rect) = tiny_skia::Rect::from_ltrb(
            rect.x0 as f32,
            rect.y0 as f32,
            rect.x1 as f32,
            rect.y1 as f32,
        ) else {
            return;
        };
        let paint = Paint {
            blend_mode: BlendMode::Clear,
            anti_alias: false,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), self.state.clip.as_ref());
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = to_skia_color(color);
    }

    fn set_line_width(&mut self, width: f64) {
        // Canvas ignores non-positive and non-finite widths
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width as f32;
        }
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        };
    }

    fn set_anti_alias(&mut self, anti_alias: bool) {
        self.state.anti_alias = anti_alias;
    }

    fn set_composite(&mut self, composite: Composite) {
        self.state.composite = composite;
    }
}
