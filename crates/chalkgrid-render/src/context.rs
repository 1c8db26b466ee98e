//! Drawing context abstraction.

use chalkgrid_core::LineCap;
use kurbo::{Point, Rect};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Cannot allocate a {width}x{height} surface")]
    InvalidSize { width: u32, height: u32 },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// How stroked pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Blend over the existing pixels.
    #[default]
    SourceOver,
    /// Replace covered pixels with the stroke color.
    Replace,
}

/// A 2D immediate-mode drawing context over a raster surface.
///
/// Modeled on the HTML canvas context: a current path, a current style and a
/// stack of saved states. The clip region is part of the saved state, so a
/// `save`/`clip`/`restore` sequence never leaks its clip.
pub trait DrawContext {
    /// Surface width in device pixels.
    fn width(&self) -> u32;

    /// Surface height in device pixels.
    fn height(&self) -> u32;

    /// Push the current style and clip.
    fn save(&mut self);

    /// Pop the last saved style and clip. Unbalanced calls are ignored.
    fn restore(&mut self);

    /// Discard the current path.
    fn begin_path(&mut self);

    fn move_to(&mut self, point: Point);

    fn line_to(&mut self, point: Point);

    /// Add a full circle as a closed subpath.
    fn add_circle(&mut self, center: Point, radius: f64);

    /// Stroke the current path with the current style.
    fn stroke(&mut self);

    /// Intersect the clip region with the current path.
    fn clip(&mut self);

    /// Make every pixel of `rect` inside the clip fully transparent.
    fn clear_rect(&mut self, rect: Rect);

    fn set_stroke_color(&mut self, color: Color);

    fn set_line_width(&mut self, width: f64);

    fn set_line_cap(&mut self, cap: LineCap);

    fn set_anti_alias(&mut self, anti_alias: bool);

    fn set_composite(&mut self, composite: Composite);
}

/// Run `f` between a `save` and a matching `restore`.
pub fn scoped<C, R>(ctx: &mut C, f: impl FnOnce(&mut C) -> R) -> R
where
    C: DrawContext + ?Sized,
{
    ctx.save();
    let result = f(ctx);
    ctx.restore();
    result
}
