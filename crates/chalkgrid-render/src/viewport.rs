//! Keeps the surface sized to its window.

use crate::context::DrawContext;
use crate::grid::paint_grid;
use crate::surface::Surface;
use chalkgrid_core::{GridStyle, InkStyle};
use kurbo::{Point, Rect, Size};

/// Owns the drawing surface and rebuilds it on every resize.
pub struct ViewportManager {
    surface: Option<Surface>,
    /// Surface top-left corner in client coordinates.
    origin: Point,
    grid: GridStyle,
    ink: InkStyle,
}

impl ViewportManager {
    /// Create a manager with no surface yet.
    pub fn new(grid: GridStyle, ink: InkStyle) -> Self {
        Self {
            surface: None,
            origin: Point::ZERO,
            grid,
            ink,
        }
    }

    /// Replace the surface with a fresh, gridded one of the given size.
    ///
    /// Runs in full even when the size is unchanged. Zero sizes (minimized
    /// windows) are ignored and keep the current surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }

        let mut surface = match Surface::new(width, height) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to resize surface: {}", e);
                return;
            }
        };

        paint_grid(&mut surface, f64::from(width), f64::from(height), &self.grid);
        self.reset_style(&mut surface);

        log::debug!("Surface resized to {}x{}", width, height);
        self.surface = Some(surface);
    }

    /// Apply the default ink style to a fresh context.
    fn reset_style(&self, surface: &mut Surface) {
        surface.set_stroke_color(self.ink.color);
        surface.set_line_width(self.ink.width);
        surface.set_line_cap(self.ink.line_cap);
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }

    /// Current surface size, if one exists.
    pub fn size(&self) -> Option<Size> {
        self.surface
            .as_ref()
            .map(|s| Size::new(f64::from(s.width()), f64::from(s.height())))
    }

    /// Surface bounding box in client coordinates.
    pub fn bounds(&self) -> Option<Rect> {
        self.size().map(|size| Rect::from_origin_size(self.origin, size))
    }

    /// Move the surface within the client area.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }
}
