//! chalkgrid Render Library
//!
//! Drawing-context abstraction and a tiny-skia raster implementation,
//! plus the grid, stroke and viewport logic that draws on it.

mod context;
mod grid;
mod stroke;
mod surface;
mod viewport;

pub use context::{Composite, DrawContext, RenderResult, RendererError, scoped};
pub use grid::paint_grid;
pub use stroke::StrokeRenderer;
pub use surface::Surface;
pub use viewport::ViewportManager;
