//! Background grid painting.

use crate::context::{Composite, DrawContext, scoped};
use chalkgrid_core::GridStyle;
use kurbo::Point;

/// Paint grid lines every `style.size` units over `[0, width] x [0, height]`.
///
/// Lines are one device pixel wide, aliased, and replace the pixels they
/// cover. A sub-pixel `line_width` is expressed as reduced opacity instead of
/// partial coverage, so painting twice gives the same pixels as painting
/// once. The region is not cleared first, and the caller's style and clip are
/// left as they were.
pub fn paint_grid<C>(ctx: &mut C, width: f64, height: f64, style: &GridStyle)
where
    C: DrawContext + ?Sized,
{
    if style.size <= 0.0 || width < 0.0 || height < 0.0 {
        return;
    }

    let coverage = style.line_width.clamp(0.0, 1.0);
    let color = style.color.multiply_alpha(coverage as f32);

    scoped(ctx, |ctx| {
        ctx.set_stroke_color(color);
        ctx.set_line_width(1.0);
        ctx.set_anti_alias(false);
        ctx.set_composite(Composite::Replace);

        // Offset by half a pixel so each line lands on exactly one pixel column/row
        for x in grid_positions(width, style.size) {
            ctx.begin_path();
            ctx.move_to(Point::new(x + 0.5, 0.0));
            ctx.line_to(Point::new(x + 0.5, height));
            ctx.stroke();
        }

        for y in grid_positions(height, style.size) {
            ctx.begin_path();
            ctx.move_to(Point::new(0.0, y + 0.5));
            ctx.line_to(Point::new(width, y + 0.5));
            ctx.stroke();
        }
    });
}

/// Line positions `0, size, 2*size, ...` up to and including `extent`.
fn grid_positions(extent: f64, size: f64) -> impl Iterator<Item = f64> {
    let count = (extent / size).floor() as usize;
    (0..=count).map(move |i| i as f64 * size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use kurbo::Rect;
    use peniko::Color;

    fn style() -> GridStyle {
        GridStyle::default()
    }

    #[test]
    fn test_grid_positions_include_far_edge() {
        let xs: Vec<f64> = grid_positions(60.0, 20.0).collect();
        assert_eq!(xs, vec![0.0, 20.0, 40.0, 60.0]);

        let ys: Vec<f64> = grid_positions(59.0, 20.0).collect();
        assert_eq!(ys, vec![0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_grid_lines_on_pitch() {
        let mut surface = Surface::new(100, 100).unwrap();
        paint_grid(&mut surface, 100.0, 100.0, &style());

        // Vertical line at x=40, horizontal at y=60
        assert!(surface.pixel(40, 7).unwrap()[3] > 0);
        assert!(surface.pixel(13, 60).unwrap()[3] > 0);
        // Between lines stays transparent
        assert_eq!(surface.pixel(10, 10).unwrap()[3], 0);
        assert_eq!(surface.pixel(41, 7).unwrap()[3], 0);
    }

    #[test]
    fn test_grid_color_is_low_contrast() {
        let mut surface = Surface::new(40, 40).unwrap();
        paint_grid(&mut surface, 40.0, 40.0, &style());

        let [r, g, b, a] = surface.pixel(20, 5).unwrap();
        // #2d3748 at half opacity for a 0.5 line width
        assert!(a.abs_diff(128) <= 1);
        assert!(r.abs_diff(0x2d) <= 2 && g.abs_diff(0x37) <= 2 && b.abs_diff(0x48) <= 2);
    }

    #[test]
    fn test_grid_is_idempotent() {
        let mut surface = Surface::new(123, 77).unwrap();
        paint_grid(&mut surface, 123.0, 77.0, &style());
        let once = surface.pixmap().data().to_vec();

        paint_grid(&mut surface, 123.0, 77.0, &style());
        assert_eq!(surface.pixmap().data(), once.as_slice());
    }

    #[test]
    fn test_grid_restores_caller_state() {
        let mut surface = Surface::new(40, 40).unwrap();
        surface.set_stroke_color(Color::from_rgba8(255, 0, 0, 255));
        surface.set_line_width(2.0);

        paint_grid(&mut surface, 40.0, 40.0, &style());
        assert_eq!(surface.save_depth(), 0);

        // The caller's red 2px style is still in effect
        surface.begin_path();
        surface.move_to(Point::new(5.0, 10.0));
        surface.line_to(Point::new(15.0, 10.0));
        surface.stroke();
        let [r, g, _, a] = surface.pixel(10, 10).unwrap();
        assert!(a > 200 && r > 200 && g < 20);
    }

    #[test]
    fn test_grid_respects_clip() {
        let mut surface = Surface::new(100, 100).unwrap();
        surface.begin_path();
        surface.add_circle(Point::new(50.0, 50.0), 15.0);
        surface.clip();

        paint_grid(&mut surface, 100.0, 100.0, &style());

        assert!(surface.pixel(40, 50).unwrap()[3] > 0);
        // Grid line at x=0 lies outside the clip
        assert_eq!(surface.pixel(0, 50).unwrap()[3], 0);

        // Clearing through the clip still works afterwards
        surface.clear_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(surface.pixel(40, 50).unwrap()[3], 0);
    }
}
