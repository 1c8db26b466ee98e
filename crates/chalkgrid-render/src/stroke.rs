//! Applies pointer segments to a drawing context.

use crate::context::{DrawContext, scoped};
use crate::grid::paint_grid;
use chalkgrid_core::{EraserStyle, GridStyle, InkStyle, StrokeSegment, ToolKind};
use kurbo::{Point, Rect};

/// Renders draw and erase segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrokeRenderer {
    pub ink: InkStyle,
    pub grid: GridStyle,
    pub eraser: EraserStyle,
}

impl StrokeRenderer {
    pub fn new(ink: InkStyle, grid: GridStyle, eraser: EraserStyle) -> Self {
        Self { ink, grid, eraser }
    }

    /// Apply one segment with the given tool.
    pub fn render<C>(&self, ctx: &mut C, segment: StrokeSegment, tool: ToolKind)
    where
        C: DrawContext + ?Sized,
    {
        match tool {
            ToolKind::Draw => self.draw(ctx, segment),
            ToolKind::Erase => {
                if self.eraser.interpolate {
                    for center in stamp_centers(segment, self.eraser.radius / 2.0) {
                        self.erase_at(ctx, center);
                    }
                } else {
                    self.erase_at(ctx, segment.to);
                }
            }
        }
    }

    /// Paint a straight ink segment.
    ///
    /// Consecutive segments share endpoints, so a gesture reads as one
    /// continuous line without keeping a path between calls.
    pub fn draw<C>(&self, ctx: &mut C, segment: StrokeSegment)
    where
        C: DrawContext + ?Sized,
    {
        ctx.set_stroke_color(self.ink.color);
        ctx.set_line_width(self.ink.width);
        ctx.set_line_cap(self.ink.line_cap);
        ctx.begin_path();
        ctx.move_to(segment.from);
        ctx.line_to(segment.to);
        ctx.stroke();
    }

    /// Clear a disk around `center` back to the bare grid.
    pub fn erase_at<C>(&self, ctx: &mut C, center: Point)
    where
        C: DrawContext + ?Sized,
    {
        let radius = self.eraser.radius;
        let bounds = Rect::from_center_size(center, (radius * 2.0, radius * 2.0));

        scoped(ctx, |ctx| {
            ctx.begin_path();
            ctx.add_circle(center, radius);
            ctx.clip();
            ctx.clear_rect(bounds);
        });

        let (width, height) = (f64::from(ctx.width()), f64::from(ctx.height()));
        scoped(ctx, |ctx| {
            ctx.begin_path();
            ctx.add_circle(center, radius);
            ctx.clip();
            paint_grid(ctx, width, height, &self.grid);
        });
    }
}

/// Disk centers along a segment, `spacing` apart, ending exactly at `to`.
///
/// The start point is excluded: it was stamped by the previous segment.
fn stamp_centers(segment: StrokeSegment, spacing: f64) -> Vec<Point> {
    let length = segment.from.distance(segment.to);
    if spacing <= 0.0 || length <= spacing {
        return vec![segment.to];
    }
    let steps = (length / spacing).ceil() as usize;
    (1..=steps)
        .map(|i| segment.from.lerp(segment.to, i as f64 / steps as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use peniko::Color;

    const SIZE: u32 = 120;

    fn gridded() -> Surface {
        let mut surface = Surface::new(SIZE, SIZE).unwrap();
        paint_grid(&mut surface, SIZE as f64, SIZE as f64, &GridStyle::default());
        surface
    }

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> StrokeSegment {
        StrokeSegment {
            from: Point::new(x0, y0),
            to: Point::new(x1, y1),
        }
    }

    fn is_ink(pixel: [u8; 4]) -> bool {
        pixel[3] > 200 && pixel[0] > 200 && pixel[1] > 200 && pixel[2] > 200
    }

    /// Paint a solid ink band over most of the surface.
    fn flood_ink(renderer: &StrokeRenderer, surface: &mut Surface) {
        let wide = StrokeRenderer {
            ink: InkStyle {
                width: 90.0,
                ..renderer.ink
            },
            ..*renderer
        };
        wide.draw(surface, seg(0.0, 60.0, SIZE as f64, 60.0));
    }

    #[test]
    fn test_draw_polyline_is_connected() {
        let renderer = StrokeRenderer::default();
        let mut surface = gridded();
        let points = [
            Point::new(10.0, 10.0),
            Point::new(50.0, 30.0),
            Point::new(90.0, 15.0),
            Point::new(100.0, 100.0),
        ];

        for pair in points.windows(2) {
            renderer.render(
                &mut surface,
                StrokeSegment {
                    from: pair[0],
                    to: pair[1],
                },
                ToolKind::Draw,
            );
        }

        // Sample densely along each leg: every sample is covered by ink
        for pair in points.windows(2) {
            for i in 0..=40 {
                let p = pair[0].lerp(pair[1], i as f64 / 40.0);
                let hit = (-1..=1).any(|dx| {
                    (-1..=1).any(|dy| {
                        let x = (p.x.round() as i64 + dx) as u32;
                        let y = (p.y.round() as i64 + dy) as u32;
                        surface.pixel(x, y).is_some_and(|c| c[3] > 128 && c[0] > 128)
                    })
                });
                assert!(hit, "gap near {:?}", p);
            }
        }
    }

    #[test]
    fn test_draw_leaves_no_clip_or_saved_state() {
        let renderer = StrokeRenderer::default();
        let mut surface = gridded();
        renderer.render(&mut surface, seg(5.0, 5.0, 60.0, 60.0), ToolKind::Erase);
        renderer.render(&mut surface, seg(5.0, 5.0, 60.0, 60.0), ToolKind::Draw);
        assert!(!surface.has_clip());
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn test_erase_restores_grid_inside_disk() {
        let renderer = StrokeRenderer::default();
        let reference = gridded();
        let mut surface = gridded();
        flood_ink(&renderer, &mut surface);

        let center = Point::new(57.0, 63.0);
        renderer.render(&mut surface, seg(0.0, 0.0, 57.0, 63.0), ToolKind::Erase);

        let inner = renderer.eraser.radius - 1.5;
        for y in 0..SIZE {
            for x in 0..SIZE {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if p.distance(center) >= inner {
                    continue;
                }
                let got = surface.pixel(x, y).unwrap();
                let want = reference.pixel(x, y).unwrap();
                for c in 0..4 {
                    assert!(
                        got[c].abs_diff(want[c]) <= 2,
                        "pixel ({x}, {y}): {got:?} != {want:?}"
                    );
                }
                assert!(!is_ink(got));
            }
        }
    }

    #[test]
    fn test_erase_keeps_grid_lines_through_disk() {
        let renderer = StrokeRenderer::default();
        let mut surface = gridded();
        flood_ink(&renderer, &mut surface);

        renderer.erase_at(&mut surface, Point::new(60.0, 60.0));

        // Lines x=60 and y=60 cross the center; x=50 is off-grid
        assert!(surface.pixel(60, 50).unwrap()[3] > 0);
        assert!(surface.pixel(50, 60).unwrap()[3] > 0);
        assert_eq!(surface.pixel(50, 50).unwrap()[3], 0);
    }

    #[test]
    fn test_erase_outside_disk_untouched() {
        let renderer = StrokeRenderer::default();
        let mut surface = gridded();
        flood_ink(&renderer, &mut surface);

        renderer.erase_at(&mut surface, Point::new(60.0, 60.0));

        // Well outside the radius the ink survives
        assert!(is_ink(surface.pixel(10, 60).unwrap()));
        assert!(is_ink(surface.pixel(110, 70).unwrap()));
    }

    #[test]
    fn test_zero_radius_erase_changes_nothing() {
        let renderer = StrokeRenderer {
            eraser: EraserStyle {
                radius: 0.0,
                ..EraserStyle::default()
            },
            ..StrokeRenderer::default()
        };
        let mut surface = gridded();
        flood_ink(&renderer, &mut surface);
        let before = surface.pixmap().data().to_vec();

        renderer.erase_at(&mut surface, Point::new(20.0, 60.0));

        assert_eq!(surface.pixmap().data(), before.as_slice());
        assert!(!surface.has_clip());
    }

    #[test]
    fn test_erase_without_interpolation_leaves_gap() {
        let renderer = StrokeRenderer::default();
        let mut surface = gridded();
        flood_ink(&renderer, &mut surface);

        renderer.render(&mut surface, seg(10.0, 60.0, 110.0, 60.0), ToolKind::Erase);

        // Only the end point is stamped
        assert!(is_ink(surface.pixel(55, 65).unwrap()));
        assert!(!is_ink(surface.pixel(105, 65).unwrap()));
    }

    #[test]
    fn test_erase_with_interpolation_covers_segment() {
        let renderer = StrokeRenderer {
            eraser: EraserStyle {
                interpolate: true,
                ..EraserStyle::default()
            },
            ..StrokeRenderer::default()
        };
        let mut surface = gridded();
        flood_ink(&renderer, &mut surface);

        renderer.render(&mut surface, seg(10.0, 60.0, 110.0, 60.0), ToolKind::Erase);

        for x in (20..=105).step_by(5) {
            assert!(!is_ink(surface.pixel(x, 65).unwrap()), "ink left at x={x}");
        }
    }

    #[test]
    fn test_stamp_centers_spacing() {
        let centers = stamp_centers(seg(0.0, 0.0, 35.0, 0.0), 10.0);
        assert_eq!(centers.len(), 4);
        assert_eq!(centers.last().copied(), Some(Point::new(35.0, 0.0)));
        for pair in centers.windows(2) {
            assert!(pair[0].distance(pair[1]) <= 10.0 + 1e-9);
        }

        let short = stamp_centers(seg(0.0, 0.0, 3.0, 4.0), 10.0);
        assert_eq!(short, vec![Point::new(3.0, 4.0)]);
    }

    #[test]
    fn test_draw_uses_ink_color() {
        let renderer = StrokeRenderer {
            ink: InkStyle {
                color: Color::from_rgba8(255, 0, 0, 255),
                width: 4.0,
                ..InkStyle::default()
            },
            ..StrokeRenderer::default()
        };
        let mut surface = gridded();
        renderer.draw(&mut surface, seg(30.0, 30.0, 50.0, 30.0));

        let [r, g, b, a] = surface.pixel(40, 30).unwrap();
        assert!(a > 240 && r > 240 && g < 10 && b < 10);
    }
}
