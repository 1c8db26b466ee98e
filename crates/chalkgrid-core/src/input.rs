//! Pointer tracking for press-move-release gestures on the surface.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Pointer event in client (window) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the surface bounds.
    Left,
}

/// Map a client-space position to surface-local coordinates.
///
/// `bounds` is the surface's bounding box in client space. When no surface
/// is mounted the origin is returned instead of an error.
pub fn to_surface_point(client: Point, bounds: Option<Rect>) -> Point {
    match bounds {
        Some(rect) => Point::new(client.x - rect.x0, client.y - rect.y0),
        None => Point::ZERO,
    }
}

/// Whether a gesture is in progress, and where it last was.
///
/// The last point is present exactly when the interaction is active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    last_point: Option<Point>,
}

impl InteractionState {
    /// Create an idle state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    fn begin(&mut self, point: Point) {
        self.last_point = Some(point);
    }

    /// Move to `point`, returning the previous point if active.
    fn advance(&mut self, point: Point) -> Option<Point> {
        let previous = self.last_point?;
        self.last_point = Some(point);
        Some(previous)
    }

    fn end(&mut self) {
        self.last_point = None;
    }
}

/// A segment between two consecutive pointer positions, in surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub from: Point,
    pub to: Point,
}

/// What the caller must do after a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerAction {
    /// Nothing to render.
    None,
    /// Render one segment with the active tool.
    Stroke(StrokeSegment),
    /// The interaction ended; capture the surface.
    Ended,
}

/// Converts pointer events into interaction state transitions.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    state: InteractionState,
    /// Whether leaving the surface ends the interaction.
    pub end_on_leave: bool,
}

impl PointerTracker {
    /// Create a tracker. Leaving the surface does not end a gesture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether leaving the surface ends the interaction.
    pub fn with_end_on_leave(mut self, end_on_leave: bool) -> Self {
        self.end_on_leave = end_on_leave;
        self
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Process a pointer event. `bounds` is the surface bounding box.
    pub fn handle_event(&mut self, event: PointerEvent, bounds: Option<Rect>) -> TrackerAction {
        match event {
            PointerEvent::Down { position } => {
                self.begin(to_surface_point(position, bounds));
                TrackerAction::None
            }
            PointerEvent::Move { position } => {
                match self.advance(to_surface_point(position, bounds)) {
                    Some(segment) => TrackerAction::Stroke(segment),
                    None => TrackerAction::None,
                }
            }
            PointerEvent::Up { .. } => {
                self.end();
                TrackerAction::Ended
            }
            PointerEvent::Left => {
                if self.end_on_leave {
                    self.end();
                    TrackerAction::Ended
                } else {
                    TrackerAction::None
                }
            }
        }
    }

    /// Start an interaction at a surface point.
    pub fn begin(&mut self, point: Point) {
        self.state.begin(point);
    }

    /// Advance an interaction. Returns `None` when idle.
    pub fn advance(&mut self, point: Point) -> Option<StrokeSegment> {
        let from = self.state.advance(point)?;
        Some(StrokeSegment { from, to: point })
    }

    /// End the interaction, active or not.
    pub fn end(&mut self) {
        self.state.end();
    }
}
