//! Canvas configuration and drawing styles.

use peniko::Color;
use std::time::Duration;

/// Grid pitch in device pixels.
pub const GRID_SIZE: f64 = 20.0;

/// Radius of the erase disk in device pixels.
pub const ERASE_RADIUS: f64 = 20.0;

/// Collector authority used when none is configured.
pub const DEFAULT_COLLECTOR_URL: &str = "http://localhost:8080";

/// Question shown before the first successful update.
pub const DEFAULT_QUESTION: &str = "What is in this image?";

/// Line cap for ink strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

/// Background grid appearance.
#[derive(Debug, Clone, Copy)]
pub struct GridStyle {
    /// Distance between grid lines.
    pub size: f64,
    pub color: Color,
    pub line_width: f64,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            color: Color::from_rgba8(0x2d, 0x37, 0x48, 255),
            line_width: 0.5,
        }
    }
}

/// Ink appearance for the draw tool.
#[derive(Debug, Clone, Copy)]
pub struct InkStyle {
    pub color: Color,
    pub width: f64,
    pub line_cap: LineCap,
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgba8(255, 255, 255, 255),
            width: 2.0,
            line_cap: LineCap::Round,
        }
    }
}

/// Erase tool parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraserStyle {
    pub radius: f64,
    /// Stamp extra disks along each segment so fast strokes leave no gaps.
    pub interpolate: bool,
}

impl Default for EraserStyle {
    fn default() -> Self {
        Self {
            radius: ERASE_RADIUS,
            interpolate: false,
        }
    }
}

/// How often a failed upload is attempted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never less than one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Up to `max_attempts` attempts with exponential backoff.
    pub fn exponential(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Configuration for the drawing surface and its collector.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub grid: GridStyle,
    pub ink: InkStyle,
    pub eraser: EraserStyle,
    /// Whether the pointer leaving the surface ends the interaction.
    pub end_on_leave: bool,
    /// Base URL of the collector.
    pub collector_url: String,
    pub retry: RetryPolicy,
    pub initial_question: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid: GridStyle::default(),
            ink: InkStyle::default(),
            eraser: EraserStyle::default(),
            end_on_leave: false,
            collector_url: DEFAULT_COLLECTOR_URL.to_string(),
            retry: RetryPolicy::none(),
            initial_question: DEFAULT_QUESTION.to_string(),
        }
    }
}

impl CanvasConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collector base URL.
    pub fn with_collector_url(mut self, url: impl Into<String>) -> Self {
        self.collector_url = url.into();
        self
    }

    /// Set whether leaving the surface ends the interaction.
    pub fn with_end_on_leave(mut self, end_on_leave: bool) -> Self {
        self.end_on_leave = end_on_leave;
        self
    }

    /// Enable or disable disk stamping along erase segments.
    pub fn with_erase_interpolation(mut self, interpolate: bool) -> Self {
        self.eraser.interpolate = interpolate;
        self
    }

    /// Set the upload retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the question shown before the first update.
    pub fn with_initial_question(mut self, question: impl Into<String>) -> Self {
        self.initial_question = question.into();
        self
    }

    pub fn with_grid(mut self, grid: GridStyle) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_ink(mut self, ink: InkStyle) -> Self {
        self.ink = ink;
        self
    }
}
