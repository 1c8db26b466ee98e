//! chalkgrid Core Library
//!
//! Platform-agnostic data structures for the chalkgrid drawing surface:
//! tool selection, pointer tracking, the question label, surface snapshots
//! and the collector client.

pub mod capture;
pub mod config;
pub mod input;
pub mod label;
pub mod sync;
pub mod tools;

pub use capture::{CaptureError, RasterSnapshot, encode_png};
pub use config::{CanvasConfig, EraserStyle, GridStyle, InkStyle, LineCap, RetryPolicy};
pub use input::{InteractionState, PointerEvent, PointerTracker, StrokeSegment, TrackerAction};
pub use label::{QuestionInput, QuestionLabel};
pub use sync::{HttpTransport, MemoryTransport, SyncClient, SyncError, SyncEvent, Transport};
pub use tools::{ToolKind, ToolManager};
