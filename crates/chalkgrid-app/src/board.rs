//! Application state tying the surface, input and collector together.

use chalkgrid_core::{
    CanvasConfig, InteractionState, PointerEvent, PointerTracker, QuestionInput, QuestionLabel,
    SyncClient, SyncEvent, ToolKind, ToolManager, TrackerAction,
};
use chalkgrid_render::{StrokeRenderer, Surface, ViewportManager};
use kurbo::Point;
use std::thread::JoinHandle;

/// What the shell should do after a pointer event.
#[derive(Debug)]
pub enum BoardResponse {
    /// Nothing changed.
    Idle,
    /// The surface changed and should be presented.
    Redraw,
    /// The interaction ended and a snapshot upload was started.
    ///
    /// Dropping the handle detaches the upload.
    Captured(JoinHandle<()>),
}

/// The drawing board: surface, active tool, gesture and question state.
///
/// All mutation happens on the caller's thread. Network work is handed to
/// the [`SyncClient`] and its results are applied in [`Board::poll_sync`].
pub struct Board {
    viewport: ViewportManager,
    tracker: PointerTracker,
    tools: ToolManager,
    renderer: StrokeRenderer,
    question: QuestionInput,
    sync: SyncClient,
}

impl Board {
    /// Create a board. No surface exists until the first [`Board::resize`].
    pub fn new(config: &CanvasConfig, sync: SyncClient) -> Self {
        let displayed = QuestionLabel::parse(&config.initial_question).unwrap_or_default();
        Self {
            viewport: ViewportManager::new(config.grid, config.ink),
            tracker: PointerTracker::new().with_end_on_leave(config.end_on_leave),
            tools: ToolManager::new(),
            renderer: StrokeRenderer::new(config.ink, config.grid, config.eraser),
            question: QuestionInput::new(displayed),
            sync,
        }
    }

    /// Match the surface to the window size, clearing it to the grid.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    /// Place the surface within the window.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.viewport.set_origin(origin);
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.viewport.surface()
    }

    pub fn interaction(&self) -> &InteractionState {
        self.tracker.state()
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    /// Select a tool. Returns `true` if it changed.
    pub fn select_tool(&mut self, tool: ToolKind) -> bool {
        self.tools.set_tool(tool)
    }

    pub fn question(&self) -> &QuestionInput {
        &self.question
    }

    pub fn question_mut(&mut self) -> &mut QuestionInput {
        &mut self.question
    }

    /// Number of collector requests still running.
    pub fn pending_requests(&self) -> usize {
        self.sync.in_flight()
    }

    /// Process a pointer event in client coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> BoardResponse {
        match self.tracker.handle_event(event, self.viewport.bounds()) {
            TrackerAction::None => BoardResponse::Idle,
            TrackerAction::Stroke(segment) => {
                let tool = self.tools.current_tool();
                match self.viewport.surface_mut() {
                    Some(surface) => {
                        self.renderer.render(surface, segment, tool);
                        BoardResponse::Redraw
                    }
                    None => BoardResponse::Idle,
                }
            }
            TrackerAction::Ended => match self.capture() {
                Some(handle) => BoardResponse::Captured(handle),
                None => BoardResponse::Idle,
            },
        }
    }

    /// Snapshot the surface and upload it without waiting.
    fn capture(&self) -> Option<JoinHandle<()>> {
        let surface = self.viewport.surface()?;
        Some(self.sync.upload_snapshot(surface.snapshot()))
    }

    /// Send the typed question if it is not blank.
    ///
    /// The displayed label and the input only change once the collector
    /// accepts the update, see [`Board::poll_sync`].
    pub fn submit_question(&mut self) -> Option<JoinHandle<()>> {
        let label = self.question.submission()?;
        Some(self.sync.submit_question(label))
    }

    /// Apply finished collector requests. Returns `true` if the displayed
    /// label changed.
    pub fn poll_sync(&mut self) -> bool {
        let mut label_changed = false;
        for event in self.sync.poll_events() {
            match event {
                SyncEvent::QuestionAccepted { question } => {
                    self.question.accept(question);
                    label_changed = true;
                }
                SyncEvent::ImageUploaded { bytes } => {
                    log::debug!("Snapshot delivered ({} bytes)", bytes);
                }
                // Already logged by the worker; local state is left as is
                SyncEvent::ImageFailed { .. } | SyncEvent::QuestionRejected { .. } => {}
            }
        }
        label_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chalkgrid_core::MemoryTransport;
    use std::sync::Arc;

    fn board() -> (Board, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let sync = SyncClient::new(transport.clone());
        let mut board = Board::new(&CanvasConfig::default(), sync);
        board.resize(80, 60);
        (board, transport)
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
        }
    }

    fn pixels(board: &Board) -> Vec<u8> {
        board.surface().unwrap().pixmap().data().to_vec()
    }

    fn finish(response: BoardResponse) {
        match response {
            BoardResponse::Captured(handle) => handle.join().unwrap(),
            other => panic!("expected a capture, got {:?}", other),
        }
    }

    #[test]
    fn test_move_without_press_draws_nothing() {
        let (mut board, _) = board();
        let before = pixels(&board);
        assert!(matches!(board.handle_pointer(moved(10.0, 10.0)), BoardResponse::Idle));
        assert_eq!(pixels(&board), before);
    }

    #[test]
    fn test_gesture_draws_and_uploads() {
        let (mut board, transport) = board();
        let before = pixels(&board);

        board.handle_pointer(down(10.0, 10.0));
        assert!(board.interaction().is_active());
        assert!(matches!(board.handle_pointer(moved(40.0, 30.0)), BoardResponse::Redraw));
        assert_ne!(pixels(&board), before);

        finish(board.handle_pointer(up(40.0, 30.0)));
        assert!(!board.interaction().is_active());
        assert_eq!(transport.images().len(), 1);

        board.poll_sync();
        assert_eq!(board.pending_requests(), 0);
    }

    #[test]
    fn test_pointer_mapped_through_origin() {
        let (mut board, _) = board();
        board.set_surface_origin(Point::new(100.0, 100.0));

        board.handle_pointer(down(110.0, 110.0));
        assert_eq!(board.interaction().last_point(), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_upload_failure_leaves_state() {
        let (mut board, transport) = board();
        transport.set_failing(true);

        board.handle_pointer(down(10.0, 10.0));
        board.handle_pointer(moved(50.0, 40.0));
        let drawn = pixels(&board);

        finish(board.handle_pointer(up(50.0, 40.0)));
        assert!(!board.poll_sync());

        assert_eq!(pixels(&board), drawn);
        assert_eq!(*board.interaction(), InteractionState::new());
        assert_eq!(transport.attempts(), 1);
    }

    #[test]
    fn test_upload_encodes_stable_snapshot() {
        let (mut board, transport) = board();
        board.handle_pointer(down(10.0, 10.0));
        board.handle_pointer(moved(50.0, 40.0));
        let response = board.handle_pointer(up(50.0, 40.0));

        // Resizing while the upload runs does not affect it
        board.resize(20, 20);
        finish(response);

        let png = &transport.images()[0];
        // IHDR width and height follow the 8-byte signature and chunk header
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        assert_eq!((width, height), (80, 60));
    }

    #[test]
    fn test_leave_does_not_end_by_default() {
        let (mut board, transport) = board();
        board.handle_pointer(down(10.0, 10.0));
        assert!(matches!(board.handle_pointer(PointerEvent::Left), BoardResponse::Idle));
        assert!(board.interaction().is_active());
        assert!(transport.images().is_empty());
    }

    #[test]
    fn test_leave_ends_when_configured() {
        let transport = Arc::new(MemoryTransport::new());
        let config = CanvasConfig::default().with_end_on_leave(true);
        let mut board = Board::new(&config, SyncClient::new(transport.clone()));
        board.resize(40, 40);

        board.handle_pointer(down(10.0, 10.0));
        finish(board.handle_pointer(PointerEvent::Left));
        assert!(!board.interaction().is_active());
        assert_eq!(transport.images().len(), 1);
    }

    #[test]
    fn test_release_without_surface_is_quiet() {
        let transport = Arc::new(MemoryTransport::new());
        let mut board = Board::new(&CanvasConfig::default(), SyncClient::new(transport.clone()));

        board.handle_pointer(down(1.0, 1.0));
        assert!(matches!(board.handle_pointer(moved(5.0, 5.0)), BoardResponse::Idle));
        assert!(matches!(board.handle_pointer(up(5.0, 5.0)), BoardResponse::Idle));
        assert_eq!(transport.attempts(), 0);
    }

    #[test]
    fn test_tool_only_changes_explicitly() {
        let (mut board, _) = board();
        assert_eq!(board.tool(), ToolKind::Draw);
        board.handle_pointer(down(1.0, 1.0));
        board.handle_pointer(moved(5.0, 5.0));
        assert_eq!(board.tool(), ToolKind::Draw);

        assert!(board.select_tool(ToolKind::Erase));
        assert!(!board.select_tool(ToolKind::Erase));
        assert_eq!(board.tool(), ToolKind::Erase);
    }

    #[test]
    fn test_erase_gesture_restores_grid() {
        let (mut board, _) = board();
        let clean = pixels(&board);

        board.handle_pointer(down(30.0, 30.0));
        board.handle_pointer(moved(34.0, 30.0));
        assert_ne!(pixels(&board), clean);

        board.select_tool(ToolKind::Erase);
        board.handle_pointer(moved(32.0, 30.0));

        let surface = board.surface().unwrap();
        let mut fresh = ViewportManager::new(Default::default(), Default::default());
        fresh.resize(80, 60);
        let reference = fresh.surface().unwrap();

        // The disk edge is anti-aliased; compare well inside it
        let center = Point::new(32.0, 30.0);
        for y in 10..50 {
            for x in 12..52 {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if p.distance(center) < 18.0 {
                    assert_eq!(surface.pixel(x, y), reference.pixel(x, y), "pixel ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_blank_question_is_not_sent() {
        let (mut board, transport) = board();
        board.question_mut().set_text("   ");

        assert!(board.submit_question().is_none());
        assert!(!board.poll_sync());
        assert_eq!(transport.attempts(), 0);
        assert_eq!(board.question().text(), "   ");
        assert_eq!(board.question().displayed().as_str(), "What is in this image?");
    }

    #[test]
    fn test_question_accepted_updates_label() {
        let (mut board, transport) = board();
        board.question_mut().set_text("  What is recursion?  ");

        board.submit_question().unwrap().join().unwrap();
        // Not applied until polled
        assert_eq!(board.question().text(), "  What is recursion?  ");

        assert!(board.poll_sync());
        assert_eq!(transport.questions(), vec!["What is recursion?".to_string()]);
        assert_eq!(board.question().displayed().as_str(), "What is recursion?");
        assert_eq!(board.question().text(), "");
    }

    #[test]
    fn test_question_rejected_keeps_input() {
        let (mut board, transport) = board();
        transport.set_failing(true);
        board.question_mut().set_text("Why?");

        board.submit_question().unwrap().join().unwrap();
        assert!(!board.poll_sync());
        assert_eq!(board.question().text(), "Why?");
        assert_eq!(board.question().displayed().as_str(), "What is in this image?");
    }
}
