//! Core application state and lifecycle.

use crate::board::{Board, BoardResponse};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use chalkgrid_core::{CanvasConfig, HttpTransport, PointerEvent, SyncClient, SyncError};
use kurbo::Point;
use peniko::Color;
use pixels::{Pixels, SurfaceTexture};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

/// Errors that stop the application from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Collector client error: {0}")]
    Sync(#[from] SyncError),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Shown wherever the surface is transparent.
    pub background_color: Color,
    pub canvas: CanvasConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "chalkgrid".to_string(),
            width: 1280,
            height: 800,
            background_color: Color::from_rgba8(0x03, 0x07, 0x12, 255),
            canvas: CanvasConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Events sent to the event loop from other threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A collector request finished.
    SyncReady,
}

/// Runtime state that exists once the window is up.
struct AppState {
    window: Arc<Window>,
    pixels: Pixels<'static>,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    board: Board,
    state: Option<AppState>,
    /// Last cursor position in window coordinates.
    cursor: Point,
    /// Whether key presses go to the question input.
    editing: bool,
}

impl App {
    /// Create the application. Collector results wake the loop via `proxy`.
    pub fn new(config: AppConfig, proxy: EventLoopProxy<AppEvent>) -> Result<Self, AppError> {
        let transport = HttpTransport::new(&config.canvas.collector_url)?;
        let proxy = Mutex::new(proxy);
        let sync = SyncClient::new(Arc::new(transport))
            .with_retry(config.canvas.retry)
            .with_waker(move || {
                if let Ok(proxy) = proxy.lock() {
                    // Loop already closed
                    let _ = proxy.send_event(AppEvent::SyncReady);
                }
            });
        let board = Board::new(&config.canvas, sync);

        Ok(Self {
            config,
            board,
            state: None,
            cursor: Point::ZERO,
            editing: false,
        })
    }

    /// Run the application until the window closes.
    pub fn run(config: AppConfig) -> Result<(), AppError> {
        let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(config, event_loop.create_proxy())?;
        ShortcutRegistry::print_all();
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    fn title(&self) -> String {
        let question = self.board.question();
        let tool = self.board.tool();
        if self.editing {
            format!(
                "{} | Question: {}_ (Enter to send, Esc to cancel)",
                self.config.title,
                question.text()
            )
        } else {
            format!(
                "{} | {} | {}: {}",
                self.config.title,
                question.displayed(),
                tool.name(),
                tool.hint()
            )
        }
    }

    fn update_title(&self) {
        if let Some(state) = &self.state {
            state.window.set_title(&self.title());
        }
    }

    fn request_redraw(&self) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn pointer(&mut self, event: PointerEvent) {
        match self.board.handle_pointer(event) {
            BoardResponse::Idle => {}
            BoardResponse::Redraw => self.request_redraw(),
            // Upload runs detached
            BoardResponse::Captured(_) => {}
        }
    }

    fn key_pressed(&mut self, event: &KeyEvent) {
        match key_action(&event.logical_key, event.text.as_deref(), self.editing) {
            KeyAction::Shortcut(ShortcutAction::SelectTool(tool)) => {
                self.board.select_tool(tool);
            }
            KeyAction::Shortcut(ShortcutAction::EditQuestion) => self.editing = true,
            KeyAction::Shortcut(ShortcutAction::SubmitQuestion) => {
                // Blank input is a silent no-op; otherwise the result arrives as SyncReady
                let _ = self.board.submit_question();
            }
            KeyAction::Shortcut(ShortcutAction::LeaveQuestion) => self.editing = false,
            KeyAction::Shortcut(ShortcutAction::DeleteChar) => self.board.question_mut().pop_char(),
            KeyAction::Type(text) => {
                for c in text.chars() {
                    self.board.question_mut().push_char(c);
                }
            }
            KeyAction::Ignore => return,
        }
        self.update_title();
    }

    fn redraw(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        let Some(surface) = self.board.surface() else {
            return;
        };

        let frame = state.pixels.frame_mut();
        if frame.len() != surface.pixmap().data().len() {
            log::debug!("Skipping frame: buffer and surface sizes differ");
            return;
        }
        composite_over(frame, surface.pixmap().data(), self.config.background_color);

        if let Err(e) = state.pixels.render() {
            log::error!("Failed to present frame: {}", e);
        }
    }
}

/// What a key press does to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyAction {
    Shortcut(ShortcutAction),
    /// Characters for the question input.
    Type(String),
    Ignore,
}

/// Resolve a key press. Keys without a binding type their text while editing.
fn key_action(key: &Key, text: Option<&str>, editing: bool) -> KeyAction {
    let name = match key {
        Key::Named(NamedKey::Enter) => Some("Enter"),
        Key::Named(NamedKey::Escape) => Some("Escape"),
        Key::Named(NamedKey::Backspace) => Some("Backspace"),
        Key::Character(c) => Some(c.as_str()),
        _ => None,
    };
    if let Some(action) = name.and_then(|name| ShortcutRegistry::lookup(name, editing)) {
        return KeyAction::Shortcut(action);
    }
    if !editing {
        return KeyAction::Ignore;
    }

    let typed: String = text
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    if typed.is_empty() {
        KeyAction::Ignore
    } else {
        KeyAction::Type(typed)
    }
}

/// Write premultiplied `src` over an opaque `background` into `frame`.
fn composite_over(frame: &mut [u8], src: &[u8], background: Color) {
    let bg = background.to_rgba8();
    let bg = [bg.r, bg.g, bg.b];
    for (out, px) in frame.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let inv = 255 - u16::from(px[3]);
        for c in 0..3 {
            let under = (u16::from(bg[c]) * inv + 127) / 255;
            out[c] = (u16::from(px[c]) + under).min(255) as u8;
        }
        out[3] = 255;
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        log::info!("Creating window...");
        let window_attrs = Window::default_attributes()
            .with_title(self.title())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        let texture = SurfaceTexture::new(width, height, window.clone());
        let pixels = match Pixels::new(width, height, texture) {
            Ok(pixels) => pixels,
            Err(e) => {
                log::error!("Failed to create pixel buffer: {}", e);
                event_loop.exit();
                return;
            }
        };

        log::info!("Surface size: {}x{}", width, height);
        self.board.resize(width, height);
        self.state = Some(AppState { window, pixels });
        self.request_redraw();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::SyncReady => {
                if self.board.poll_sync() {
                    self.editing = false;
                    self.update_title();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                let pending = self.board.pending_requests();
                if pending > 0 {
                    log::info!("Closing with {} collector request(s) in flight", pending);
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(state) = &mut self.state {
                    if let Err(e) = state.pixels.resize_surface(size.width, size.height) {
                        log::error!("Failed to resize surface: {}", e);
                    }
                    if let Err(e) = state.pixels.resize_buffer(size.width, size.height) {
                        log::error!("Failed to resize buffer: {}", e);
                    }
                }
                self.board.resize(size.width, size.height);
                self.request_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x, position.y);
                self.pointer(PointerEvent::Move {
                    position: self.cursor,
                });
            }

            WindowEvent::CursorLeft { .. } => self.pointer(PointerEvent::Left),

            WindowEvent::MouseInput {
                state: btn_state,
                button: MouseButton::Left,
                ..
            } => {
                let position = self.cursor;
                match btn_state {
                    ElementState::Pressed => self.pointer(PointerEvent::Down { position }),
                    ElementState::Released => self.pointer(PointerEvent::Up { position }),
                }
            }

            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.key_pressed(&event);
            }

            _ => {}
        }
    }
}
