use market_scene::OrbitControls;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pointer gesture translated for the orbit controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitInput {
    /// Drag distance in physical pixels.
    Rotate { dx: f32, dy: f32 },
    /// Scroll in wheel lines; positive zooms in.
    Zoom(f32),
}

impl OrbitInput {
    pub fn apply(self, controls: &mut OrbitControls) {
        match self {
            OrbitInput::Rotate { dx, dy } => controls.rotate(dx, dy),
            OrbitInput::Zoom(lines) => controls.zoom(lines),
        }
    }
}

/// Turns raw mouse events into orbit gestures.
#[derive(Debug, Default)]
pub struct CameraController {
    mouse_down: bool,
    last_mouse: Option<(f64, f64)>,
}

impl CameraController {
    /// Creates a new controller with default state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<OrbitInput> {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                if *button == MouseButton::Left {
                    self.set_mouse_down(*state == ElementState::Pressed);
                }
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor((position.x, position.y))
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_mouse = None;
                None
            }
            WindowEvent::MouseWheel { delta, .. } => self.handle_scroll(*delta),
            _ => None,
        }
    }

    /// Handles an event the UI consumed; only left-button releases apply.
    pub fn handle_consumed_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseInput {
            button: MouseButton::Left,
            state: ElementState::Released,
            ..
        } = event
        {
            self.set_mouse_down(false);
        }
    }

    fn set_mouse_down(&mut self, down: bool) {
        self.mouse_down = down;
    }

    /// Emits a rotation while the left button is held.
    fn handle_cursor(&mut self, xy: (f64, f64)) -> Option<OrbitInput> {
        let input = match self.last_mouse {
            Some(last) if self.mouse_down => Some(OrbitInput::Rotate {
                dx: (xy.0 - last.0) as f32,
                dy: (xy.1 - last.1) as f32,
            }),
            _ => None,
        };
        self.last_mouse = Some(xy);
        input
    }

    fn handle_scroll(&mut self, delta: MouseScrollDelta) -> Option<OrbitInput> {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
        };
        (lines != 0.0).then_some(OrbitInput::Zoom(lines))
    }
}
