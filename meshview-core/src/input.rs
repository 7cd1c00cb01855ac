//! Pointer and keyboard input mapped onto the renderer's camera controls.
//!
//! Front ends translate their native events into these calls; nothing here
//! depends on a windowing or terminal library.

use crate::config::RenderConfig;
use crate::renderer::{MeshRenderer, MOVE_STEP, ZOOM_STEP};

/// Mouse drag orbiting and wheel zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitController {
    dragging: bool,
    last_position: (f32, f32),
    rotation_factor: f32,
    wheel_factor: f32,
}

impl OrbitController {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            dragging: false,
            last_position: (0.0, 0.0),
            rotation_factor: config.drag_rotation_factor,
            wheel_factor: config.wheel_zoom_factor,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn mouse_down(&mut self, x: f32, y: f32) {
        self.dragging = true;
        self.last_position = (x, y);
    }

    /// Rotate by the distance moved since the last event while dragging.
    ///
    /// Horizontal motion turns the model around Y, vertical motion around X.
    /// Returns whether the camera changed.
    pub fn mouse_move(&mut self, x: f32, y: f32, renderer: &mut MeshRenderer) -> bool {
        if !self.dragging {
            return false;
        }

        let dx = x - self.last_position.0;
        let dy = y - self.last_position.1;
        self.last_position = (x, y);

        renderer.rotate(dy * self.rotation_factor, dx * self.rotation_factor);
        true
    }

    pub fn mouse_up(&mut self) {
        self.dragging = false;
    }

    /// Zoom proportionally to the current distance; positive `delta` zooms in.
    pub fn wheel(&mut self, delta: f32, renderer: &mut MeshRenderer) {
        let amount = delta * self.wheel_factor * renderer.camera().zoom;
        renderer.zoom(amount);
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

/// Discrete keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    ZoomIn,
    ZoomOut,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Reset,
}

impl KeyAction {
    pub fn apply(self, renderer: &mut MeshRenderer) {
        match self {
            KeyAction::ZoomIn => renderer.zoom_in(ZOOM_STEP),
            KeyAction::ZoomOut => renderer.zoom_out(ZOOM_STEP),
            KeyAction::MoveUp => renderer.move_up(MOVE_STEP),
            KeyAction::MoveDown => renderer.move_down(MOVE_STEP),
            KeyAction::MoveLeft => renderer.move_left(MOVE_STEP),
            KeyAction::MoveRight => renderer.move_right(MOVE_STEP),
            KeyAction::Reset => renderer.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;

    #[test]
    fn test_drag_rotates() {
        let mut renderer = MeshRenderer::default();
        let mut orbit = OrbitController::default();

        assert!(!orbit.mouse_move(10.0, 10.0, &mut renderer));
        orbit.mouse_down(100.0, 50.0);
        assert!(orbit.mouse_move(110.0, 30.0, &mut renderer));

        let camera = renderer.camera();
        assert!((camera.rotation_y - 0.1).abs() < 1e-6);
        assert!((camera.rotation_x + 0.2).abs() < 1e-6);

        orbit.mouse_up();
        assert!(!orbit.is_dragging());
        assert!(!orbit.mouse_move(500.0, 500.0, &mut renderer));
        assert!((renderer.camera().rotation_y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_is_relative_to_zoom() {
        let mut renderer = MeshRenderer::default();
        let mut orbit = OrbitController::default();

        // 120 * 0.001 * 5.0
        orbit.wheel(120.0, &mut renderer);
        assert!((renderer.camera().zoom - 4.4).abs() < 1e-5);

        orbit.wheel(-120.0, &mut renderer);
        assert!(renderer.camera().zoom > 4.4);
    }

    #[test]
    fn test_key_actions() {
        let mut renderer = MeshRenderer::default();
        KeyAction::MoveLeft.apply(&mut renderer);
        KeyAction::MoveUp.apply(&mut renderer);
        KeyAction::ZoomIn.apply(&mut renderer);

        let camera = *renderer.camera();
        assert!((camera.offset_x - 0.2).abs() < 1e-6);
        assert!((camera.offset_y - 0.2).abs() < 1e-6);
        assert!((camera.zoom - 4.5).abs() < 1e-6);

        KeyAction::Reset.apply(&mut renderer);
        assert_eq!(*renderer.camera(), CameraState::default());
    }
}
