/// Orbit camera parameters and their mutators
use nalgebra::{Point3, Vector3};

use crate::config::RenderConfig;

/// Rotation (radians), zoom distance and pan offset of the view.
///
/// Pure data. Whoever mutates it is responsible for telling the transform
/// pipeline its matrices are stale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub zoom: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    initial_zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl CameraState {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            zoom: config.initial_zoom.clamp(config.min_zoom, config.max_zoom),
            offset_x: 0.0,
            offset_y: 0.0,
            initial_zoom: config.initial_zoom,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    /// Camera position: `zoom` units in front of the target along +Z.
    pub fn eye(&self) -> Point3<f32> {
        Point3::new(self.offset_x, self.offset_y, self.zoom)
    }

    /// Point the camera looks at, on the Z = 0 plane.
    pub fn target(&self) -> Point3<f32> {
        Point3::new(self.offset_x, self.offset_y, 0.0)
    }

    pub fn up(&self) -> Vector3<f32> {
        Vector3::y()
    }

    /// Orbit by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.rotation_x += dx;
        self.rotation_y += dy;
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Move the eye toward the target by `amount` (negative moves away),
    /// clamped to the configured zoom range.
    pub fn zoom(&mut self, amount: f32) {
        self.zoom = (self.zoom - amount).clamp(self.min_zoom, self.max_zoom);
    }

    pub fn reset(&mut self) {
        self.rotation_x = 0.0;
        self.rotation_y = 0.0;
        self.zoom = self.initial_zoom.clamp(self.min_zoom, self.max_zoom);
        self.offset_x = 0.0;
        self.offset_y = 0.0;
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = CameraState::default();
        assert_eq!(camera.zoom, 5.0);
        assert_eq!(camera.eye(), Point3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.target(), Point3::origin());
    }

    #[test]
    fn test_rotate_and_pan() {
        let mut camera = CameraState::default();
        camera.rotate(0.1, 0.2);
        camera.pan(1.0, -2.0);
        assert!((camera.rotation_x - 0.1).abs() < 1e-6);
        assert!((camera.rotation_y - 0.2).abs() < 1e-6);
        assert_eq!(camera.target(), Point3::new(1.0, -2.0, 0.0));
        assert_eq!(camera.eye(), Point3::new(1.0, -2.0, 5.0));
    }

    #[test]
    fn test_zoom_clamps_at_minimum() {
        let mut camera = CameraState::default();
        camera.zoom(100.0);
        assert_eq!(camera.zoom, 0.5);

        camera.zoom(1.0);
        camera.zoom(0.25);
        assert_eq!(camera.zoom, 0.5);
    }

    #[test]
    fn test_zoom_clamps_at_maximum() {
        let mut camera = CameraState::default();
        camera.zoom(-1000.0);
        assert_eq!(camera.zoom, 200.0);
    }

    #[test]
    fn test_reset() {
        let mut camera = CameraState::default();
        camera.rotate(1.0, 1.0);
        camera.pan(3.0, 3.0);
        camera.zoom(2.0);
        camera.reset();
        assert_eq!(camera, CameraState::default());
    }
}
