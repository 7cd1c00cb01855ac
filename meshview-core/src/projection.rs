/// Clip-space to screen-space mapping
use nalgebra::Vector4;

/// Integer pixel position, origin top-left, Y down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Output raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Projection aspect ratio, corrected for non-square output pixels.
    pub fn aspect(&self, pixel_aspect: f32) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 * pixel_aspect / self.height as f32
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Map a clip-space position to a pixel and its normalized depth.
///
/// Returns `None` when `|clip.w|` is below `depth_threshold` (on the eye
/// plane) or when the projected point lies beyond `ndc_bound` on either
/// axis. The bound is usually above 1 so that triangles crossing the screen
/// edge keep their vertices. Accepted points are clamped into the viewport.
pub fn project_to_screen(
    clip: &Vector4<f32>,
    viewport: Viewport,
    depth_threshold: f32,
    ndc_bound: f32,
) -> Option<(ScreenPoint, f32)> {
    // Prevent division by near-zero depth values
    if clip.w.abs() < depth_threshold {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    if ndc_x < -ndc_bound || ndc_x > ndc_bound || ndc_y < -ndc_bound || ndc_y > ndc_bound {
        return None;
    }

    let half_width = viewport.width as f32 * 0.5;
    let half_height = viewport.height as f32 * 0.5;
    let max_x = viewport.width as i32 - 1;
    let max_y = viewport.height as i32 - 1;

    // NDC up is screen down
    let x = ((ndc_x + 1.0) * half_width) as i32;
    let y = ((1.0 - ndc_y) * half_height) as i32;

    Some((ScreenPoint::new(x.min(max_x).max(0), y.min(max_y).max(0)), depth))
}
