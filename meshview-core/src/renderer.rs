//! Frame orchestration and the inbound control surface.
//!
//! [`MeshRenderer`] owns the camera, the transform pipeline and the
//! rasterizer. Camera mutations only mark the pipeline dirty; matrices are
//! rebuilt on the next [`render`](MeshRenderer::render).

use log::{debug, error};

use crate::camera::CameraState;
use crate::config::RenderConfig;
use crate::error::RenderResult;
use crate::mesh::Mesh;
use crate::projection::Viewport;
use crate::raster::{FrameStats, Rasterizer};
use crate::surface::{validate_surface, DrawScope, PixelSurface};
use crate::transform::TransformPipeline;

/// Pan distance of one keyboard step.
pub const MOVE_STEP: f32 = 0.2;
/// Zoom distance of one keyboard step.
pub const ZOOM_STEP: f32 = 0.5;

/// Software renderer for one view of one mesh.
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    config: RenderConfig,
    camera: CameraState,
    pipeline: TransformPipeline,
    rasterizer: Rasterizer,
    last_stats: FrameStats,
}

impl MeshRenderer {
    pub fn new(config: RenderConfig) -> Self {
        // Real dimensions are adopted from the surface on the first frame
        let viewport = Viewport::new(0, 0);
        Self {
            camera: CameraState::new(&config),
            pipeline: TransformPipeline::new(&config, viewport),
            rasterizer: Rasterizer::new(&config, viewport),
            last_stats: FrameStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Statistics of the last completed frame.
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Draw `mesh` into `surface`.
    ///
    /// A failing frame is logged and abandoned; the surface keeps whatever
    /// was drawn before the failure and its draw lock is always released.
    pub fn render<S: PixelSurface + ?Sized>(&mut self, mesh: &Mesh, surface: &mut S) -> Option<FrameStats> {
        match self.try_render(mesh, surface) {
            Ok(stats) => Some(stats),
            Err(e) => {
                error!("Frame abandoned: {}", e);
                None
            }
        }
    }

    /// [`render`](Self::render) without the error swallowing.
    pub fn try_render<S: PixelSurface + ?Sized>(
        &mut self,
        mesh: &Mesh,
        surface: &mut S,
    ) -> RenderResult<FrameStats> {
        let viewport = validate_surface(surface)?;
        self.pipeline.set_viewport(viewport);
        self.rasterizer.resize(viewport);

        let mut frame = DrawScope::begin(surface)?;
        frame.clear(self.config.background);

        if mesh.is_empty() {
            self.rasterizer.clear_depth();
            self.last_stats = FrameStats::default();
            return Ok(self.last_stats);
        }

        let vertices = self.pipeline.transform(mesh, &self.camera);
        let target = self.camera.target().coords;
        let stats = self
            .rasterizer
            .draw(&mesh.faces, vertices, &target, &mut *frame)?;

        debug!(
            "Frame {}x{}: {} faces, {} triangles, {} rasterized, {} backface, {} frustum, {} unprojected, {} out of range, {} pixels",
            viewport.width,
            viewport.height,
            stats.faces,
            stats.triangles,
            stats.rasterized,
            stats.backface_culled,
            stats.frustum_culled,
            stats.unprojected,
            stats.out_of_range,
            stats.pixels_written
        );

        self.last_stats = stats;
        Ok(stats)
    }

    /// A different mesh will be drawn next; recompute its normalization.
    pub fn mesh_changed(&mut self) {
        self.pipeline.mesh_changed();
    }

    /// Force a matrix rebuild on the next frame.
    pub fn mark_dirty(&mut self) {
        self.pipeline.mark_dirty();
    }

    /// Orbit by `dx` around X and `dy` around Y, in radians.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.camera.rotate(dx, dy);
        self.pipeline.mark_dirty();
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.camera.pan(dx, dy);
        self.pipeline.mark_dirty();
    }

    /// Positive `amount` moves the eye closer.
    pub fn zoom(&mut self, amount: f32) {
        self.camera.zoom(amount);
        self.pipeline.mark_dirty();
    }

    pub fn reset(&mut self) {
        self.camera.reset();
        self.pipeline.mark_dirty();
    }

    pub fn zoom_in(&mut self, amount: f32) {
        self.zoom(amount);
    }

    pub fn zoom_out(&mut self, amount: f32) {
        self.zoom(-amount);
    }

    pub fn move_up(&mut self, amount: f32) {
        self.pan(0.0, amount);
    }

    pub fn move_down(&mut self, amount: f32) {
        self.pan(0.0, -amount);
    }

    // Horizontal moves are mirrored: left increases offset_x
    pub fn move_left(&mut self, amount: f32) {
        self.pan(amount, 0.0);
    }

    pub fn move_right(&mut self, amount: f32) {
        self.pan(-amount, 0.0);
    }
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}
