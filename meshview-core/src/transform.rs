//! Model / view / projection matrices and the per-frame vertex transform.
//!
//! The pipeline keeps its matrices until something marks them dirty, then
//! rebuilds all three on the next [`TransformPipeline::transform`].

use log::debug;
use nalgebra::{Matrix4, Vector3, Vector4};
use rayon::prelude::*;

use crate::camera::CameraState;
use crate::config::RenderConfig;
use crate::mesh::{Aabb, Mesh};
use crate::projection::{project_to_screen, ScreenPoint, Viewport};

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation about X, then about Y
    pub fn rotation_matrix(rotation_x: f32, rotation_y: f32) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation_x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation_y, 0.0));
        ry * rx
    }

    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    pub fn scale_matrix(scale: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(scale)
    }

    /// Rotation · Scale · Translate(-center)
    pub fn model_matrix(camera: &CameraState, normalization: &ModelNormalization) -> Matrix4<f32> {
        Self::rotation_matrix(camera.rotation_x, camera.rotation_y)
            * Self::scale_matrix(normalization.scale)
            * Self::translation_matrix(&-normalization.center)
    }

    pub fn view_matrix(camera: &CameraState) -> Matrix4<f32> {
        Matrix4::look_at_rh(&camera.eye(), &camera.target(), &camera.up())
    }

    /// Symmetric perspective with depth mapped to [-1, 1] after the divide.
    pub fn projection_matrix(config: &RenderConfig, aspect: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect, config.field_of_view, config.near_plane, config.far_plane)
    }
}

/// Centering and uniform scale that bring any mesh to a comparable size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelNormalization {
    pub center: Vector3<f32>,
    pub scale: f32,
}

impl ModelNormalization {
    pub fn identity() -> Self {
        Self {
            center: Vector3::zeros(),
            scale: 1.0,
        }
    }

    /// `normalization_factor / diagonal`, clamped to the configured range.
    /// A zero diagonal (single point) ends up at the upper clamp.
    pub fn from_bounds(bounds: &Aabb, config: &RenderConfig) -> Self {
        let scale = (config.normalization_factor / bounds.diagonal())
            .clamp(config.min_model_scale, config.max_model_scale);
        Self {
            center: bounds.center(),
            scale,
        }
    }
}

impl Default for ModelNormalization {
    fn default() -> Self {
        Self::identity()
    }
}

/// One transformed mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexData {
    pub world: Vector3<f32>,
    pub view: Vector3<f32>,
    /// Homogeneous clip position, before the perspective divide.
    pub clip: Vector4<f32>,
    /// `None` when the vertex could not be projected.
    pub screen: Option<ScreenPoint>,
    /// `clip.z / clip.w`; infinite when `screen` is `None`.
    pub depth: f32,
}

impl Default for VertexData {
    fn default() -> Self {
        Self {
            world: Vector3::zeros(),
            view: Vector3::zeros(),
            clip: Vector4::zeros(),
            screen: None,
            depth: f32::INFINITY,
        }
    }
}

/// Everything one vertex transform reads. Copied into each worker.
#[derive(Debug, Clone, Copy)]
struct VertexStage {
    model: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    viewport: Viewport,
    depth_threshold: f32,
    ndc_bound: f32,
}

impl VertexStage {
    #[inline]
    fn apply(&self, vertex: &Vector4<f32>) -> VertexData {
        let world = self.model * vertex;
        let view = self.view * world;
        let clip = self.projection * view;

        let (screen, depth) =
            match project_to_screen(&clip, self.viewport, self.depth_threshold, self.ndc_bound) {
                Some((point, depth)) => (Some(point), depth),
                None => (None, f32::INFINITY),
            };

        VertexData {
            world: world.xyz(),
            view: view.xyz(),
            clip,
            screen,
            depth,
        }
    }
}

/// Lazily rebuilt matrices plus the transformed-vertex buffer.
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    config: RenderConfig,
    viewport: Viewport,
    model: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    normalization: ModelNormalization,
    /// Vertex count the normalization was computed for.
    normalized_for: Option<usize>,
    dirty: bool,
    vertices: Vec<VertexData>,
}

impl TransformPipeline {
    pub fn new(config: &RenderConfig, viewport: Viewport) -> Self {
        Self {
            config: config.clone(),
            viewport,
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            normalization: ModelNormalization::identity(),
            normalized_for: None,
            dirty: true,
            vertices: Vec::new(),
        }
    }

    /// Rebuild matrices before the next transform.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forget the normalization so the next frame recomputes it.
    pub fn mesh_changed(&mut self) {
        self.normalized_for = None;
        self.dirty = true;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.dirty = true;
        }
    }

    pub fn normalization(&self) -> ModelNormalization {
        self.normalization
    }

    pub fn model_matrix(&self) -> &Matrix4<f32> {
        &self.model
    }

    pub fn view_matrix(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection
    }

    /// Output of the last [`transform`](Self::transform), one slot per mesh vertex.
    pub fn vertices(&self) -> &[VertexData] {
        &self.vertices
    }

    /// Recompute bounds when the vertex count differs from the last computation.
    pub fn update_normalization(&mut self, mesh: &Mesh) {
        let count = mesh.vertices.len();
        if self.normalized_for == Some(count) {
            return;
        }

        self.normalization = match mesh.bounding_box() {
            Some(bounds) => ModelNormalization::from_bounds(&bounds, &self.config),
            None => ModelNormalization::identity(),
        };
        self.normalized_for = Some(count);
        self.dirty = true;

        debug!(
            "Model normalization for {} vertices: center {:?}, scale {}",
            count,
            self.normalization.center.as_slice(),
            self.normalization.scale
        );
    }

    pub fn update_matrices_if_needed(&mut self, camera: &CameraState) {
        if !self.dirty {
            return;
        }

        self.model = Transform::model_matrix(camera, &self.normalization);
        self.view = Transform::view_matrix(camera);
        self.projection =
            Transform::projection_matrix(&self.config, self.viewport.aspect(self.config.pixel_aspect));
        self.dirty = false;
    }

    /// Transform every mesh vertex into [`VertexData`].
    ///
    /// Each output slot depends only on its own input vertex, so large meshes
    /// are split across the rayon pool.
    pub fn transform(&mut self, mesh: &Mesh, camera: &CameraState) -> &[VertexData] {
        self.update_normalization(mesh);
        self.update_matrices_if_needed(camera);

        let stage = VertexStage {
            model: self.model,
            view: self.view,
            projection: self.projection,
            viewport: self.viewport,
            depth_threshold: self.config.depth_division_threshold,
            ndc_bound: self.config.ndc_bound,
        };

        self.vertices.clear();
        self.vertices.resize(mesh.vertices.len(), VertexData::default());

        if mesh.vertices.len() > self.config.parallel_vertex_threshold {
            self.vertices
                .par_iter_mut()
                .zip(mesh.vertices.par_iter())
                .for_each(|(slot, vertex)| *slot = stage.apply(vertex));
        } else {
            for (slot, vertex) in self.vertices.iter_mut().zip(&mesh.vertices) {
                *slot = stage.apply(vertex);
            }
        }

        &self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(0.0, 0.0);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_order() {
        // X first: +Y goes to +Z, then Y rotation takes +Z to +X
        let half_pi = std::f32::consts::FRAC_PI_2;
        let m = Transform::rotation_matrix(half_pi, half_pi);
        let p = m * Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert!(approx(p.x, 1.0) && approx(p.y, 0.0) && approx(p.z, 0.0));
    }

    #[test]
    fn test_normalization() {
        let config = RenderConfig::default();
        let mut mesh = Mesh::cube(4.0);
        for v in &mut mesh.vertices {
            v.x += 10.0;
        }
        let bounds = mesh.bounding_box().unwrap();
        let n = ModelNormalization::from_bounds(&bounds, &config);
        assert!(approx(n.center.x, 10.0));
        assert!(approx(n.scale, 2.0 / 48.0f32.sqrt()));
    }

    #[test]
    fn test_normalization_clamped() {
        let config = RenderConfig::default();
        let point = Aabb {
            min: Vector3::new(1.0, 1.0, 1.0),
            max: Vector3::new(1.0, 1.0, 1.0),
        };
        assert_eq!(ModelNormalization::from_bounds(&point, &config).scale, 100.0);

        let huge = Aabb {
            min: Vector3::new(-1e6, 0.0, 0.0),
            max: Vector3::new(1e6, 0.0, 0.0),
        };
        assert_eq!(ModelNormalization::from_bounds(&huge, &config).scale, 0.001);
    }

    #[test]
    fn test_model_matrix_centers_mesh() {
        let camera = CameraState::default();
        let normalization = ModelNormalization {
            center: Vector3::new(5.0, 5.0, 5.0),
            scale: 0.5,
        };
        let m = Transform::model_matrix(&camera, &normalization);
        let p = m * Vector4::new(7.0, 5.0, 5.0, 1.0);
        assert!(approx(p.x, 1.0) && approx(p.y, 0.0) && approx(p.z, 0.0));
    }

    #[test]
    fn test_center_vertex_projects_to_screen_center() {
        let config = RenderConfig::default();
        let mut pipeline = TransformPipeline::new(&config, Viewport::new(200, 100));
        let camera = CameraState::default();
        let mesh = Mesh::cube(2.0);

        let mut with_center = mesh.clone();
        with_center.add_vertex(Vector4::new(0.0, 0.0, 0.0, 1.0));
        let out = pipeline.transform(&with_center, &camera);

        assert_eq!(out.len(), 9);
        let center = out[8];
        assert_eq!(center.screen, Some(ScreenPoint::new(100, 50)));
        assert!(center.depth > -1.0 && center.depth < 1.0);
        assert!(approx(center.view.z, -5.0));
    }

    #[test]
    fn test_nearer_vertex_has_smaller_depth() {
        let config = RenderConfig::default();
        let mut pipeline = TransformPipeline::new(&config, Viewport::new(100, 100));
        let camera = CameraState::default();
        let mut mesh = Mesh::cube(2.0);
        mesh.add_vertex(Vector4::new(0.0, 0.0, 0.0, 1.0));

        let out = pipeline.transform(&mesh, &camera);
        // vertex 6 is (+,+,+), the corner nearest the eye
        assert!(out[6].depth < out[8].depth);
        assert!(out[0].depth > out[8].depth);
    }

    #[test]
    fn test_matrices_rebuilt_lazily() {
        let config = RenderConfig::default();
        let mut pipeline = TransformPipeline::new(&config, Viewport::new(100, 100));
        let mut camera = CameraState::default();
        let mesh = Mesh::cube(2.0);

        pipeline.transform(&mesh, &camera);
        assert!(!pipeline.is_dirty());
        let view = *pipeline.view_matrix();

        // Mutation without notification keeps the cached matrices
        camera.pan(1.0, 0.0);
        pipeline.transform(&mesh, &camera);
        assert_eq!(*pipeline.view_matrix(), view);

        pipeline.mark_dirty();
        pipeline.transform(&mesh, &camera);
        assert_ne!(*pipeline.view_matrix(), view);
    }

    #[test]
    fn test_normalization_follows_vertex_count() {
        let config = RenderConfig::default();
        let mut pipeline = TransformPipeline::new(&config, Viewport::new(100, 100));
        let camera = CameraState::default();
        let mut mesh = Mesh::cube(2.0);

        pipeline.transform(&mesh, &camera);
        let first = pipeline.normalization();

        mesh.add_vertex(Vector4::new(10.0, 0.0, 0.0, 1.0));
        pipeline.transform(&mesh, &camera);
        assert_ne!(pipeline.normalization(), first);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut config = RenderConfig::default();
        let mut mesh = Mesh::new();
        for i in 0..64 {
            let t = i as f32 * 0.1;
            mesh.add_vertex(Vector4::new(t.sin(), t.cos(), t * 0.05, 1.0));
        }
        let mut camera = CameraState::default();
        camera.rotate(0.3, -0.7);

        config.parallel_vertex_threshold = usize::MAX;
        let mut sequential = TransformPipeline::new(&config, Viewport::new(64, 48));
        let expected = sequential.transform(&mesh, &camera).to_vec();

        config.parallel_vertex_threshold = 0;
        let mut parallel = TransformPipeline::new(&config, Viewport::new(64, 48));
        assert_eq!(parallel.transform(&mesh, &camera), expected.as_slice());
    }
}
