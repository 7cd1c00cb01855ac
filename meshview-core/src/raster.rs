//! Triangle setup and depth-buffered scan conversion.
//!
//! Faces are fan-triangulated and every triangle goes through, in order:
//! index bounds check, projected-vertex check, coarse frustum rejection,
//! backface culling, flat shading. Survivors are scan-converted with edge
//! functions against a per-pixel depth buffer.
//!
//! Setup only reads shared data and runs per face. Scan conversion is split
//! into horizontal bands of the frame; each band owns its rows of the depth
//! and color buffers, so bands never touch the same pixel.

use nalgebra::{Vector3, Vector4};
use rayon::prelude::*;

use crate::config::RenderConfig;
use crate::error::RenderResult;
use crate::mesh::{fan_triangles, Face};
use crate::projection::Viewport;
use crate::surface::{gray, validate_surface, PixelSurface, BYTES_PER_PIXEL};
use crate::transform::VertexData;

/// Edge-function area below which a triangle counts as degenerate.
const AREA_EPSILON: f32 = 1e-6;

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    pub triangles: usize,
    /// A corner referenced a vertex that does not exist.
    pub out_of_range: usize,
    /// A corner could not be projected to the screen.
    pub unprojected: usize,
    pub frustum_culled: usize,
    pub backface_culled: usize,
    /// Triangles handed to scan conversion.
    pub rasterized: usize,
    /// Depth-test passes, i.e. color writes.
    pub pixels_written: usize,
}

impl FrameStats {
    fn absorb(&mut self, other: &Self) {
        self.faces += other.faces;
        self.triangles += other.triangles;
        self.out_of_range += other.out_of_range;
        self.unprojected += other.unprojected;
        self.frustum_culled += other.frustum_culled;
        self.backface_culled += other.backface_culled;
        self.rasterized += other.rasterized;
        self.pixels_written += other.pixels_written;
    }
}

/// Screen-space triangle ready for scan conversion.
#[derive(Debug, Clone, Copy)]
struct ShadedTriangle {
    points: [(f32, f32); 3],
    depths: [f32; 3],
    color: u32,
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

/// Shading and scheduling inputs, copied out of the config.
#[derive(Debug, Clone, Copy)]
struct Shading {
    light: Vector3<f32>,
    ambient: f32,
    degenerate: f32,
}

/// Depth-buffered triangle rasterizer.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    viewport: Viewport,
    depth: Vec<f32>,
    shading: Shading,
    parallel_face_threshold: usize,
    band_height: usize,
}

impl Rasterizer {
    pub fn new(config: &RenderConfig, viewport: Viewport) -> Self {
        let [lx, ly, lz] = config.light_direction;
        let light = Vector3::new(lx, ly, lz)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z);

        Self {
            viewport,
            depth: vec![f32::INFINITY; viewport.pixel_count()],
            shading: Shading {
                light,
                ambient: config.ambient_intensity,
                degenerate: config.degenerate_intensity,
            },
            parallel_face_threshold: config.parallel_face_threshold,
            band_height: config.band_height.max(1),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.depth = vec![f32::INFINITY; viewport.pixel_count()];
        }
    }

    /// Depth buffer of the last frame, row-major.
    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth
    }

    /// Reset every depth to +infinity.
    pub fn clear_depth(&mut self) {
        self.depth.fill(f32::INFINITY);
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        self.depth.get(y * self.viewport.width + x).copied()
    }

    /// Rasterize `faces` into `surface`.
    ///
    /// `vertices` is the transform output for the same mesh; `target` is the
    /// camera's look-at point, used as the reference for backface culling.
    /// The depth buffer is reset first; the surface is not cleared.
    pub fn draw<S: PixelSurface + ?Sized>(
        &mut self,
        faces: &[Face],
        vertices: &[VertexData],
        target: &Vector3<f32>,
        surface: &mut S,
    ) -> RenderResult<FrameStats> {
        let viewport = validate_surface(surface)?;
        self.resize(viewport);
        self.clear_depth();

        let parallel = faces.len() > self.parallel_face_threshold;
        let (triangles, mut stats) = self.setup(faces, vertices, target, parallel);

        let width = viewport.width;
        let stride = surface.stride();
        let color = &mut surface.pixels_mut()[..viewport.height * stride];
        let depth = &mut self.depth[..];

        stats.pixels_written = if parallel && viewport.height > self.band_height {
            let rows = self.band_height;
            depth
                .par_chunks_mut(rows * width)
                .zip(color.par_chunks_mut(rows * stride))
                .enumerate()
                .map(|(band, (depth, color))| {
                    rasterize_band(&triangles, depth, color, band * rows, width, stride)
                })
                .sum()
        } else {
            rasterize_band(&triangles, depth, color, 0, width, stride)
        };

        Ok(stats)
    }

    fn setup(
        &self,
        faces: &[Face],
        vertices: &[VertexData],
        target: &Vector3<f32>,
        parallel: bool,
    ) -> (Vec<ShadedTriangle>, FrameStats) {
        let per_face = |face: &Face| {
            let mut stats = FrameStats::default();
            let triangles = setup_face(face, vertices, target, &self.shading, &mut stats);
            (triangles, stats)
        };

        let setups: Vec<(Vec<ShadedTriangle>, FrameStats)> = if parallel {
            faces.par_iter().map(per_face).collect()
        } else {
            faces.iter().map(per_face).collect()
        };

        let mut stats = FrameStats::default();
        let mut triangles = Vec::with_capacity(setups.iter().map(|(t, _)| t.len()).sum());
        for (face_triangles, face_stats) in setups {
            triangles.extend(face_triangles);
            stats.absorb(&face_stats);
        }
        (triangles, stats)
    }
}

/// Fan-triangulate one face and keep the triangles that survive culling.
fn setup_face(
    face: &Face,
    vertices: &[VertexData],
    target: &Vector3<f32>,
    shading: &Shading,
    stats: &mut FrameStats,
) -> Vec<ShadedTriangle> {
    stats.faces += 1;
    let mut triangles = Vec::new();

    for [a, b, c] in fan_triangles(face.len()) {
        stats.triangles += 1;

        let count = vertices.len();
        let slots = (
            face[a].vertex_slot(count),
            face[b].vertex_slot(count),
            face[c].vertex_slot(count),
        );
        let (Some(a), Some(b), Some(c)) = slots else {
            stats.out_of_range += 1;
            continue;
        };
        let corners = [&vertices[a], &vertices[b], &vertices[c]];

        let (Some(s0), Some(s1), Some(s2)) = (corners[0].screen, corners[1].screen, corners[2].screen)
        else {
            stats.unprojected += 1;
            continue;
        };

        if outside_frustum([&corners[0].clip, &corners[1].clip, &corners[2].clip]) {
            stats.frustum_culled += 1;
            continue;
        }

        if !faces_target(&corners, target) {
            stats.backface_culled += 1;
            continue;
        }

        let intensity = flat_intensity(&corners, shading);
        let level = (intensity.clamp(0.0, 1.0) * 255.0).round() as u8;

        // Screen points are clamped into the viewport, so these are >= 0
        let min_x = s0.x.min(s1.x).min(s2.x).max(0) as usize;
        let max_x = s0.x.max(s1.x).max(s2.x).max(0) as usize;
        let min_y = s0.y.min(s1.y).min(s2.y).max(0) as usize;
        let max_y = s0.y.max(s1.y).max(s2.y).max(0) as usize;

        triangles.push(ShadedTriangle {
            points: [
                (s0.x as f32, s0.y as f32),
                (s1.x as f32, s1.y as f32),
                (s2.x as f32, s2.y as f32),
            ],
            depths: [corners[0].depth, corners[1].depth, corners[2].depth],
            color: gray(level),
            min_x,
            max_x,
            min_y,
            max_y,
        });
        stats.rasterized += 1;
    }

    triangles
}

/// True when all three vertices lie outside the same clip plane.
fn outside_frustum(clips: [&Vector4<f32>; 3]) -> bool {
    let planes: [fn(&Vector4<f32>) -> bool; 6] = [
        |c| c.x < -c.w,
        |c| c.x > c.w,
        |c| c.y < -c.w,
        |c| c.y > c.w,
        |c| c.z < 0.0,
        |c| c.z > c.w,
    ];
    planes
        .iter()
        .any(|outside| clips.iter().all(|clip| outside(clip)))
}

/// View-space normal against the direction from the triangle to the look-at
/// point. The target is used as-is in view space.
fn faces_target(corners: &[&VertexData; 3], target: &Vector3<f32>) -> bool {
    let v0 = corners[0].view;
    let normal = (corners[1].view - v0).cross(&(corners[2].view - v0));
    normal.dot(&(target - v0)) > 0.0
}

/// `max(ambient, n · light)` from the world-space face normal.
fn flat_intensity(corners: &[&VertexData; 3], shading: &Shading) -> f32 {
    let w0 = corners[0].world;
    let normal = (corners[1].world - w0).cross(&(corners[2].world - w0));
    match normal.try_normalize(AREA_EPSILON) {
        Some(unit) => unit.dot(&shading.light).max(shading.ambient),
        None => shading.degenerate,
    }
}

/// Twice the signed area of `(a, b, p)`.
#[inline]
fn edge_function(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (p.0 - a.0) * (b.1 - a.1) - (p.1 - a.1) * (b.0 - a.0)
}

/// Scan-convert every triangle overlapping rows `y0..y0 + rows` into one band.
///
/// `depth` and `color` hold exactly the band's rows. Returns the number of
/// pixels written.
fn rasterize_band(
    triangles: &[ShadedTriangle],
    depth: &mut [f32],
    color: &mut [u8],
    y0: usize,
    width: usize,
    stride: usize,
) -> usize {
    if width == 0 || depth.is_empty() {
        return 0;
    }
    let band_end = y0 + depth.len() / width;
    let mut written = 0;

    for tri in triangles {
        let start_y = tri.min_y.max(y0);
        let end_y = (tri.max_y + 1).min(band_end);
        if start_y >= end_y {
            continue;
        }
        let end_x = (tri.max_x + 1).min(width);

        let [p0, p1, p2] = tri.points;
        let [d0, d1, d2] = tri.depths;
        let area = edge_function(p0, p1, p2);
        let bgra = tri.color.to_le_bytes();

        for y in start_y..end_y {
            let row = y - y0;
            let py = y as f32 + 0.5;

            for x in tri.min_x..end_x {
                let p = (x as f32 + 0.5, py);
                let w0 = edge_function(p1, p2, p);
                let w1 = edge_function(p2, p0, p);
                let w2 = edge_function(p0, p1, p);

                let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                    || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                if !inside {
                    continue;
                }

                // Affine interpolation; degenerate triangles take the first depth
                let z = if area.abs() < AREA_EPSILON {
                    d0
                } else {
                    (w0 * d0 + w1 * d1 + w2 * d2) / area
                };

                let idx = row * width + x;
                if z < depth[idx] {
                    depth[idx] = z;
                    let offset = row * stride + x * BYTES_PER_PIXEL;
                    color[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&bgra);
                    written += 1;
                }
            }
        }
    }

    written
}
