/// Indexed polygon mesh accumulated from OBJ records
use nalgebra::{Vector2, Vector3, Vector4};

use crate::face::FaceVertexRef;

/// A polygon: three or more corners in file order.
pub type Face = Vec<FaceVertexRef>;

/// Minimum number of corners a face needs to be kept.
pub const MIN_FACE_CORNERS: usize = 3;

/// Vertex, normal, texcoord and face lists in file order.
///
/// Nothing is reordered or deduplicated. Face indices are not validated on
/// append; consumers bounds-check them before dereferencing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vector4<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub texcoords: Vec<Vector2<f32>>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vector4<f32>) {
        self.vertices.push(vertex);
    }

    pub fn add_normal(&mut self, normal: Vector3<f32>) {
        self.normals.push(normal);
    }

    pub fn add_texcoord(&mut self, texcoord: Vector2<f32>) {
        self.texcoords.push(texcoord);
    }

    /// Append a face if it has at least [`MIN_FACE_CORNERS`] corners.
    ///
    /// Returns whether the face was kept.
    pub fn add_face(&mut self, face: Face) -> bool {
        if face.len() < MIN_FACE_CORNERS {
            return false;
        }
        self.faces.push(face);
        true
    }

    /// Append everything from a partial mesh parsed from a later part of the
    /// same file. Face indices are file-global, so they carry over unchanged.
    pub fn merge(&mut self, other: Mesh) {
        self.vertices.extend(other.vertices);
        self.normals.extend(other.normals);
        self.texcoords.extend(other.texcoords);
        self.faces.extend(other.faces);
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.texcoords.clear();
        self.faces.clear();
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Number of triangles fan triangulation produces for all faces.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|face| face.len().saturating_sub(2)).sum()
    }

    /// Axis-aligned bounds of the vertex positions (`w` ignored).
    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut vertices = self.vertices.iter().map(|v| v.xyz());
        let first = vertices.next()?;
        let (min, max) = vertices.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Aabb { min, max })
    }

    /// Origin-centered cube of edge `size` made of six quads, wound
    /// counter-clockwise when seen from outside.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::new();

        for &(x, y, z) in &[
            (-half, -half, -half),
            (half, -half, -half),
            (half, half, -half),
            (-half, half, -half),
            (-half, -half, half),
            (half, -half, half),
            (half, half, half),
            (-half, half, half),
        ] {
            mesh.add_vertex(Vector4::new(x, y, z, 1.0));
        }

        for quad in [
            [4, 5, 6, 7], // front
            [0, 3, 2, 1], // back
            [1, 2, 6, 5], // right
            [0, 4, 7, 3], // left
            [3, 7, 6, 2], // top
            [0, 1, 5, 4], // bottom
        ] {
            mesh.add_face(quad.iter().map(|&i| FaceVertexRef::new(i)).collect());
        }

        mesh
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Length of the min-to-max diagonal.
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).norm()
    }
}

/// Fan triangulation of an `len`-corner polygon: triangle `k` uses corners
/// `0, k, k + 1`. Yields `len - 2` triangles, none for `len < 3`.
pub fn fan_triangles(len: usize) -> impl Iterator<Item = [usize; 3]> {
    (1..len.saturating_sub(1)).map(|k| [0, k, k + 1])
}
