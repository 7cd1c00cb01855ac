/// Face record tokenizer (`f v`, `f v/vt`, `f v//vn`, `f v/vt/vn`)
use crate::numeric::{adjust_index, fields, parse_int};

/// One corner of a face: indices into the mesh's vertex, texcoord and normal
/// lists, already converted to 0-based.
///
/// Texture and normal references are optional. `Some(0)` means the file named
/// the first element; `None` means the token did not supply that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceVertexRef {
    pub vertex_index: i32,
    pub texture_index: Option<i32>,
    pub normal_index: Option<i32>,
}

impl FaceVertexRef {
    pub fn new(vertex_index: i32) -> Self {
        Self {
            vertex_index,
            texture_index: None,
            normal_index: None,
        }
    }

    pub fn with_texture(mut self, texture_index: i32) -> Self {
        self.texture_index = Some(texture_index);
        self
    }

    pub fn with_normal(mut self, normal_index: i32) -> Self {
        self.normal_index = Some(normal_index);
        self
    }

    /// Vertex slot as a usize if it lies inside `0..count`.
    ///
    /// Non-positive file indices are kept verbatim by the tokenizer, so a
    /// negative value here is always treated as out of range.
    #[inline]
    pub fn vertex_slot(&self, count: usize) -> Option<usize> {
        usize::try_from(self.vertex_index)
            .ok()
            .filter(|&slot| slot < count)
    }
}

/// Parse one `v/vt/vn` token.
///
/// Returns `None` when the vertex part is missing or not an integer; such a
/// corner cannot be resolved. An empty or unparseable texture/normal part is
/// recorded as absent.
pub fn parse_face_token(token: &[u8]) -> Option<FaceVertexRef> {
    let mut parts = token.splitn(3, |&b| b == b'/');

    let vertex = parts.next().and_then(parse_index)?;
    let mut corner = FaceVertexRef::new(vertex);

    if let Some(texture) = parts.next().and_then(parse_index) {
        corner = corner.with_texture(texture);
    }
    if let Some(normal) = parts.next().and_then(parse_index) {
        corner = corner.with_normal(normal);
    }

    Some(corner)
}

/// Tokenize the body of a face record (everything after the leading `f`).
///
/// Every token that resolves to a vertex is kept, in order. The tokenizer does
/// not enforce the three-corner minimum; the face line handler does.
pub fn tokenize_face(body: &[u8]) -> Vec<FaceVertexRef> {
    fields(body).filter_map(parse_face_token).collect()
}

fn parse_index(part: &[u8]) -> Option<i32> {
    if part.is_empty() {
        return None;
    }
    parse_int(part).map(adjust_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_only() {
        assert_eq!(parse_face_token(b"3"), Some(FaceVertexRef::new(2)));
    }

    #[test]
    fn test_full_triplet() {
        let corner = parse_face_token(b"1/2/3").unwrap();
        assert_eq!(corner.vertex_index, 0);
        assert_eq!(corner.texture_index, Some(1));
        assert_eq!(corner.normal_index, Some(2));
    }

    #[test]
    fn test_missing_texture() {
        let corner = parse_face_token(b"4//6").unwrap();
        assert_eq!(corner.vertex_index, 3);
        assert_eq!(corner.texture_index, None);
        assert_eq!(corner.normal_index, Some(5));
    }

    #[test]
    fn test_trailing_slash() {
        let corner = parse_face_token(b"5/").unwrap();
        assert_eq!(corner, FaceVertexRef::new(4));

        let corner = parse_face_token(b"5/7/").unwrap();
        assert_eq!(corner.texture_index, Some(6));
        assert_eq!(corner.normal_index, None);
    }

    #[test]
    fn test_index_one_is_element_zero() {
        // A supplied index of 1 resolves to slot 0 and is distinct from "absent"
        let corner = parse_face_token(b"1/1/1").unwrap();
        assert_eq!(corner.texture_index, Some(0));
        assert_eq!(corner.normal_index, Some(0));
    }

    #[test]
    fn test_non_positive_pass_through() {
        assert_eq!(parse_face_token(b"-1").unwrap().vertex_index, -1);
        assert_eq!(parse_face_token(b"0").unwrap().vertex_index, 0);
        assert_eq!(parse_face_token(b"-4/-2").unwrap().texture_index, Some(-2));
    }

    #[test]
    fn test_unresolved_vertex() {
        assert_eq!(parse_face_token(b"/2/3"), None);
        assert_eq!(parse_face_token(b"x/2"), None);
        assert_eq!(parse_face_token(b""), None);
    }

    #[test]
    fn test_tokenize_face() {
        let corners = tokenize_face(b" 1/1/1\t2/2/2   3/3/3 4/4/4");
        assert_eq!(corners.len(), 4);
        assert_eq!(corners[3].vertex_index, 3);
    }

    #[test]
    fn test_tokenize_keeps_short_faces() {
        assert_eq!(tokenize_face(b"1 2").len(), 2);
        assert_eq!(tokenize_face(b"1 bad 3").len(), 2);
    }

    #[test]
    fn test_vertex_slot() {
        assert_eq!(FaceVertexRef::new(2).vertex_slot(3), Some(2));
        assert_eq!(FaceVertexRef::new(3).vertex_slot(3), None);
        assert_eq!(FaceVertexRef::new(-1).vertex_slot(3), None);
    }
}
