/// Line classification and per-record parsing
use nalgebra::{Vector2, Vector3, Vector4};

use crate::face::{tokenize_face, FaceVertexRef};
use crate::numeric::{is_blank, parse_float_fields};

/// What a raw line contributes to the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Vertex,
    TextureCoord,
    Normal,
    Face,
    Ignore,
}

/// A parsed line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Vertex(Vector4<f32>),
    TextureCoord(Vector2<f32>),
    Normal(Vector3<f32>),
    /// Corners that resolved to a vertex; may hold fewer than three.
    Face(Vec<FaceVertexRef>),
    /// A `v`/`vt`/`vn` line whose numbers did not parse.
    Malformed(LineKind),
    Ignore,
}

/// Classify a line from its first significant characters.
///
/// `v` + blank is a vertex, `vt`/`vn` + blank a texcoord/normal, a leading
/// `f` a face. Anything else, including `v` followed by another letter or
/// `vt`/`vn` without a following blank, is ignored.
pub fn classify(line: &[u8]) -> LineKind {
    let line = trim_start(line);
    if line.len() < 2 {
        return LineKind::Ignore;
    }

    match line[0] {
        b'v' if is_blank(line[1]) => LineKind::Vertex,
        b'v' if line.len() > 2 && is_blank(line[2]) => match line[1] {
            b't' => LineKind::TextureCoord,
            b'n' => LineKind::Normal,
            _ => LineKind::Ignore,
        },
        b'f' => LineKind::Face,
        _ => LineKind::Ignore,
    }
}

/// Classify and parse one complete line (without its `\n`).
///
/// A trailing `\r` and anything after a `#` are dropped first.
pub fn parse_line(line: &[u8]) -> Record {
    let line = strip_comment(strip_cr(line));
    let kind = classify(line);
    let line = trim_start(line);

    let parsed = match kind {
        LineKind::Vertex => parse_vertex(&line[1..]).map(Record::Vertex),
        LineKind::TextureCoord => parse_texcoord(&line[2..]).map(Record::TextureCoord),
        LineKind::Normal => parse_normal(&line[2..]).map(Record::Normal),
        LineKind::Face => return Record::Face(tokenize_face(&line[1..])),
        LineKind::Ignore => return Record::Ignore,
    };

    parsed.unwrap_or(Record::Malformed(kind))
}

/// `x y z [w]`, or `x y z r g b [a]` with the color ignored.
pub fn parse_vertex(body: &[u8]) -> Option<Vector4<f32>> {
    // One slot past the longest form so that extra fields are seen
    let mut values = [0.0f32; 8];
    let count = parse_float_fields(body, &mut values)?;
    let [x, y, z, fourth, ..] = values;

    match count {
        3 | 6 | 7 => Some(Vector4::new(x, y, z, 1.0)),
        4 | 5 => Some(Vector4::new(x, y, z, fourth)),
        _ => None,
    }
}

/// `u v [w]`; `w` is ignored.
pub fn parse_texcoord(body: &[u8]) -> Option<Vector2<f32>> {
    let mut values = [0.0f32; 3];
    match parse_float_fields(body, &mut values)? {
        2 | 3 => Some(Vector2::new(values[0], values[1])),
        _ => None,
    }
}

/// `x y z`.
pub fn parse_normal(body: &[u8]) -> Option<Vector3<f32>> {
    let mut values = [0.0f32; 3];
    match parse_float_fields(body, &mut values)? {
        3 => Some(Vector3::new(values[0], values[1], values[2])),
        _ => None,
    }
}

fn trim_start(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|&b| !is_blank(b)).unwrap_or(line.len());
    &line[start..]
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn strip_comment(line: &[u8]) -> &[u8] {
    match line.iter().position(|&b| b == b'#') {
        Some(hash) => &line[..hash],
        None => line,
    }
}
