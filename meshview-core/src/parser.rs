//! Streaming OBJ parser.
//!
//! Input arrives either as raw byte chunks that may end in the middle of a
//! line, or as pre-split lines. Both feed the same line handler and build one
//! [`Mesh`] owned by the parser until [`StreamingMeshParser::finish`] hands it
//! over.

use std::io::{self, Read};
use std::ops::AddAssign;

use log::{debug, info, trace, warn};
use rayon::prelude::*;

use crate::line::{parse_line, Record};
use crate::mesh::Mesh;

/// Read size used by [`StreamingMeshParser::read_from`] callers that do not
/// pick one.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Counters describing one parse session.
///
/// Element counters only include records that made it into the mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Complete lines handed to the line handler.
    pub lines: usize,
    pub vertices: usize,
    pub texcoords: usize,
    pub normals: usize,
    pub faces: usize,
    /// `v`/`vt`/`vn` lines skipped because a number did not parse.
    pub malformed: usize,
    /// Face lines with fewer than three resolved corners.
    pub dropped_faces: usize,
}

impl AddAssign for ParseStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.vertices += other.vertices;
        self.texcoords += other.texcoords;
        self.normals += other.normals;
        self.faces += other.faces;
        self.malformed += other.malformed;
        self.dropped_faces += other.dropped_faces;
    }
}

/// Chunk-tolerant OBJ parser.
///
/// Chunks must be supplied in file order. A line split across chunks is held
/// in a leftover buffer and completed by the next chunk's first newline.
#[derive(Debug, Default)]
pub struct StreamingMeshParser {
    mesh: Mesh,
    leftover: Vec<u8>,
    stats: ParseStats,
}

impl StreamingMeshParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole document held in memory.
    pub fn parse_str(text: &str) -> Mesh {
        let mut parser = Self::new();
        parser.feed(text.as_bytes());
        parser.finish()
    }

    /// Feed the next byte chunk.
    pub fn feed(&mut self, chunk: &[u8]) {
        let mut rest = chunk;

        if !self.leftover.is_empty() {
            match find_newline(rest) {
                Some(newline) => {
                    self.leftover.extend_from_slice(&rest[..newline]);
                    self.flush_leftover();
                    rest = &rest[newline + 1..];
                }
                None => {
                    self.leftover.extend_from_slice(rest);
                    return;
                }
            }
        }

        while let Some(newline) = find_newline(rest) {
            self.consume_line(&rest[..newline]);
            rest = &rest[newline + 1..];
        }

        self.leftover.extend_from_slice(rest);
    }

    /// Feed a group of complete lines (no `\n` terminators).
    ///
    /// A partial line left by an earlier [`feed`](Self::feed) is completed
    /// first, as if the group started on a new line.
    pub fn feed_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.flush_leftover();
        for line in lines {
            self.consume_line(line.as_ref());
        }
    }

    /// Pull `reader` to exhaustion in `chunk_size` reads.
    pub fn read_from<R: Read>(&mut self, mut reader: R, chunk_size: usize) -> io::Result<()> {
        let mut buffer = vec![0u8; chunk_size.max(1)];
        let mut chunks = 0usize;

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => {
                    self.feed(&buffer[..read]);
                    chunks += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        debug!("Read {} chunks of up to {} bytes", chunks, buffer.len());
        Ok(())
    }

    /// Mesh accumulated so far. Only complete lines are reflected.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Flush the trailing partial line and hand over the mesh.
    pub fn finish(self) -> Mesh {
        self.finish_with_stats().0
    }

    pub fn finish_with_stats(mut self) -> (Mesh, ParseStats) {
        self.flush_leftover();

        let stats = self.stats;
        if stats.malformed > 0 || stats.dropped_faces > 0 {
            warn!(
                "Skipped {} malformed records and {} faces with fewer than 3 vertices",
                stats.malformed, stats.dropped_faces
            );
        }
        debug!(
            "Parsed {} lines: {} vertices, {} texcoords, {} normals, {} faces",
            stats.lines, stats.vertices, stats.texcoords, stats.normals, stats.faces
        );

        (self.mesh, stats)
    }

    fn flush_leftover(&mut self) {
        if self.leftover.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.leftover);
        self.consume_line(&line);
        self.leftover = line;
        self.leftover.clear();
    }

    fn consume_line(&mut self, line: &[u8]) {
        self.stats.lines += 1;

        match parse_line(line) {
            Record::Vertex(vertex) => {
                self.mesh.add_vertex(vertex);
                self.stats.vertices += 1;
            }
            Record::TextureCoord(texcoord) => {
                self.mesh.add_texcoord(texcoord);
                self.stats.texcoords += 1;
            }
            Record::Normal(normal) => {
                self.mesh.add_normal(normal);
                self.stats.normals += 1;
            }
            Record::Face(corners) => {
                if self.mesh.add_face(corners) {
                    self.stats.faces += 1;
                } else {
                    self.stats.dropped_faces += 1;
                    trace!("Dropping face on line {}", self.stats.lines);
                }
            }
            Record::Malformed(kind) => {
                self.stats.malformed += 1;
                trace!("Skipping malformed {:?} record on line {}", kind, self.stats.lines);
            }
            Record::Ignore => {}
        }
    }
}

/// Parse independent groups of complete lines on the rayon pool.
///
/// Every group gets its own parser and partial mesh; partials are merged in
/// group order afterwards, so the result equals parsing the groups one after
/// another.
pub fn parse_line_groups<G, S>(groups: &[G]) -> (Mesh, ParseStats)
where
    G: AsRef<[S]> + Sync,
    S: AsRef<[u8]> + Sync,
{
    let partials: Vec<(Mesh, ParseStats)> = groups
        .par_iter()
        .map(|group| {
            let mut parser = StreamingMeshParser::new();
            parser.feed_lines(group.as_ref());
            parser.finish_with_stats()
        })
        .collect();

    let mut mesh = Mesh::new();
    let mut stats = ParseStats::default();
    for (partial, partial_stats) in partials {
        mesh.merge(partial);
        stats += partial_stats;
    }

    info!(
        "Merged {} line groups into {} vertices and {} faces",
        groups.len(),
        mesh.vertices.len(),
        mesh.faces.len()
    );
    (mesh, stats)
}

#[inline]
fn find_newline(data: &[u8]) -> Option<usize> {
    data.iter().position(|&b| b == b'\n')
}
