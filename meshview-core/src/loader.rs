//! Mesh files on disk.
use std::fs::{self, File};
use std::path::Path;

use log::info;

use crate::error::{LoadError, LoadResult};
use crate::mesh::Mesh;
use crate::parser::{ParseStats, StreamingMeshParser};

/// Check that `path` names a readable regular file.
pub fn validate_path(path: &Path) -> LoadResult<()> {
    if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
        return Err(LoadError::EmptyPath);
    }

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if !metadata.is_file() {
        return Err(LoadError::NotAFile(path.to_path_buf()));
    }

    // Opening surfaces permission problems up front
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Validate, then stream the file through a parser in `chunk_size` reads.
pub fn load_mesh(path: impl AsRef<Path>, chunk_size: usize) -> LoadResult<(Mesh, ParseStats)> {
    let path = path.as_ref();
    validate_path(path)?;

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parser = StreamingMeshParser::new();
    parser
        .read_from(file, chunk_size)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let (mesh, stats) = parser.finish_with_stats();

    info!(
        "Loaded {}: {} vertices, {} faces ({} triangles)",
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len(),
        mesh.triangle_count()
    );
    Ok((mesh, stats))
}
