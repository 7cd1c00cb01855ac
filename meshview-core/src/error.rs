//! Error types for configuration, mesh loading and rendering.
//!
//! Malformed OBJ content is not an error: bad records are skipped and counted
//! in [`crate::parser::ParseStats`]. These enums cover the failures a caller
//! can actually act on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or validating a [`crate::config::RenderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Zoom limits are inverted or non-positive.
    #[error("Invalid zoom range: min {min} must be positive and not above max {max}")]
    InvalidZoomRange { min: f32, max: f32 },

    /// Model scale clamp range is inverted or non-positive.
    #[error("Invalid model scale range: min {min} must be positive and not above max {max}")]
    InvalidScaleRange { min: f32, max: f32 },

    /// Clip planes do not satisfy `0 < near < far`.
    #[error("Invalid clip planes: near {near}, far {far} (need 0 < near < far)")]
    InvalidClipPlanes { near: f32, far: f32 },

    /// Vertical field of view outside (0, pi).
    #[error("Invalid field of view: {0} (must be in (0, pi) radians)")]
    InvalidFieldOfView(f32),

    /// Pixel aspect must be positive.
    #[error("Invalid pixel aspect: {0}")]
    InvalidPixelAspect(f32),

    /// Reading the config file failed.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for [`crate::config::RenderConfig`].
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while locating and reading a mesh file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No path was given.
    #[error("File path cannot be empty")]
    EmptyPath,

    /// The path does not exist.
    #[error("The file '{0}' was not found")]
    NotFound(PathBuf),

    /// The path exists but is a directory or special file.
    #[error("'{0}' is not a regular file")]
    NotAFile(PathBuf),

    /// Opening or reading failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abandon a single frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The surface reports a zero width or height.
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: usize, height: usize },

    /// Stride cannot hold a full row of BGRA pixels.
    #[error("Surface stride {stride} is smaller than {required} bytes per row")]
    StrideTooSmall { stride: usize, required: usize },

    /// Pixel buffer shorter than `height * stride`.
    #[error("Surface buffer holds {actual} bytes, frame needs {required}")]
    BufferTooSmall { actual: usize, required: usize },

    /// The surface refused to begin drawing.
    #[error("Surface unavailable: {0}")]
    Surface(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for mesh loading.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Result type for a render pass.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidClipPlanes { near: 0.0, far: 1.0 };
        assert!(format!("{err}").contains("near 0"));

        let err = RenderError::BufferTooSmall {
            actual: 10,
            required: 400,
        };
        assert_eq!(format!("{err}"), "Surface buffer holds 10 bytes, frame needs 400");

        let err = LoadError::NotFound(PathBuf::from("model.obj"));
        assert_eq!(format!("{err}"), "The file 'model.obj' was not found");
    }
}
