//! Render configuration.
//!
//! Every tunable of the viewer lives in [`RenderConfig`]. Missing JSON fields
//! fall back to the defaults, so a config file only needs the values it
//! changes.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Camera, projection, shading and scheduling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Eye distance after load and reset.
    pub initial_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,

    /// Clamp range for the model normalization scale.
    pub min_model_scale: f32,
    pub max_model_scale: f32,
    /// Target diagonal length of the normalized model.
    pub normalization_factor: f32,

    /// Vertical field of view in radians.
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,

    /// Vertices with `|clip.w|` below this are not projected.
    pub depth_division_threshold: f32,
    /// Vertices with `|ndc.x|` or `|ndc.y|` above this are not projected.
    pub ndc_bound: f32,

    /// Lower bound on the flat-shading intensity.
    pub ambient_intensity: f32,
    /// Intensity used for zero-area triangles.
    pub degenerate_intensity: f32,
    /// World-space direction toward the light; normalized on use.
    pub light_direction: [f32; 3],

    /// Vertex count above which the vertex transform runs on rayon.
    pub parallel_vertex_threshold: usize,
    /// Face count above which rasterization runs in parallel bands.
    pub parallel_face_threshold: usize,
    /// Rows per band in parallel rasterization.
    pub band_height: usize,

    /// Radians of rotation per pixel of mouse drag.
    pub drag_rotation_factor: f32,
    /// Zoom change per wheel unit, relative to the current zoom.
    pub wheel_zoom_factor: f32,

    /// Clear color, `0xAARRGGBB`.
    pub background: u32,
    /// Width / height of one pixel on the output device.
    pub pixel_aspect: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            initial_zoom: 5.0,
            min_zoom: 0.5,
            max_zoom: 200.0,
            min_model_scale: 0.001,
            max_model_scale: 100.0,
            normalization_factor: 2.0,
            field_of_view: PI / 3.0,
            near_plane: 0.1,
            far_plane: 10000.0,
            depth_division_threshold: 0.0001,
            ndc_bound: 5.0,
            ambient_intensity: 0.1,
            degenerate_intensity: 0.2,
            light_direction: [0.0, 0.0, 1.0],
            parallel_vertex_threshold: 1000,
            parallel_face_threshold: 1000,
            band_height: 32,
            drag_rotation_factor: 0.01,
            wheel_zoom_factor: 0.001,
            background: 0xFF00_0000,
            pixel_aspect: 1.0,
        }
    }
}

impl RenderConfig {
    /// Parse and validate a (possibly partial) JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !(self.min_model_scale > 0.0 && self.min_model_scale <= self.max_model_scale) {
            return Err(ConfigError::InvalidScaleRange {
                min: self.min_model_scale,
                max: self.max_model_scale,
            });
        }
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            return Err(ConfigError::InvalidClipPlanes {
                near: self.near_plane,
                far: self.far_plane,
            });
        }
        if !(self.field_of_view > 0.0 && self.field_of_view < PI) {
            return Err(ConfigError::InvalidFieldOfView(self.field_of_view));
        }
        if !(self.pixel_aspect > 0.0) {
            return Err(ConfigError::InvalidPixelAspect(self.pixel_aspect));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RenderConfig::from_json_str(r#"{ "max_zoom": 50.0, "band_height": 8 }"#).unwrap();
        assert_eq!(config.max_zoom, 50.0);
        assert_eq!(config.band_height, 8);
        assert_eq!(config.min_zoom, 0.5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = RenderConfig::from_json_str(r#"{ "near_plane": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidClipPlanes { .. }));

        let err = RenderConfig::from_json_str(r#"{ "min_zoom": 10.0, "max_zoom": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidZoomRange { .. }));

        let err = RenderConfig::from_json_str(r#"{ "field_of_view": 4.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFieldOfView(_)));

        let err = RenderConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
