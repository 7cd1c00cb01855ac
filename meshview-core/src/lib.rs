//! meshview core library: OBJ parsing and software rasterization
//!
//! Text flows through [`StreamingMeshParser`] into a [`Mesh`]; every frame,
//! [`MeshRenderer`] transforms the mesh with the current [`CameraState`] and
//! rasterizes it into any [`PixelSurface`].

pub mod camera;
pub mod config;
pub mod error;
pub mod face;
pub mod input;
pub mod line;
pub mod loader;
pub mod mesh;
pub mod numeric;
pub mod parser;
pub mod projection;
pub mod raster;
pub mod renderer;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use camera::CameraState;
pub use config::RenderConfig;
pub use error::{ConfigError, LoadError, RenderError};
pub use face::FaceVertexRef;
pub use input::{KeyAction, OrbitController};
pub use loader::load_mesh;
pub use mesh::{Aabb, Face, Mesh};
pub use parser::{parse_line_groups, ParseStats, StreamingMeshParser, DEFAULT_CHUNK_SIZE};
pub use projection::{ScreenPoint, Viewport};
pub use raster::{FrameStats, Rasterizer};
pub use renderer::MeshRenderer;
pub use surface::{DrawScope, FrameBuffer, PixelSurface};
pub use transform::{ModelNormalization, Transform, TransformPipeline, VertexData};
