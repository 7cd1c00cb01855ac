/// meshview terminal viewer
///
/// Renders an OBJ file (or a built-in cube) as shaded ASCII.
/// Controls:
///   - Mouse drag / Arrow keys: Rotate
///   - Mouse wheel / +/-: Zoom
///   - WASD: Pan
///   - R: Reset view
///   - Q/ESC: Quit
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use meshview_core::{load_mesh, Mesh, RenderConfig, DEFAULT_CHUNK_SIZE};
use meshview_terminal::TerminalApp;
use std::fs::File;
use std::path::PathBuf;

/// Terminal character cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 0.5;

#[derive(Parser, Debug)]
#[command(name = "meshview-terminal", version, about = "Render OBJ meshes in the terminal")]
struct Cli {
    /// OBJ file to display; a cube is shown when omitted
    path: Option<PathBuf>,

    /// JSON render configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bytes per read while streaming the file
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[arg(long)]
    min_zoom: Option<f32>,

    #[arg(long)]
    max_zoom: Option<f32>,

    /// Vertical field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// Radians per frame of automatic rotation
    #[arg(long, default_value_t = 0.0)]
    spin: f32,

    /// Write log output here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Parse and report the mesh without opening the viewer
    #[arg(long)]
    check: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn build_config(cli: &Cli) -> Result<RenderConfig> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RenderConfig {
            pixel_aspect: CELL_ASPECT,
            ..RenderConfig::default()
        },
    };

    if let Some(min_zoom) = cli.min_zoom {
        config.min_zoom = min_zoom;
    }
    if let Some(max_zoom) = cli.max_zoom {
        config.max_zoom = max_zoom;
    }
    if let Some(fov) = cli.fov {
        config.field_of_view = fov.to_radians();
    }

    config.validate().context("Invalid render configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = build_config(&cli)?;
    if cli.chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }

    let mesh = match &cli.path {
        Some(path) => {
            let (mesh, stats) = load_mesh(path, cli.chunk_size)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            println!(
                "Loaded {}: {} vertices, {} faces, {} triangles ({} malformed records, {} dropped faces)",
                path.display(),
                mesh.vertices.len(),
                mesh.faces.len(),
                mesh.triangle_count(),
                stats.malformed,
                stats.dropped_faces
            );
            mesh
        }
        None => {
            info!("No file given, showing the default cube");
            Mesh::cube(2.0)
        }
    };

    if cli.check {
        return Ok(());
    }

    let mut app = TerminalApp::new(mesh, config)?.with_spin(cli.spin);
    app.run()?;

    Ok(())
}
