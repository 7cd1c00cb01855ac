//! End-to-end scenarios: text in, mesh out, pixels out.

use meshview_core::mesh::fan_triangles;
use meshview_core::surface::{BLACK, WHITE};
use meshview_core::{
    FaceVertexRef, FrameBuffer, KeyAction, Mesh, MeshRenderer, OrbitController, PixelSurface, RenderConfig,
    StreamingMeshParser,
};
use nalgebra::Vector4;

const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3";
const QUAD: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4";

fn lit_pixels(frame: &FrameBuffer) -> usize {
    (0..frame.height())
        .flat_map(|y| (0..frame.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| frame.pixel(x, y) != Some(BLACK))
        .count()
}

#[test]
fn test_single_triangle() {
    let mesh = StreamingMeshParser::parse_str(TRIANGLE);

    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.vertices[1], Vector4::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(mesh.faces.len(), 1);
    assert_eq!(
        mesh.faces[0],
        vec![FaceVertexRef::new(0), FaceVertexRef::new(1), FaceVertexRef::new(2)]
    );
    assert!(mesh.faces[0].iter().all(|c| c.texture_index.is_none() && c.normal_index.is_none()));
}

#[test]
fn test_quad_triangulation() {
    let mesh = StreamingMeshParser::parse_str(QUAD);

    assert_eq!(mesh.faces.len(), 1);
    assert_eq!(mesh.faces[0].len(), 4);
    let triangles: Vec<[usize; 3]> = fan_triangles(mesh.faces[0].len()).collect();
    assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3]]);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn test_two_corner_face_is_dropped() {
    let mut parser = StreamingMeshParser::new();
    parser.feed(b"v 0 0 0\nv 1 0 0\nf 1 2\nf 1 2 x\n");
    let (mesh, stats) = parser.finish_with_stats();

    assert!(mesh.faces.is_empty());
    assert_eq!(stats.dropped_faces, 2);
}

#[test]
fn test_full_corner_forms() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2//1 3/1\n";
    let mesh = StreamingMeshParser::parse_str(text);

    assert_eq!(mesh.texcoords.len(), 1);
    assert_eq!(mesh.normals.len(), 1);
    assert_eq!(
        mesh.faces[0],
        vec![
            FaceVertexRef::new(0).with_texture(0).with_normal(0),
            FaceVertexRef::new(1).with_normal(0),
            FaceVertexRef::new(2).with_texture(0),
        ]
    );
}

#[test]
fn test_two_char_lookahead() {
    let text = "vx 1 2 3\nvtx 1 2\nv\t1 2 3\nvn 0 1 0\nvp 1 2\n";
    let mut parser = StreamingMeshParser::new();
    parser.feed(text.as_bytes());
    let (mesh, stats) = parser.finish_with_stats();

    assert_eq!(mesh.vertices.len(), 1);
    assert_eq!(mesh.normals.len(), 1);
    assert!(mesh.texcoords.is_empty());
    assert_eq!(stats.malformed, 0);
}

#[test]
fn test_malformed_records_are_skipped() {
    let text = "v 1 2\nv 0 0 0\nvn a b c\nvt 0.5\nv 1 1 1\n";
    let mut parser = StreamingMeshParser::new();
    parser.feed(text.as_bytes());
    let (mesh, stats) = parser.finish_with_stats();

    assert_eq!(mesh.vertices.len(), 2);
    assert_eq!(stats.vertices, 2);
    assert_eq!(stats.malformed, 3);
}

#[test]
fn test_non_finite_vertices_are_skipped() {
    let text = format!("{}\nv inf 0 0\nv nan 0 0\nv 0 -infinity 0\n", QUAD);
    let mut parser = StreamingMeshParser::new();
    parser.feed(text.as_bytes());
    let (mesh, stats) = parser.finish_with_stats();

    assert_eq!(stats.malformed, 3);
    assert_eq!(mesh, StreamingMeshParser::parse_str(QUAD));
    assert!(mesh.vertices.iter().all(|v| v.iter().all(|c| c.is_finite())));

    let mut renderer = MeshRenderer::default();
    let mut frame = FrameBuffer::new(40, 40);
    let stats = renderer.render(&mesh, &mut frame).unwrap();
    assert_eq!(stats.rasterized, 2);
    assert!(lit_pixels(&frame) > 0);
}

#[test]
fn test_chunks_split_mid_line() {
    let mut parser = StreamingMeshParser::new();
    for chunk in ["v 0 0", " 0\nv 1 0 0\nv 0 1", " 0\nf 1 2", " 3"] {
        parser.feed(chunk.as_bytes());
        assert!(parser.mesh().faces.is_empty());
    }
    let mesh = parser.finish();
    assert_eq!(mesh, StreamingMeshParser::parse_str(TRIANGLE));
}

#[test]
fn test_line_mode_matches_byte_mode() {
    let mut parser = StreamingMeshParser::new();
    parser.feed_lines(QUAD.lines());
    assert_eq!(parser.finish(), StreamingMeshParser::parse_str(QUAD));
}

#[test]
fn test_zoom_clamps_at_minimum() {
    let mut renderer = MeshRenderer::default();
    let min_zoom = renderer.config().min_zoom;

    while renderer.camera().zoom > min_zoom {
        KeyAction::ZoomIn.apply(&mut renderer);
    }
    for _ in 0..10 {
        KeyAction::ZoomIn.apply(&mut renderer);
        assert_eq!(renderer.camera().zoom, min_zoom);
    }
}

#[test]
fn test_render_parsed_quad() {
    let mesh = StreamingMeshParser::parse_str(QUAD);
    let mut renderer = MeshRenderer::default();
    let mut frame = FrameBuffer::new(80, 60);

    let stats = renderer.render(&mesh, &mut frame).unwrap();
    assert_eq!(stats.triangles, 2);
    assert_eq!(stats.rasterized, 2);
    // Facing +Z, straight into the light
    assert_eq!(frame.pixel(40, 30), Some(WHITE));
    assert!(renderer
        .rasterizer()
        .depth_at(40, 30)
        .is_some_and(|depth| depth.is_finite()));
}

#[test]
fn test_backfacing_quad_draws_nothing() {
    let flipped = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 4 3 2 1";
    let mesh = StreamingMeshParser::parse_str(flipped);
    let mut renderer = MeshRenderer::default();
    let mut frame = FrameBuffer::new(80, 60);

    let stats = renderer.render(&mesh, &mut frame).unwrap();
    assert_eq!(stats.backface_culled, 2);
    assert_eq!(lit_pixels(&frame), 0);
    assert!(renderer.rasterizer().depth_buffer().iter().all(|d| d.is_infinite()));
}

#[test]
fn test_out_of_range_faces_are_skipped() {
    let mesh = StreamingMeshParser::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\nf 0 1 2\nf 1 2 3");
    let mut renderer = MeshRenderer::default();
    let mut frame = FrameBuffer::new(32, 32);

    let stats = renderer.render(&mesh, &mut frame).unwrap();
    assert_eq!(stats.faces, 3);
    // `f 0 1 2` resolves to slots 0, 0, 1 and stays in range
    assert_eq!(stats.out_of_range, 1);
    assert!(lit_pixels(&frame) > 0);
}

#[test]
fn test_orbit_turns_cube() {
    let mesh = Mesh::cube(2.0);
    let mut renderer = MeshRenderer::default();
    let mut orbit = OrbitController::default();
    let mut frame = FrameBuffer::new(64, 64);

    renderer.render(&mesh, &mut frame).unwrap();
    let front_only = frame.pixels().to_vec();

    orbit.mouse_down(0.0, 0.0);
    orbit.mouse_move(60.0, 40.0, &mut renderer);
    orbit.mouse_up();
    let stats = renderer.render(&mesh, &mut frame).unwrap();

    assert_ne!(frame.pixels(), &front_only[..]);
    // Turned off-axis, more than one side of the cube is visible
    assert!(stats.rasterized > 2);
}

#[test]
fn test_parallel_paths_match_sequential() {
    // A dense grid crosses both parallel thresholds
    let mut text = String::new();
    let n = 40;
    for y in 0..=n {
        for x in 0..=n {
            text.push_str(&format!("v {} {} {}\n", x as f32 / n as f32, y as f32 / n as f32, ((x + y) % 3) as f32 * 0.02));
        }
    }
    for y in 0..n {
        for x in 0..n {
            let a = y * (n + 1) + x + 1;
            text.push_str(&format!("f {} {} {} {}\n", a, a + 1, a + n + 2, a + n + 1));
        }
    }
    let mesh = StreamingMeshParser::parse_str(&text);
    assert_eq!(mesh.faces.len(), 1600);

    let sequential = RenderConfig {
        parallel_vertex_threshold: usize::MAX,
        parallel_face_threshold: usize::MAX,
        ..RenderConfig::default()
    };
    let parallel = RenderConfig {
        parallel_vertex_threshold: 0,
        parallel_face_threshold: 0,
        band_height: 7,
        ..RenderConfig::default()
    };

    let mut frame_a = FrameBuffer::new(96, 64);
    let mut frame_b = FrameBuffer::new(96, 64);
    let mut renderer_a = MeshRenderer::new(sequential);
    let mut renderer_b = MeshRenderer::new(parallel);
    renderer_a.rotate(0.3, 0.4);
    renderer_b.rotate(0.3, 0.4);

    let stats_a = renderer_a.render(&mesh, &mut frame_a).unwrap();
    let stats_b = renderer_b.render(&mesh, &mut frame_b).unwrap();

    assert_eq!(stats_a, stats_b);
    assert_eq!(frame_a.pixels(), frame_b.pixels());
    assert_eq!(renderer_a.rasterizer().depth_buffer(), renderer_b.rasterizer().depth_buffer());
}
