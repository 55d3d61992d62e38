//! Renders the scene offscreen. Skipped when no GPU adapter is available.

use glade::{
    AppConfig, FrameContext, GpuContext, Mesh, Model, RenderTarget, SceneObject, SceneRenderer,
    read_texture,
};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

fn gpu() -> Option<GpuContext> {
    match GpuContext::headless(WIDTH, HEIGHT) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("skipping: {}", e);
            None
        }
    }
}

fn ground_scene(gpu: &GpuContext, config: &AppConfig) -> SceneRenderer {
    let mut renderer = SceneRenderer::new(gpu, config);
    let ground = Model::from_mesh(Mesh::plane(gpu, 10.0), renderer.materials());
    renderer.insert_model(SceneObject::Ground, ground);
    let crate_box = Model::from_mesh(Mesh::cube(gpu), renderer.materials());
    renderer.insert_model(SceneObject::Structures, crate_box);
    renderer
}

/// Render one frame and read back (shadow depth, color).
fn render(
    gpu: &GpuContext,
    renderer: &mut SceneRenderer,
    frame: &FrameContext,
) -> (Vec<u8>, Vec<u8>) {
    let target = RenderTarget::new(gpu, "Test Target");
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    gpu.begin_error_scopes();
    renderer.render(gpu, frame, &target.view, &mut encoder);
    gpu.queue.submit(std::iter::once(encoder.finish()));
    assert_eq!(gpu.end_error_scopes(), 0, "GPU errors while rendering");

    let depth =
        read_texture(gpu, renderer.shadow_map().texture()).expect("shadow map readback");
    let color = read_texture(gpu, &target.texture).expect("color readback");
    assert_eq!(depth.len(), (shadow_size(renderer) * shadow_size(renderer) * 4) as usize);
    assert_eq!(color.len(), (WIDTH * HEIGHT * 4) as usize);
    (depth, color)
}

fn shadow_size(renderer: &SceneRenderer) -> u32 {
    renderer.shadow_map().size()
}

fn depths(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[test]
fn frames_render_identically() {
    let Some(gpu) = gpu() else { return };
    let config = AppConfig::default().size(WIDTH, HEIGHT).shadow_map_size(256);
    let mut renderer = ground_scene(&gpu, &config);
    let frame = FrameContext::new(&config);

    let (depth_a, color_a) = render(&gpu, &mut renderer, &frame);
    let (depth_b, color_b) = render(&gpu, &mut renderer, &frame);

    assert_eq!(depth_a.len(), 256 * 256 * 4);
    assert_eq!(color_a.len(), (WIDTH * HEIGHT * 4) as usize);
    assert_eq!(depth_a, depth_b);
    assert_eq!(color_a, color_b);
}

#[test]
fn shadow_map_sees_the_ground() {
    let Some(gpu) = gpu() else { return };
    let config = AppConfig::default().size(WIDTH, HEIGHT).shadow_map_size(128);
    let mut renderer = ground_scene(&gpu, &config);
    let frame = FrameContext::new(&config);

    let (depth, _) = render(&gpu, &mut renderer, &frame);
    let depth = depths(&depth);

    assert_eq!(renderer.shadow_map().size(), 128);
    assert!(depth.iter().all(|d| (0.0..=1.0).contains(d)));
    assert!(depth.iter().any(|&d| d < 1.0), "nothing reached the shadow map");
}

#[test]
fn depth_view_skips_the_lit_pass() {
    let Some(gpu) = gpu() else { return };
    let config = AppConfig::default()
        .size(WIDTH, HEIGHT)
        .shadow_map_size(128)
        .show_depth_map(true);
    let mut renderer = ground_scene(&gpu, &config);
    let mut frame = FrameContext::new(&config);

    let (_, depth_view) = render(&gpu, &mut renderer, &frame);
    frame.show_depth_map = false;
    let (_, lit) = render(&gpu, &mut renderer, &frame);

    // The depth view is greyscale.
    for px in depth_view.chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
    assert_ne!(depth_view, lit);
}
