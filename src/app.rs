//! Window, event loop and the per-frame driver.
//!
//! The application starts [`Pending`](GladeApp::Pending) and creates its
//! window, GPU context and renderer on the first `resumed` event. Each redraw
//! turns the frame's input into an [`ActionState`], updates the
//! [`FrameContext`] and renders it to the surface.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::frame::FrameContext;
use crate::gpu::GpuContext;
use crate::input::{ActionState, Input};
use crate::renderer::SceneRenderer;

enum GladeApp {
    Pending {
        config: AppConfig,
        /// Start-up failure, handed back to [`run`] once the loop exits.
        error: Option<Error>,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        renderer: SceneRenderer,
        frame: FrameContext,
        input: Input,
    },
}

impl GladeApp {
    fn start(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let mut renderer = SceneRenderer::new(&gpu, config);
        renderer.load_assets(&gpu, config);

        let mut frame = FrameContext::new(config);
        frame.resize(gpu.width(), gpu.height());

        Ok(GladeApp::Running {
            window,
            gpu,
            renderer,
            frame,
            input: Input::new(),
        })
    }
}

impl ApplicationHandler for GladeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let GladeApp::Pending { config, error } = self {
            if error.is_some() {
                return;
            }
            match GladeApp::start(event_loop, config) {
                Ok(app) => *self = app,
                Err(e) => {
                    *error = Some(e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let GladeApp::Running {
            window,
            gpu,
            renderer,
            frame,
            input,
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::info!("resized to {}x{}", size.width, size.height);
                gpu.resize(size.width, size.height);
                frame.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                frame.update(&ActionState::from_input(input));
                input.begin_frame();

                if frame.quit_requested {
                    event_loop.exit();
                    return;
                }

                render_frame(gpu, renderer, frame);
                window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Render one frame to the window surface.
///
/// A lost or outdated surface is reconfigured and the frame skipped.
fn render_frame(gpu: &GpuContext, renderer: &mut SceneRenderer, frame: &FrameContext) {
    let Some(surface) = &gpu.surface else {
        return;
    };

    gpu.begin_error_scopes();

    let output = match surface.get_current_texture() {
        Ok(output) => Some(output),
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::debug!("surface lost, reconfiguring");
            gpu.reconfigure();
            None
        }
        Err(e) => {
            log::warn!("skipping frame: {}", e);
            None
        }
    };

    if let Some(output) = output {
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        renderer.render(gpu, frame, &view, &mut encoder);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    gpu.end_error_scopes();
}

/// Open the window and run the scene until it is closed.
///
/// Returns an error if the window or GPU could not be set up.
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GladeApp::Pending {
        config,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app {
        GladeApp::Pending { error: Some(e), .. } => Err(e),
        _ => Ok(()),
    }
}
