//! The scene renderer: a shadow pass followed by the lit pass.
//!
//! Each frame [`SceneRenderer::render`] uploads uniforms from a
//! [`FrameContext`], renders every loaded object into the shadow map from the
//! directional light, and then either draws the lit scene with the light
//! marker and skybox, or shows the shadow map itself when the depth view is
//! on.
//!
//! Every object owns a uniform slot indexed by [`SceneObject::slot`], so a
//! frame's uniforms can be written up front and referenced by both passes.

use std::collections::{HashMap, HashSet};

use crate::config::AppConfig;
use crate::frame::{FrameContext, PolygonMode};
use crate::geometry::{Materials, Model};
use crate::gpu::GpuContext;
use crate::mesh::{Drawable, Mesh, PassKind, Vertex3d};
use crate::render_target::{DEPTH_FORMAT, DepthTarget};
use crate::scene::{DRAW_ORDER, SceneObject};
use crate::shadow::ShadowMap;
use crate::texture::CubeTexture;
use crate::uniforms::{FrameUniforms, ObjectUniforms};

/// Slot after the scene objects, holding the light marker's uniforms.
const MARKER_SLOT: usize = DRAW_ORDER.len();

/// Edge length of the plane drawn when the ground model is missing.
const FALLBACK_GROUND_SIZE: f32 = 20.0;

struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct SceneRenderer {
    skybox_layout: wgpu::BindGroupLayout,
    materials: Materials,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    slots: Vec<ObjectSlot>,

    lit_pipelines: HashMap<PolygonMode, wgpu::RenderPipeline>,
    light_cube_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    screen_quad_pipeline: wgpu::RenderPipeline,
    screen_quad_bind_group: wgpu::BindGroup,
    skybox_bind_group: wgpu::BindGroup,

    shadow: ShadowMap,
    depth: DepthTarget,
    cube: Mesh,
    models: HashMap<SceneObject, Model>,
    clear_color: wgpu::Color,
    warned_modes: HashSet<PolygonMode>,
}

impl SceneRenderer {
    /// Create pipelines and per-object resources. No models are loaded yet;
    /// see [`load_assets`](Self::load_assets).
    pub fn new(gpu: &GpuContext, config: &AppConfig) -> Self {
        let device = &gpu.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let skybox_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let screen_quad_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Screen Quad Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let materials = Materials::new(gpu);
        let shadow = ShadowMap::new(gpu, config.shadow_map_size.max(1), &object_layout);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow.sampler),
                },
            ],
        });

        let slots = (0..=MARKER_SLOT)
            .map(|slot| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("Object Uniforms {}", slot)),
                    size: std::mem::size_of::<ObjectUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Object Bind Group {}", slot)),
                    layout: &object_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                ObjectSlot { buffer, bind_group }
            })
            .collect();

        let screen_quad_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Screen Quad Bind Group"),
            layout: &screen_quad_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(shadow.view()),
            }],
        });

        // Lit pass
        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, materials.layout()],
            push_constant_ranges: &[],
        });
        let lit_pipelines = [PolygonMode::Fill, PolygonMode::Line, PolygonMode::Point]
            .into_iter()
            .filter(|&mode| gpu.supports_polygon_mode(mode.into()))
            .map(|mode| {
                let pipeline = create_mesh_pipeline(
                    gpu,
                    &MeshPipelineDesc {
                        label: "Scene Pipeline",
                        layout: &lit_layout,
                        shader: &lit_shader,
                        polygon_mode: mode.into(),
                        cull_mode: None,
                        depth_write: true,
                        depth_compare: wgpu::CompareFunction::Less,
                    },
                );
                (mode, pipeline)
            })
            .collect();

        // Light marker
        let light_cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Light Cube Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/light_cube.wgsl").into()),
        });
        let light_cube_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Light Cube Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let light_cube_pipeline = create_mesh_pipeline(
            gpu,
            &MeshPipelineDesc {
                label: "Light Cube Pipeline",
                layout: &light_cube_layout,
                shader: &light_cube_shader,
                polygon_mode: wgpu::PolygonMode::Fill,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );

        // Skybox: drawn last at the far plane, seen from inside the cube.
        let skybox_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skybox.wgsl").into()),
        });
        let skybox_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &skybox_layout],
            push_constant_ranges: &[],
        });
        let skybox_pipeline = create_mesh_pipeline(
            gpu,
            &MeshPipelineDesc {
                label: "Skybox Pipeline",
                layout: &skybox_pipeline_layout,
                shader: &skybox_shader,
                polygon_mode: wgpu::PolygonMode::Fill,
                cull_mode: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
            },
        );
        let skybox = CubeTexture::solid(gpu, CubeTexture::FALLBACK);
        let skybox_bind_group = create_skybox_bind_group(gpu, &skybox_layout, &skybox);

        // Depth view
        let screen_quad_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Screen Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/screen_quad.wgsl").into()),
        });
        let quad_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Screen Quad Pipeline Layout"),
            bind_group_layouts: &[&screen_quad_layout],
            push_constant_ranges: &[],
        });
        let screen_quad_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Screen Quad Pipeline"),
            layout: Some(&quad_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &screen_quad_shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &screen_quad_shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let [r, g, b] = config.clear_color;
        Self {
            skybox_layout,
            materials,
            frame_buffer,
            frame_bind_group,
            slots,
            lit_pipelines,
            light_cube_pipeline,
            skybox_pipeline,
            screen_quad_pipeline,
            screen_quad_bind_group,
            skybox_bind_group,
            shadow,
            depth: DepthTarget::new(gpu, gpu.width(), gpu.height(), "Scene Depth"),
            cube: Mesh::cube(gpu),
            models: HashMap::new(),
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            warned_modes: HashSet::new(),
        }
    }

    /// Load every scene model and the skybox from the asset directory.
    ///
    /// Missing or broken models are logged and left out of the scene; the
    /// ground falls back to a flat plane so shadows still have somewhere to
    /// land. Returns the number of models loaded.
    pub fn load_assets(&mut self, gpu: &GpuContext, config: &AppConfig) -> usize {
        for object in DRAW_ORDER {
            let path = config.asset_path(object.model_path());
            match Model::load(gpu, &path, &self.materials) {
                Ok(model) => {
                    log::debug!("loaded {:?} from {}", object, path.display());
                    self.models.insert(object, model);
                }
                Err(e) if object == SceneObject::Ground => {
                    log::warn!("{}; using a flat ground plane", e);
                    let plane = Mesh::plane(gpu, FALLBACK_GROUND_SIZE);
                    self.models
                        .insert(object, Model::from_mesh(plane, &self.materials));
                }
                Err(e) => log::warn!("skipping {:?}: {}", object, e),
            }
        }

        let faces = config.skybox_faces.clone().map(|face| config.asset_path(face));
        let skybox = CubeTexture::from_files_or_fallback(gpu, &faces);
        self.skybox_bind_group = create_skybox_bind_group(gpu, &self.skybox_layout, &skybox);

        log::info!("{} of {} scene models loaded", self.models.len(), DRAW_ORDER.len());
        self.models.len()
    }

    /// Put `model` in the scene as `object`, replacing whatever was there.
    pub fn insert_model(&mut self, object: SceneObject, model: Model) {
        self.models.insert(object, model);
    }

    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    pub fn shadow_map(&self) -> &ShadowMap {
        &self.shadow
    }

    /// Record one frame into `encoder`, drawing to `target`.
    ///
    /// `target` must match the context's current size and color format.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        frame: &FrameContext,
        target: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        self.depth.ensure_size(gpu, "Scene Depth");
        self.write_uniforms(gpu, frame);

        {
            let mut pass = self.shadow.begin(encoder);
            for object in DRAW_ORDER {
                if let Some(model) = self.models.get(&object) {
                    self.render_object(&mut pass, model, object.slot(), PassKind::DepthOnly);
                }
            }
        }

        if frame.show_depth_map {
            self.render_depth_view(encoder, target);
        } else {
            self.render_lit(frame.polygon_mode, encoder, target);
        }
    }

    /// Bind `slot`'s uniforms and draw. The pipeline must already be set.
    pub fn render_object(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        drawable: &dyn Drawable,
        slot: usize,
        kind: PassKind,
    ) {
        pass.set_bind_group(1, &self.slots[slot].bind_group, &[]);
        drawable.draw(pass, kind);
    }

    fn write_uniforms(&self, gpu: &GpuContext, frame: &FrameContext) {
        let frame_uniforms = frame.frame_uniforms();
        gpu.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame_uniforms]));
        self.shadow.update(gpu, frame_uniforms.light_space_tr_matrix);

        for object in DRAW_ORDER {
            let uniforms = frame.object_uniforms(object);
            gpu.queue.write_buffer(
                &self.slots[object.slot()].buffer,
                0,
                bytemuck::cast_slice(&[uniforms]),
            );
        }
        gpu.queue.write_buffer(
            &self.slots[MARKER_SLOT].buffer,
            0,
            bytemuck::cast_slice(&[frame.light_marker_uniforms()]),
        );
    }

    fn lit_pipeline(&mut self, mode: PolygonMode) -> Option<&wgpu::RenderPipeline> {
        if !self.lit_pipelines.contains_key(&mode) && self.warned_modes.insert(mode) {
            log::warn!("{:?} polygon mode is not supported by this GPU, drawing filled", mode);
        }
        self.lit_pipelines
            .get(&mode)
            .or_else(|| self.lit_pipelines.get(&PolygonMode::Fill))
    }

    fn render_lit(
        &mut self,
        mode: PolygonMode,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        let Some(lit_pipeline) = self.lit_pipeline(mode).cloned() else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&lit_pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for object in DRAW_ORDER {
            if let Some(model) = self.models.get(&object) {
                self.render_object(&mut pass, model, object.slot(), PassKind::Lit);
            }
        }

        pass.set_pipeline(&self.light_cube_pipeline);
        self.render_object(&mut pass, &self.cube, MARKER_SLOT, PassKind::Lit);

        pass.set_pipeline(&self.skybox_pipeline);
        pass.set_bind_group(1, &self.skybox_bind_group, &[]);
        self.cube.draw(&mut pass, PassKind::Lit);
    }

    fn render_depth_view(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Depth View Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.screen_quad_pipeline);
        pass.set_bind_group(0, &self.screen_quad_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

struct MeshPipelineDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    polygon_mode: wgpu::PolygonMode,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

/// A pipeline over [`Vertex3d`] buffers drawing into the surface format with
/// the scene depth buffer.
fn create_mesh_pipeline(gpu: &GpuContext, desc: &MeshPipelineDesc) -> wgpu::RenderPipeline {
    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(desc.layout),
            vertex: wgpu::VertexState {
                module: desc.shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: desc.shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_mode,
                polygon_mode: desc.polygon_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: desc.depth_write,
                depth_compare: desc.depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

fn create_skybox_bind_group(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    skybox: &CubeTexture,
) -> wgpu::BindGroup {
    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Skybox Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&skybox.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&skybox.sampler),
            },
        ],
    })
}
