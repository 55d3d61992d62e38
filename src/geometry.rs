//! Model loading: Wavefront OBJ files into GPU-ready [`Model`]s.
//!
//! Loading happens in two steps. [`RawModel::load`] parses a file into plain
//! vertex data with no GPU involvement, and [`Model::upload`] turns that into
//! buffers plus one material bind group per part.
//!
//! | Format | Extensions | Notes |
//! |--------|------------|-------|
//! | OBJ    | `.obj`     | Triangulated on load, diffuse texture from the `.mtl` |

use std::path::{Path, PathBuf};

use glam::Vec3;
use thiserror::Error;

use crate::gpu::GpuContext;
use crate::mesh::{Drawable, Mesh, PassKind, Vertex3d};
use crate::texture::Texture;

/// Errors that can occur when loading geometry.
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Unknown geometry format: '{0}'")]
    UnknownFormat(String),

    #[error("OBJ parse error in {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("{0} contains no triangles")]
    Empty(PathBuf),
}

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recompute smooth normals by averaging the area-weighted normals of
    /// every triangle sharing a vertex.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let face_normal = (p1 - p0).cross(p2 - p0);
            for i in [i0, i1, i2] {
                normals[i] += face_normal;
            }
        }

        for (v, n) in self.vertices.iter_mut().zip(normals) {
            v.normal = n.normalize_or_zero().into();
        }
    }

    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

/// One mesh of a model together with the diffuse texture it asks for.
#[derive(Clone, Debug, Default)]
pub struct RawPart {
    pub geometry: RawGeometry,
    /// Absolute or model-relative path to the diffuse texture, if the material names one.
    pub diffuse_texture: Option<PathBuf>,
}

/// A parsed model file with no GPU resources yet.
#[derive(Clone, Debug, Default)]
pub struct RawModel {
    pub parts: Vec<RawPart>,
}

impl RawModel {
    /// Load an OBJ model. Files with any other extension are rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        if ext != "obj" {
            return Err(GeometryError::UnknownFormat(ext));
        }

        let model = Self::load_obj(path)?;

        if model.parts.iter().all(|p| p.geometry.indices.is_empty()) {
            return Err(GeometryError::Empty(path.to_path_buf()));
        }
        Ok(model)
    }

    fn load_obj(path: &Path) -> Result<Self, GeometryError> {
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, materials) =
            tobj::load_obj(path, &options).map_err(|source| GeometryError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("{}: materials unavailable: {}", path.display(), e);
            Vec::new()
        });
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let parts = models
            .into_iter()
            .map(|model| {
                let diffuse_texture = model
                    .mesh
                    .material_id
                    .and_then(|id| materials.get(id))
                    .and_then(|material| material.diffuse_texture.as_deref())
                    .filter(|name| !name.is_empty())
                    .map(|name| base_dir.join(name));
                RawPart {
                    geometry: obj_geometry(&model.mesh),
                    diffuse_texture,
                }
            })
            .collect();

        Ok(Self { parts })
    }
}

fn obj_geometry(mesh: &tobj::Mesh) -> RawGeometry {
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

    let vertices = (0..vertex_count)
        .map(|i| {
            let position = [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ];
            let normal = if has_normals {
                [
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                ]
            } else {
                [0.0, 0.0, 0.0]
            };
            // OBJ puts v = 0 at the bottom of the image.
            let uv = if has_uvs {
                [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0, 0.0]
            };
            Vertex3d::new(position, normal, uv)
        })
        .collect();

    let mut geometry = RawGeometry::new(vertices, mesh.indices.clone());
    if !has_normals {
        geometry.recalculate_normals();
    }
    geometry
}

/// Material bind groups (group 2 of the lit pipeline): a diffuse texture and its sampler.
pub struct Materials {
    layout: wgpu::BindGroupLayout,
    default: wgpu::BindGroup,
}

impl Materials {
    pub fn new(gpu: &GpuContext) -> Self {
        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
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

        let white = Texture::solid(gpu, [255, 255, 255, 255], "Default White Texture");
        let default = Self::create(gpu, &layout, &white);
        Self { layout, default }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Bind group for untextured parts.
    pub fn default_bind_group(&self) -> &wgpu::BindGroup {
        &self.default
    }

    pub fn bind(&self, gpu: &GpuContext, texture: &Texture) -> wgpu::BindGroup {
        Self::create(gpu, &self.layout, texture)
    }

    fn create(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }
}

struct ModelPart {
    mesh: Mesh,
    material: wgpu::BindGroup,
}

/// A loaded model: one or more meshes, each with its material.
pub struct Model {
    parts: Vec<ModelPart>,
}

impl Model {
    /// Upload parsed geometry and textures. Textures that fail to load fall
    /// back to plain white.
    pub fn upload(gpu: &GpuContext, raw: &RawModel, materials: &Materials) -> Self {
        let parts = raw
            .parts
            .iter()
            .filter(|part| !part.geometry.indices.is_empty())
            .map(|part| {
                let material = match &part.diffuse_texture {
                    Some(path) => match Texture::from_file(gpu, path) {
                        Ok(texture) => materials.bind(gpu, &texture),
                        Err(e) => {
                            log::warn!("{}", e);
                            materials.default_bind_group().clone()
                        }
                    },
                    None => materials.default_bind_group().clone(),
                };
                ModelPart {
                    mesh: part.geometry.upload(gpu),
                    material,
                }
            })
            .collect();
        Self { parts }
    }

    /// Load and upload a model file.
    pub fn load(
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        materials: &Materials,
    ) -> Result<Self, GeometryError> {
        let raw = RawModel::load(path)?;
        Ok(Self::upload(gpu, &raw, materials))
    }

    /// Wrap a built-in mesh with the default material.
    pub fn from_mesh(mesh: Mesh, materials: &Materials) -> Self {
        Self {
            parts: vec![ModelPart {
                mesh,
                material: materials.default_bind_group().clone(),
            }],
        }
    }
}

impl Drawable for Model {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, kind: PassKind) {
        for part in &self.parts {
            if kind == PassKind::Lit {
                pass.set_bind_group(2, &part.material, &[]);
            }
            part.mesh.draw(pass, kind);
        }
    }
}
