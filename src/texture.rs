use std::path::Path;

use thiserror::Error;

use crate::gpu::GpuContext;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("cube face {face} is {got:?}, expected {expected:?}")]
    FaceSizeMismatch {
        face: usize,
        got: (u32, u32),
        expected: (u32, u32),
    },
}

fn load_rgba(path: &Path) -> Result<image::RgbaImage, TextureError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| TextureError::Image {
            path: path.display().to_string(),
            source,
        })
}

/// A 2D texture with its sampler, ready to bind to a material slot.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl Texture {
    /// Create a texture from raw sRGB RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Model textures tile, so wrap rather than clamp.
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = load_rgba(path)?;
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(gpu, &img, width, height, &path.display().to_string()))
    }

    /// A 1×1 texture of a single color.
    pub fn solid(gpu: &GpuContext, rgba: [u8; 4], label: &str) -> Self {
        Self::from_rgba(gpu, &rgba, 1, 1, label)
    }
}

/// Six square images uploaded as one cube texture, for the skybox.
pub struct CubeTexture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl CubeTexture {
    /// Sky color used when the face images are unavailable.
    pub const FALLBACK: [u8; 4] = [135, 170, 215, 255];

    /// Load faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn from_files<P: AsRef<Path>>(
        gpu: &GpuContext,
        faces: &[P; 6],
    ) -> Result<Self, TextureError> {
        let mut size = None;
        let mut data = Vec::new();
        for (face, path) in faces.iter().enumerate() {
            let img = load_rgba(path.as_ref())?;
            let dims = img.dimensions();
            match size {
                None => size = Some(dims),
                Some(expected) if expected != dims => {
                    return Err(TextureError::FaceSizeMismatch {
                        face,
                        got: dims,
                        expected,
                    });
                }
                Some(_) => {}
            }
            data.extend_from_slice(&img);
        }
        let (width, height) = size.unwrap_or((1, 1));
        Ok(Self::from_rgba(gpu, &data, width, height))
    }

    /// Load the faces, falling back to a flat sky color if any of them fails.
    pub fn from_files_or_fallback<P: AsRef<Path>>(gpu: &GpuContext, faces: &[P; 6]) -> Self {
        Self::from_files(gpu, faces).unwrap_or_else(|e| {
            log::warn!("skybox unavailable, using a flat sky: {}", e);
            Self::solid(gpu, Self::FALLBACK)
        })
    }

    pub fn solid(gpu: &GpuContext, rgba: [u8; 4]) -> Self {
        let data: Vec<u8> = std::iter::repeat_n(rgba, 6).flatten().collect();
        Self::from_rgba(gpu, &data, 1, 1)
    }

    fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some("Skybox Cube Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 6,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Skybox Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Skybox Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}
