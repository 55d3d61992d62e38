//! Error types for start-up and asset loading.
//!
//! Frame-time GPU errors are not represented here: they are captured with
//! wgpu error scopes and logged (see [`GpuContext::end_error_scopes`]).
//!
//! [`GpuContext::end_error_scopes`]: crate::GpuContext::end_error_scopes

use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::geometry::GeometryError;
pub use crate::render_target::ReadbackError;
pub use crate::texture::TextureError;

/// Top-level error returned by [`run`](crate::run) and GPU initialization.
#[derive(Error, Debug)]
pub enum Error {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("surface creation failed: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface does not support the adapter")]
    UnsupportedSurface,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type Result<T> = std::result::Result<T, Error>;
