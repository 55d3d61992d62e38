//! # Glade
//!
//! **A real-time campsite scene rendered with wgpu, shadow mapping and a free-flying camera.**
//!
//! The scene is a fixed set of textured models lit by a rotating directional
//! light and two point lights. A depth pass from the directional light feeds
//! shadows into the lit pass. Keys drive small scripted animations: a
//! drifting boat, migrating ducks, an arrow, growing trees, a looping plane
//! and a guided camera tour.
//!
//! ## Quick Start
//!
//! ```no_run
//! use glade::AppConfig;
//!
//! fn main() -> glade::Result<()> {
//!     glade::run(AppConfig::new().title("Campsite").assets_dir("assets"))
//! }
//! ```
//!
//! ## Layout
//!
//! - **CPU state**: [`Camera`], [`LightState`], [`Animations`] and [`FrameContext`]
//!   hold everything that changes per frame and never touch the GPU.
//! - **GPU**: [`GpuContext`], [`SceneRenderer`] and [`ShadowMap`] turn a
//!   [`FrameContext`] into draw calls, windowed or headless.
//!
//! Separating the two lets the update step run and be tested without a device.

mod animation;
mod app;
mod camera;
mod config;
mod error;
mod frame;
mod geometry;
mod gpu;
mod input;
mod lighting;
mod mesh;
mod render_target;
mod renderer;
mod scene;
mod shadow;
mod texture;
mod transform;
mod uniforms;

pub use animation::{
    Animations, ArrowFlight, BoatOscillation, BoatPhase, CameraTour, DuckMigration, PlaneLoop,
    TourPhase, TreeScaling,
};
pub use app::run;
pub use camera::{Camera, MoveDirection, Projection, START_EYE, START_TARGET, START_UP};
pub use config::AppConfig;
pub use error::{ConfigError, Error, GeometryError, ReadbackError, Result, TextureError};
pub use frame::{FrameContext, PolygonMode};
pub use geometry::{Materials, Model, RawGeometry, RawModel, RawPart};
pub use gpu::GpuContext;
pub use input::{Action, ActionState, Input, KEY_BINDINGS, MouseLook, action_for};
pub use lighting::{LightState, PointLight};
pub use mesh::{Drawable, Mesh, PassKind, Vertex3d};
pub use render_target::{DEPTH_FORMAT, DepthTarget, RenderTarget, read_texture};
pub use renderer::SceneRenderer;
pub use scene::{DRAW_ORDER, SceneObject};
pub use shadow::ShadowMap;
pub use texture::{CubeTexture, Texture};
pub use transform::{ObjectTransform, normal_matrix};
pub use uniforms::{FrameUniforms, ObjectUniforms};

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3};

// Re-export the key codes used by the bindings
pub use winit::keyboard::KeyCode;
