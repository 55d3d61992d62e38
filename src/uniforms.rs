//! GPU uniform layouts shared by the scene shaders.
//!
//! Field names mirror the WGSL struct members in `shaders/scene.wgsl`.

use glam::{Mat3, Mat4, Vec3};

/// Per-frame uniforms: camera, projection and the light rig (group 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_space_tr_matrix: [[f32; 4]; 4],
    /// View-space direction toward the directional light.
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    /// View-space position of the lantern light.
    pub point_light_source: [f32; 4],
    pub point_light_color: [f32; 4],
    /// View-space position of the wolf light.
    pub wolf_light_source: [f32; 4],
    pub wolf_light_color: [f32; 4],
}

/// Per-object uniforms (group 1).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of view·model, padded to a 4×4 for alignment.
    pub normal_matrix: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn new(model: Mat4, normal_matrix: Mat3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal_matrix).to_cols_array_2d(),
        }
    }
}

pub(crate) fn vec4(v: Vec3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}
