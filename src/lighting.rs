//! Directional and point lights.
//!
//! The shadow pass and the lit pass both derive the light direction from
//! [`LightState::rotated_direction`], so the shadows always line up with the
//! shading regardless of the light angle.

use glam::{Mat3, Mat4, Vec3};

/// A fixed point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

impl PointLight {
    /// Position in camera space.
    pub fn view_space_position(&self, view: Mat4) -> Vec3 {
        view.transform_point3(self.position)
    }
}

/// The scene's light rig: one rotating directional light and two point lights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightState {
    /// Unrotated world-space direction toward the light.
    pub direction: Vec3,
    pub color: Vec3,
    /// Rotation about world-up in degrees, kept in `[0, 360)`.
    pub angle: f32,
    /// Blue lantern light.
    pub point: PointLight,
    /// Magenta light above the wolf.
    pub wolf: PointLight,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 1.0, 3.0),
            color: Vec3::ONE,
            angle: 0.0,
            point: PointLight {
                position: Vec3::new(2.8, 0.5, 0.6),
                color: Vec3::new(0.0, 0.0, 1.0),
            },
            wolf: PointLight {
                position: Vec3::new(0.0, 2.0, -5.0),
                color: Vec3::new(1.0, 0.0, 1.0),
            },
        }
    }
}

impl LightState {
    pub const SHADOW_HALF_EXTENT: f32 = 7.0;
    pub const SHADOW_NEAR: f32 = 0.1;
    pub const SHADOW_FAR: f32 = 50.0;
    /// Edge length of the light marker cube.
    pub const MARKER_SCALE: f32 = 0.05;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate the directional light about world-up.
    pub fn rotate_by(&mut self, delta_degrees: f32) {
        self.angle = (self.angle + delta_degrees).rem_euclid(360.0);
    }

    pub fn rotation(&self) -> Mat4 {
        Mat4::from_rotation_y(self.angle.to_radians())
    }

    /// World-space direction toward the light after applying the current angle.
    pub fn rotated_direction(&self) -> Vec3 {
        Mat3::from_rotation_y(self.angle.to_radians()) * self.direction
    }

    /// Orthographic projection from the light looking at the origin.
    pub fn light_space_matrix(&self) -> Mat4 {
        let e = Self::SHADOW_HALF_EXTENT;
        let projection =
            Mat4::orthographic_rh(-e, e, -e, e, Self::SHADOW_NEAR, Self::SHADOW_FAR);
        let view = Mat4::look_at_rh(self.rotated_direction(), Vec3::ZERO, Vec3::Y);
        projection * view
    }

    /// Light direction in camera space, transformed as a normal.
    pub fn view_space_direction(&self, view: Mat4) -> Vec3 {
        let normal_matrix = Mat3::from_mat4(view).inverse().transpose();
        normal_matrix * self.rotated_direction()
    }

    /// Model matrix for the small cube that marks the light.
    pub fn marker_transform(&self) -> Mat4 {
        self.rotation()
            * Mat4::from_translation(self.direction)
            * Mat4::from_scale(Vec3::splat(Self::MARKER_SCALE))
    }
}
