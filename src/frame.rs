//! Per-frame scene state and the update step.
//!
//! [`FrameContext`] owns everything that changes from frame to frame. The
//! window loop feeds it an [`ActionState`] once per frame via
//! [`FrameContext::update`], then hands it by reference to the renderer.

use glam::Mat4;

use crate::animation::Animations;
use crate::camera::{Camera, MoveDirection, Projection};
use crate::config::AppConfig;
use crate::input::{Action, ActionState, MouseLook};
use crate::lighting::LightState;
use crate::scene::SceneObject;
use crate::transform::normal_matrix;
use crate::uniforms::{FrameUniforms, ObjectUniforms, vec4};

/// Rasterization mode for the lit pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

impl From<PolygonMode> for wgpu::PolygonMode {
    fn from(mode: PolygonMode) -> Self {
        match mode {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
            PolygonMode::Point => wgpu::PolygonMode::Point,
        }
    }
}

const MOVES: [(Action, MoveDirection); 6] = [
    (Action::MoveForward, MoveDirection::Forward),
    (Action::MoveBackward, MoveDirection::Backward),
    (Action::MoveLeft, MoveDirection::Left),
    (Action::MoveRight, MoveDirection::Right),
    (Action::MoveUp, MoveDirection::Up),
    (Action::MoveDown, MoveDirection::Down),
];

/// Degrees the light turns per frame while J or K is held.
const LIGHT_STEP: f32 = 1.0;

pub struct FrameContext {
    pub camera: Camera,
    pub mouse_look: MouseLook,
    pub lights: LightState,
    pub animations: Animations,
    pub projection: Projection,
    pub camera_speed: f32,
    pub show_depth_map: bool,
    pub polygon_mode: PolygonMode,
    pub quit_requested: bool,
}

impl FrameContext {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            camera: Camera::default(),
            mouse_look: MouseLook::new(config.mouse_sensitivity, config.pitch_limit),
            lights: LightState::new(),
            animations: Animations::new(),
            projection: Projection::new(config.width, config.height),
            camera_speed: config.camera_speed,
            show_depth_map: config.show_depth_map,
            polygon_mode: PolygonMode::Fill,
            quit_requested: false,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Apply one frame of input, then advance every animation by one frame.
    pub fn update(&mut self, actions: &ActionState) {
        if let Some((pitch, yaw)) = self.mouse_look.apply(actions.mouse_delta) {
            self.camera.rotate(pitch, yaw);
        }

        for (action, direction) in MOVES {
            if actions.active(action) {
                self.camera.move_in(direction, self.camera_speed);
            }
        }

        if actions.active(Action::RotateLightLeft) {
            self.lights.rotate_by(LIGHT_STEP);
        }
        if actions.active(Action::RotateLightRight) {
            self.lights.rotate_by(-LIGHT_STEP);
        }

        for (action, mode) in [
            (Action::Wireframe, PolygonMode::Line),
            (Action::Points, PolygonMode::Point),
            (Action::Fill, PolygonMode::Fill),
        ] {
            if actions.active(action) && self.polygon_mode != mode {
                log::info!("polygon mode {:?}", mode);
                self.polygon_mode = mode;
            }
        }

        if actions.active(Action::StartTour) {
            self.animations.tour.start(&mut self.camera);
            self.mouse_look.reset();
        }

        if actions.active(Action::ToggleDepthMap) {
            self.show_depth_map = !self.show_depth_map;
            log::info!("depth map view {}", if self.show_depth_map { "on" } else { "off" });
        }

        if actions.active(Action::GrowTrees) {
            self.animations.trees.grow();
        }
        if actions.active(Action::ShrinkTrees) {
            self.animations.trees.shrink();
        }
        if actions.active(Action::ShootArrow) {
            self.animations.arrow.shoot();
        }
        if actions.active(Action::CancelArrow) {
            self.animations.arrow.cancel();
        }
        if actions.active(Action::MigrateDucks) {
            self.animations.ducks.trigger();
        }
        if actions.active(Action::TogglePlane) {
            self.animations.plane.toggle();
        }
        if actions.active(Action::Quit) {
            self.quit_requested = true;
        }

        self.animations.tick(1, &mut self.camera, self.camera_speed);
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    /// Camera and light uniforms for the lit pass.
    pub fn frame_uniforms(&self) -> FrameUniforms {
        let view = self.view_matrix();
        let lights = &self.lights;
        FrameUniforms {
            view: view.to_cols_array_2d(),
            projection: self.projection.matrix().to_cols_array_2d(),
            light_space_tr_matrix: lights.light_space_matrix().to_cols_array_2d(),
            light_dir: vec4(lights.view_space_direction(view)),
            light_color: vec4(lights.color),
            point_light_source: vec4(lights.point.view_space_position(view)),
            point_light_color: vec4(lights.point.color),
            wolf_light_source: vec4(lights.wolf.view_space_position(view)),
            wolf_light_color: vec4(lights.wolf.color),
        }
    }

    /// Model and normal matrices for one scene object.
    pub fn object_uniforms(&self, object: SceneObject) -> ObjectUniforms {
        self.uniforms_for(object.transform(&self.animations))
    }

    /// Uniforms for the cube that marks the directional light.
    pub fn light_marker_uniforms(&self) -> ObjectUniforms {
        self.uniforms_for(self.lights.marker_transform())
    }

    fn uniforms_for(&self, model: Mat4) -> ObjectUniforms {
        ObjectUniforms::new(model, normal_matrix(self.view_matrix(), model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};

    fn context() -> FrameContext {
        FrameContext::new(&AppConfig::default())
    }

    #[test]
    fn held_movement_moves_one_step_per_frame() {
        let mut frame = context();
        let actions = ActionState::default().with(Action::MoveForward);
        for _ in 0..10 {
            frame.update(&actions);
        }
        assert_relative_eq!(frame.camera.position().z, 3.0 - 0.2, epsilon = 1e-5);
    }

    #[test]
    fn mouse_motion_rotates_the_camera() {
        let mut frame = context();
        frame.update(&ActionState::default().with_mouse_delta(Vec2::new(900.0, 0.0)));
        // yaw -90 + 90 = 0 looks down +X.
        assert_relative_eq!(frame.camera.front().x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn light_keys_turn_the_light() {
        let mut frame = context();
        frame.update(&ActionState::default().with(Action::RotateLightRight));
        assert_relative_eq!(frame.lights.angle, 359.0);
        frame.update(&ActionState::default().with(Action::RotateLightLeft));
        frame.update(&ActionState::default().with(Action::RotateLightLeft));
        assert_relative_eq!(frame.lights.angle, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn starting_the_tour_resets_look_angles() {
        let mut frame = context();
        frame.update(&ActionState::default().with_mouse_delta(Vec2::new(300.0, 120.0)));
        frame.update(&ActionState::default().with(Action::StartTour));
        assert_eq!(frame.mouse_look.yaw, MouseLook::START_YAW);
        assert_eq!(frame.mouse_look.pitch, MouseLook::START_PITCH);
        // The first tour step happens in the same frame.
        assert_relative_eq!(frame.camera.position().z, 3.0 - 0.02, epsilon = 1e-6);
        assert_relative_eq!(frame.camera.front().z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn toggles_flip_state() {
        let mut frame = context();
        let toggle = ActionState::default().with(Action::ToggleDepthMap);
        frame.update(&toggle);
        assert!(frame.show_depth_map);
        frame.update(&toggle);
        assert!(!frame.show_depth_map);

        frame.update(&ActionState::default().with(Action::Wireframe));
        assert_eq!(frame.polygon_mode, PolygonMode::Line);
        frame.update(&ActionState::default().with(Action::Fill));
        assert_eq!(frame.polygon_mode, PolygonMode::Fill);

        frame.update(&ActionState::default().with(Action::Quit));
        assert!(frame.quit_requested);
    }

    #[test]
    fn uniforms_use_view_space_lights() {
        let frame = context();
        let uniforms = frame.frame_uniforms();
        // Camera at z=3 looking down -Z: the lantern light is 2.4 in front of it.
        assert_relative_eq!(uniforms.point_light_source[2], 0.6 - 3.0, epsilon = 1e-5);
        let dir = Vec3::from_slice(&uniforms.light_dir[..3]);
        let expected = Vec3::new(0.0, 1.0, 3.0).normalize();
        assert_relative_eq!(dir.normalize().dot(expected), 1.0, epsilon = 1e-5);
    }
}
