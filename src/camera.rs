//! Free-flying camera with an explicit orthonormal basis.
//!
//! [`Camera`] keeps `front`, `right` and `up` orthonormal at all times: they are
//! rebuilt on construction, on every [`Camera::rotate`] and on
//! [`Camera::reset_to_start`]. Translation never touches the basis.
//!
//! Angles are in degrees. Yaw −90° with pitch 0° looks down −Z.

use glam::{Mat4, Vec3};

/// Starting eye position used by [`Camera::default`] and [`Camera::reset_to_start`].
pub const START_EYE: Vec3 = Vec3::new(0.0, 0.0, 3.0);
/// Starting look-at target.
pub const START_TARGET: Vec3 = Vec3::new(0.0, 0.0, -10.0);
/// Starting up hint.
pub const START_UP: Vec3 = Vec3::Y;

/// Direction of a discrete camera move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// A first-person camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(START_EYE, START_TARGET, START_UP)
    }
}

impl Camera {
    /// Create a camera at `eye` looking toward `target`, with `up` as the roll hint.
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let front = (target - eye).normalize();
        let right = front.cross(up).normalize();
        let up = right.cross(front).normalize();
        Self {
            position: eye,
            target,
            front,
            right,
            up,
        }
    }

    /// Right-handed look-at from the eye along `front`, using world-up as the up hint.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, Vec3::Y)
    }

    /// Translate the eye by `speed` along one basis axis.
    pub fn move_in(&mut self, direction: MoveDirection, speed: f32) {
        let offset = match direction {
            MoveDirection::Forward => self.front * speed,
            MoveDirection::Backward => -self.front * speed,
            MoveDirection::Right => self.right * speed,
            MoveDirection::Left => -self.right * speed,
            MoveDirection::Up => self.up * speed,
            MoveDirection::Down => -self.up * speed,
        };
        self.position += offset;
        self.target += offset;
    }

    /// Point the camera along absolute `pitch` and `yaw` angles in degrees.
    pub fn rotate(&mut self, pitch: f32, yaw: f32) {
        let (pitch_sin, pitch_cos) = pitch.to_radians().sin_cos();
        let (yaw_sin, yaw_cos) = yaw.to_radians().sin_cos();

        self.front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();

        // Straight up or down: keep the horizontal right vector implied by yaw.
        let right = self.front.cross(Vec3::Y);
        self.right = if right.length_squared() > 1e-12 {
            right.normalize()
        } else {
            Vec3::new(-yaw_sin, 0.0, yaw_cos)
        };
        self.up = self.right.cross(self.front).normalize();
        self.target = self.position + self.front;
    }

    /// Return to the starting pose.
    pub fn reset_to_start(&mut self) {
        *self = Self::new(START_EYE, START_TARGET, START_UP);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }
}

/// Perspective projection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y: 45.0,
            near: 0.1,
            far: 1000.0,
            aspect: 1.0,
        };
        projection.resize(width, height);
        projection
    }

    /// Update the aspect ratio. Zero-sized windows (minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_orthonormal(camera: &Camera) {
        assert_relative_eq!(camera.front().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.up().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.front().dot(camera.right()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.front().dot(camera.up()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().dot(camera.up()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::default();
        assert_eq!(camera.position(), START_EYE);
        assert_relative_eq!(camera.front().z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.right().x, 1.0, epsilon = 1e-6);
        assert_orthonormal(&camera);
    }

    #[test]
    fn basis_stays_orthonormal_across_rotations() {
        let mut camera = Camera::default();
        for pitch in [-90.0, -89.0, -45.0, 0.0, 30.0, 89.0, 90.0] {
            for yaw in [-180.0, -90.0, 0.0, 45.0, 90.0, 270.0] {
                camera.rotate(pitch, yaw);
                assert_orthonormal(&camera);
                let expected = camera.position() + camera.front();
                assert_relative_eq!(camera.target().distance(expected), 0.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn rotate_matches_yaw_convention() {
        let mut camera = Camera::default();
        camera.rotate(0.0, -90.0);
        assert_relative_eq!(camera.front().z, -1.0, epsilon = 1e-6);
        camera.rotate(0.0, 0.0);
        assert_relative_eq!(camera.front().x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn move_changes_eye_by_speed_only() {
        let mut camera = Camera::default();
        camera.rotate(20.0, -60.0);
        let before = camera;

        for direction in [
            MoveDirection::Forward,
            MoveDirection::Backward,
            MoveDirection::Left,
            MoveDirection::Right,
            MoveDirection::Up,
            MoveDirection::Down,
        ] {
            let start = camera.position();
            camera.move_in(direction, 0.25);
            assert_relative_eq!(camera.position().distance(start), 0.25, epsilon = 1e-6);
            assert_eq!(camera.front(), before.front());
            assert_eq!(camera.right(), before.right());
            assert_eq!(camera.up(), before.up());
        }
    }

    #[test]
    fn move_follows_the_matching_basis_axis() {
        let mut camera = Camera::default();
        camera.rotate(20.0, -60.0);
        let (front, right, up) = (camera.front(), camera.right(), camera.up());

        for (direction, axis) in [
            (MoveDirection::Forward, front),
            (MoveDirection::Backward, -front),
            (MoveDirection::Left, -right),
            (MoveDirection::Right, right),
            (MoveDirection::Up, up),
            (MoveDirection::Down, -up),
        ] {
            let start = camera.position();
            camera.move_in(direction, 0.25);
            let delta = camera.position() - start;
            let expected = axis * 0.25;
            assert_relative_eq!(delta.x, expected.x, epsilon = 1e-6);
            assert_relative_eq!(delta.y, expected.y, epsilon = 1e-6);
            assert_relative_eq!(delta.z, expected.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn reset_restores_start_pose() {
        let mut camera = Camera::default();
        camera.rotate(45.0, 10.0);
        camera.move_in(MoveDirection::Right, 3.0);
        camera.reset_to_start();
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn projection_ignores_zero_size() {
        let mut projection = Projection::new(1024, 768);
        projection.resize(0, 0);
        assert_relative_eq!(projection.aspect, 1024.0 / 768.0);
    }
}
