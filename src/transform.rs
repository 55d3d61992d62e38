use glam::{Mat3, Mat4, Vec3};

/// A model matrix built from authored operations.
///
/// Operations compose left to right, each post-multiplied onto the matrix so
/// far, which means the last operation written is the first one applied to
/// the vertices:
///
/// ```
/// use glade::ObjectTransform;
/// use glam::Vec3;
///
/// // Scale, then translate, then rotate about Y.
/// let model = ObjectTransform::new()
///     .rotate(-5.0, Vec3::Y)
///     .translate(Vec3::new(0.8, -0.6, 1.5))
///     .scale(1.5)
///     .matrix();
/// # let _ = model;
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectTransform {
    matrix: Mat4,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl ObjectTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(mut self, offset: Vec3) -> Self {
        self.matrix *= Mat4::from_translation(offset);
        self
    }

    /// Rotate by `degrees` about `axis`. The axis does not need to be normalized.
    pub fn rotate(mut self, degrees: f32, axis: Vec3) -> Self {
        self.matrix *= Mat4::from_axis_angle(axis.normalize(), degrees.to_radians());
        self
    }

    pub fn scale(mut self, factor: f32) -> Self {
        self.matrix *= Mat4::from_scale(Vec3::splat(factor));
        self
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

/// Inverse-transpose of `view * model`, for transforming normals into camera space.
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3 {
    Mat3::from_mat4(view * model).inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn operations_apply_last_first() {
        let model = ObjectTransform::new()
            .translate(Vec3::new(1.0, 0.0, 0.0))
            .scale(2.0)
            .matrix();
        let p = model.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 3.0);
    }

    #[test]
    fn rotation_normalizes_axis() {
        let a = ObjectTransform::new().rotate(30.0, Vec3::new(0.0, 4.0, 0.0)).matrix();
        let b = ObjectTransform::new().rotate(30.0, Vec3::Y).matrix();
        assert!(a.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_nonuniform_scale() {
        let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        let view = Mat4::IDENTITY;
        // Surface x = y has normal (1, -1, 0); a tangent is (1, 1, 0).
        let tangent = model.transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        let normal = normal_matrix(view, model) * Vec3::new(1.0, -1.0, 0.0);
        assert_relative_eq!(tangent.dot(normal), 0.0, epsilon = 1e-5);
    }
}
