use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position and orientation of the flying object.
///
/// Yaw turns about world Y, pitch about the object's own X axis. Neither
/// angle is wrapped or clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Local forward axis (-Z) in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn translate_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_faces_negative_z() {
        let t = Transform::default();
        assert!(t.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn quarter_turn_left_faces_negative_x() {
        let t = Transform { yaw: FRAC_PI_2, ..Transform::default() };
        assert!(t.forward().abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn positive_pitch_noses_up() {
        let t = Transform { pitch: 0.3, ..Transform::default() };
        assert!(t.forward().y > 0.0);
    }

    #[test]
    fn translate_moves_along_heading() {
        let mut t = Transform { yaw: FRAC_PI_2, ..Transform::at(Vec3::new(1.0, 2.0, 3.0)) };
        t.translate_forward(2.0);
        assert!(t.position.abs_diff_eq(Vec3::new(-1.0, 2.0, 3.0), 1e-5));
    }

    #[test]
    fn model_matrix_places_origin_at_position() {
        let t = Transform { yaw: 1.0, pitch: -0.2, position: Vec3::new(4.0, -1.0, 7.0) };
        let origin = t.model_matrix().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(t.position, 1e-6));
    }
}
