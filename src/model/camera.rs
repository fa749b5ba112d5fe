use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Where the camera sits and what it looks at for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Chase pose: `offset` away from `target`, looking back at it
    pub fn follow(target: Vec3, offset: Vec3) -> Self {
        Self { eye: target + offset, target }
    }
}

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self {
            eye: config.follow_offset,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: config.z_near,
            z_far: config.z_far,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn apply_pose(&mut self, pose: CameraPose) {
        self.eye = pose.eye;
        self.target = pose.target;
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose { eye: self.eye, target: self.target }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFSET: Vec3 = Vec3::new(0.0, 2.0, 5.0);

    #[test]
    fn follow_pose_is_position_plus_offset() {
        for p in [Vec3::ZERO, Vec3::new(3.0, -1.0, -40.0), Vec3::new(-250.5, 8.0, 12.25)] {
            let pose = CameraPose::follow(p, OFFSET);
            assert_eq!(pose.eye, p + OFFSET);
            assert_eq!(pose.target, p);
            // Same input, same output
            assert_eq!(pose, CameraPose::follow(p, OFFSET));
        }
    }

    #[test]
    fn camera_looks_at_followed_point() {
        let mut cam = Camera::new(800, 600, &CameraConfig::default());
        let p = Vec3::new(10.0, 3.0, -20.0);
        cam.apply_pose(CameraPose::follow(p, OFFSET));

        let in_view = cam.view().transform_point3(p);
        assert!(in_view.x.abs() < 1e-4);
        assert!(in_view.y.abs() < 1e-4);
        assert!(in_view.z < 0.0);
        assert!((in_view.length() - OFFSET.length()).abs() < 1e-4);
    }

    #[test]
    fn followed_point_projects_to_screen_centre() {
        let mut cam = Camera::new(1920, 1080, &CameraConfig::default());
        let p = Vec3::new(-4.0, 0.5, 7.0);
        cam.apply_pose(CameraPose::follow(p, OFFSET));
        let ndc = cam.view_proj().project_point3(p);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn new_camera_uses_config_projection() {
        let cam = Camera::new(1000, 500, &CameraConfig::default());
        assert_eq!(cam.aspect, 2.0);
        assert!((cam.fov_y - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(cam.z_near, 0.1);
        assert_eq!(cam.z_far, 1000.0);
    }
}
