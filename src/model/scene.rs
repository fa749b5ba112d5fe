use glam::Vec3;

use crate::config::{FlightConfig, InputStrategy};
use crate::model::Transform;
use crate::utils::{self, Mesh};

pub const SHIP_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const PLANE_COLOR: [f32; 4] = [0.2, 0.6, 1.0, 1.0];

/// The one object the player flies
pub struct SceneObject {
    pub mesh: Mesh,
    pub color: [f32; 4],
    pub transform: Transform,
}

/// Inside-out sphere textured with a distant background
pub struct Skybox {
    pub mesh: Mesh,
    pub radius: f32,
    pub texture_source: String,
}

pub struct DirectionalLight {
    pub position: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector from the scene origin towards the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

pub struct Scene {
    pub subject: SceneObject,
    pub skybox: Skybox,
    pub light: DirectionalLight,
}

impl Scene {
    /// Build the CPU side of the scene once at startup
    pub fn bootstrap(config: &FlightConfig) -> Self {
        let (mesh, color) = match config.strategy {
            InputStrategy::Keyboard => (utils::box_mesh(config.ship_size), SHIP_COLOR),
            InputStrategy::Touch => {
                let (width, depth) = config.plane_size;
                (utils::plane_mesh(width, depth), PLANE_COLOR)
            }
        };

        let skybox_mesh = utils::sphere_mesh(config.skybox_radius, config.skybox_segments, config.skybox_segments).inverted();

        tracing::debug!(
            strategy = %config.strategy,
            subject_triangles = mesh.triangle_count(),
            skybox_triangles = skybox_mesh.triangle_count(),
            "scene bootstrapped"
        );

        Self {
            subject: SceneObject { mesh, color, transform: Transform::default() },
            skybox: Skybox {
                mesh: skybox_mesh,
                radius: config.skybox_radius,
                texture_source: config.skybox_source.clone(),
            },
            light: DirectionalLight {
                position: config.light_position,
                intensity: config.light_intensity,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_strategy_flies_a_green_box() {
        let scene = Scene::bootstrap(&FlightConfig::default());
        assert_eq!(scene.subject.mesh.vertices.len(), 24);
        assert_eq!(scene.subject.color, SHIP_COLOR);
        assert_eq!(scene.subject.transform, Transform::default());
    }

    #[test]
    fn touch_strategy_flies_a_plane() {
        let config = FlightConfig { strategy: InputStrategy::Touch, ..FlightConfig::default() };
        let scene = Scene::bootstrap(&config);
        assert_eq!(scene.subject.mesh.triangle_count(), 2);
        assert_eq!(scene.subject.color, PLANE_COLOR);
    }

    #[test]
    fn skybox_encloses_the_scene() {
        let config = FlightConfig::default();
        let scene = Scene::bootstrap(&config);
        assert_eq!(scene.skybox.radius, 500.0);
        assert_eq!(scene.skybox.texture_source, config.skybox_source);
        assert!(scene.skybox.radius < config.camera.z_far);
        // Inside-out: normals face the centre
        let v = scene.skybox.mesh.vertices[40];
        assert!(Vec3::from_array(v.normal).dot(Vec3::from_array(v.pos)) < 0.0);
    }

    #[test]
    fn light_points_from_above_and_behind() {
        let scene = Scene::bootstrap(&FlightConfig::default());
        let dir = scene.light.direction();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.y > 0.0 && dir.z > 0.0);
        assert_eq!(scene.light.intensity, 1.0);
    }
}
