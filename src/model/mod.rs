// MODEL: Scene contents and math
pub mod camera;
pub mod scene;
pub mod transform;

pub use camera::{Camera, CameraPose};
pub use scene::{DirectionalLight, Scene, SceneObject, Skybox};
pub use transform::Transform;
