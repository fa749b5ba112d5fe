use crate::model::Camera;

/// Anything that owns a drawable surface sized in pixels
pub trait RenderTarget {
    fn resize_output(&mut self, width: u32, height: u32);
}

/// Recompute the camera aspect and resize the output.
///
/// Returns `false` for a zero-sized viewport (minimised window), which leaves
/// everything untouched.
pub fn handle_resize<T: RenderTarget + ?Sized>(camera: &mut Camera, target: &mut T, width: u32, height: u32) -> bool {
    if width == 0 || height == 0 {
        tracing::debug!(width, height, "ignoring zero-sized viewport");
        return false;
    }
    camera.set_aspect(width, height);
    target.resize_output(width, height);
    tracing::debug!(width, height, aspect = camera.aspect, "viewport resized");
    true
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::CameraConfig;

    /// Records every size it is given
    #[derive(Default)]
    pub(crate) struct RecordingTarget {
        pub sizes: Vec<(u32, u32)>,
    }

    impl RenderTarget for RecordingTarget {
        fn resize_output(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
    }

    #[test]
    fn aspect_and_size_follow_viewport() {
        let mut camera = Camera::new(800, 600, &CameraConfig::default());
        let mut target = RecordingTarget::default();

        assert!(handle_resize(&mut camera, &mut target, 1920, 1080));
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
        assert_eq!(target.sizes, vec![(1920, 1080)]);
    }

    #[test]
    fn result_is_independent_of_prior_state() {
        let mut a = Camera::new(300, 900, &CameraConfig::default());
        let mut b = Camera::new(4000, 10, &CameraConfig::default());
        let mut target = RecordingTarget::default();
        handle_resize(&mut a, &mut target, 1280, 720);
        handle_resize(&mut b, &mut target, 1280, 720);
        assert_eq!(a.aspect, b.aspect);
        assert_eq!(target.sizes, vec![(1280, 720), (1280, 720)]);
    }

    #[test]
    fn repeated_resize_is_idempotent() {
        let mut camera = Camera::new(800, 600, &CameraConfig::default());
        let mut target = RecordingTarget::default();
        handle_resize(&mut camera, &mut target, 640, 480);
        let aspect = camera.aspect;
        handle_resize(&mut camera, &mut target, 640, 480);
        assert_eq!(camera.aspect, aspect);
        assert_eq!(target.sizes.last(), Some(&(640, 480)));
    }

    #[test]
    fn zero_sized_viewport_is_ignored() {
        let mut camera = Camera::new(800, 600, &CameraConfig::default());
        let mut target = RecordingTarget::default();
        assert!(!handle_resize(&mut camera, &mut target, 0, 600));
        assert!(!handle_resize(&mut camera, &mut target, 800, 0));
        assert_eq!(camera.aspect, 800.0 / 600.0);
        assert!(target.sizes.is_empty());
    }
}
