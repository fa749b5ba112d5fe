use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::config::FlightConfig;
use crate::controller::flight::FlightController;
use crate::controller::input::InputState;
use crate::controller::resize::{self, RenderTarget};
use crate::model::{Camera, CameraPose, Transform};

/// The host's "call me again next frame" capability
pub trait FrameRequester {
    /// Schedule another frame. `false` means no further frame will come.
    fn request_next_frame(&mut self) -> bool;
}

/// Grants a fixed number of frames, then stops
#[derive(Debug, Clone, Copy)]
pub struct FixedFrames {
    remaining: u64,
}

impl FixedFrames {
    pub fn new(frames: u64) -> Self {
        Self { remaining: frames }
    }
}

impl FrameRequester for FixedFrames {
    fn request_next_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput {
    pub frame: u64,
    pub model: Mat4,
    pub view_proj: Mat4,
    pub camera_eye: Vec3,
}

/// Owns the simulation state and runs the per-frame update
pub struct FlightLoop {
    pub transform: Transform,
    pub camera: Camera,
    input: Rc<RefCell<InputState>>,
    controller: FlightController,
    camera_offset: Vec3,
    frame: u64,
}

impl FlightLoop {
    pub fn new(config: &FlightConfig, transform: Transform, width: u32, height: u32, input: Rc<RefCell<InputState>>) -> Self {
        let mut camera = Camera::new(width, height, &config.camera);
        camera.apply_pose(CameraPose::follow(transform.position, config.camera.follow_offset));

        Self {
            transform,
            camera,
            input,
            controller: FlightController::from_config(config),
            camera_offset: config.camera.follow_offset,
            frame: 0,
        }
    }

    pub fn input(&self) -> &Rc<RefCell<InputState>> {
        &self.input
    }

    pub fn controller(&self) -> &FlightController {
        &self.controller
    }

    pub fn frames_run(&self) -> u64 {
        self.frame
    }

    /// Per-frame update: input → transform → camera pose
    pub fn update(&mut self) -> FrameOutput {
        self.controller.step(&mut self.transform, &mut self.input.borrow_mut());
        self.camera.apply_pose(CameraPose::follow(self.transform.position, self.camera_offset));
        self.frame += 1;

        if self.frame % 600 == 0 {
            tracing::trace!(
                frame = self.frame,
                x = self.transform.position.x,
                y = self.transform.position.y,
                z = self.transform.position.z,
                yaw = self.transform.yaw,
                "flight state"
            );
        }

        FrameOutput {
            frame: self.frame,
            model: self.transform.model_matrix(),
            view_proj: self.camera.view_proj(),
            camera_eye: self.camera.eye,
        }
    }

    /// One host callback: book the next frame, then update and render this one.
    /// Returns whether a next frame was granted.
    pub fn frame<R, F>(&mut self, requester: &mut R, render: F) -> bool
    where
        R: FrameRequester + ?Sized,
        F: FnOnce(&FrameOutput),
    {
        let scheduled = requester.request_next_frame();
        let output = self.update();
        render(&output);
        scheduled
    }

    /// Drive frames for as long as `requester` grants them; returns how many ran
    pub fn run<R, F>(&mut self, requester: &mut R, mut render: F) -> u64
    where
        R: FrameRequester + ?Sized,
        F: FnMut(&FrameOutput),
    {
        let mut frames = 0;
        while requester.request_next_frame() {
            let output = self.update();
            render(&output);
            frames += 1;
        }
        frames
    }

    pub fn resize<T: RenderTarget + ?Sized>(&mut self, width: u32, height: u32, target: &mut T) -> bool {
        resize::handle_resize(&mut self.camera, target, width, height)
    }
}
