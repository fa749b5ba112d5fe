use crate::config::{FlightConfig, InputStrategy};
use crate::controller::input::{InputProcessor, InputState};
use crate::model::Transform;

/// Turns held keys or touch drags into transform changes, one frame at a time
#[derive(Debug, Clone)]
pub struct FlightController {
    pub strategy: InputStrategy,
    pub move_step: f32,
    pub turn_step: f32,
    pub touch_sensitivity: f32,
    processor: InputProcessor,
}

impl FlightController {
    pub fn new(config: &FlightConfig, processor: InputProcessor) -> Self {
        Self {
            strategy: config.strategy,
            move_step: config.move_step,
            turn_step: config.turn_step,
            touch_sensitivity: config.touch_sensitivity,
            processor,
        }
    }

    pub fn from_config(config: &FlightConfig) -> Self {
        Self::new(config, InputProcessor::default())
    }

    pub fn processor(&self) -> &InputProcessor {
        &self.processor
    }

    /// Advance `transform` by one frame of input
    pub fn step(&self, transform: &mut Transform, input: &mut InputState) {
        // Always drain touch movement so it cannot pile up under the keyboard scheme
        let (dx, dy) = input.consume_look();
        match self.strategy {
            InputStrategy::Keyboard => self.apply_keys(transform, input),
            InputStrategy::Touch => self.apply_look(transform, dx, dy),
        }
    }

    pub fn apply_keys(&self, transform: &mut Transform, input: &InputState) {
        if self.processor.is_moving_forward(input) {
            transform.translate_forward(self.move_step);
        }
        if self.processor.is_moving_backward(input) {
            transform.translate_forward(-self.move_step);
        }
        if self.processor.is_turning_left(input) {
            transform.yaw += self.turn_step;
        }
        if self.processor.is_turning_right(input) {
            transform.yaw -= self.turn_step;
        }
    }

    pub fn apply_look(&self, transform: &mut Transform, dx: f32, dy: f32) {
        transform.yaw += dx * self.touch_sensitivity;
        transform.pitch += dy * self.touch_sensitivity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::keys;
    use glam::Vec3;
    use std::f32::consts::TAU;

    fn keyboard() -> FlightController {
        FlightController::from_config(&FlightConfig::default())
    }

    fn touch() -> FlightController {
        FlightController::from_config(&FlightConfig { strategy: InputStrategy::Touch, ..FlightConfig::default() })
    }

    fn hold(id: &str) -> InputState {
        let mut input = InputState::new();
        input.on_key_change(id, true);
        input
    }

    #[test]
    fn thrust_accumulates_linearly() {
        let flight = keyboard();
        let mut input = hold(keys::ARROW_UP);
        let mut t = Transform::default();
        let n = 250;
        for _ in 0..n {
            flight.step(&mut t, &mut input);
        }
        let expected = -(n as f32) * flight.move_step;
        assert!((t.position.z - expected).abs() < 1e-3, "z = {}", t.position.z);
        assert_eq!(t.position.x, 0.0);
        assert_eq!(t.position.y, 0.0);
    }

    #[test]
    fn reverse_thrust_moves_backwards() {
        let flight = keyboard();
        let mut input = hold(keys::ARROW_DOWN);
        let mut t = Transform::default();
        for _ in 0..10 {
            flight.step(&mut t, &mut input);
        }
        assert!((t.position.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn yaw_is_never_wrapped() {
        let flight = keyboard();
        let mut input = hold(keys::ARROW_LEFT);
        let mut t = Transform::default();
        for _ in 0..200 {
            flight.step(&mut t, &mut input);
        }
        assert!((t.yaw - 200.0 * 0.05).abs() < 1e-3);
        assert!(t.yaw > TAU);

        let mut input = hold(keys::ARROW_RIGHT);
        for _ in 0..400 {
            flight.step(&mut t, &mut input);
        }
        assert!((t.yaw + 10.0).abs() < 1e-3);
    }

    #[test]
    fn opposite_keys_cancel() {
        let flight = keyboard();
        let mut input = hold(keys::ARROW_LEFT);
        input.on_key_change(keys::ARROW_RIGHT, true);
        let mut t = Transform::default();
        flight.step(&mut t, &mut input);
        assert_eq!(t.yaw, 0.0);
    }

    #[test]
    fn thrust_follows_heading() {
        let flight = keyboard();
        let mut input = hold(keys::ARROW_UP);
        let mut t = Transform { yaw: std::f32::consts::FRAC_PI_2, ..Transform::default() };
        flight.step(&mut t, &mut input);
        assert!(t.position.abs_diff_eq(Vec3::new(-0.1, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn released_keys_do_nothing() {
        let flight = keyboard();
        let mut input = InputState::new();
        let mut t = Transform::at(Vec3::new(1.0, 2.0, 3.0));
        let before = t;
        flight.step(&mut t, &mut input);
        assert_eq!(t, before);
    }

    #[test]
    fn touch_delta_scales_into_orientation() {
        let flight = touch();
        let mut input = InputState::new();
        let mut t = Transform::default();

        input.on_touch_start(200.0, 300.0);
        input.on_touch_move(250.0, 280.0);
        flight.step(&mut t, &mut input);
        assert_eq!(t.yaw, 50.0 * 0.01);
        assert_eq!(t.pitch, -20.0 * 0.01);

        // Next move measured from (250, 280), not from the start point
        input.on_touch_move(260.0, 280.0);
        let yaw_before = t.yaw;
        flight.step(&mut t, &mut input);
        assert!((t.yaw - yaw_before - 0.1).abs() < 1e-6);
    }

    #[test]
    fn keyboard_scheme_discards_touch() {
        let flight = keyboard();
        let mut input = InputState::new();
        input.on_touch_start(0.0, 0.0);
        input.on_touch_move(100.0, 100.0);
        let mut t = Transform::default();
        flight.step(&mut t, &mut input);
        assert_eq!(t, Transform::default());
        assert_eq!(input.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn touch_scheme_ignores_keys() {
        let flight = touch();
        let mut input = hold(keys::ARROW_UP);
        let mut t = Transform::default();
        flight.step(&mut t, &mut input);
        assert_eq!(t, Transform::default());
    }
}
