/// Platform-agnostic input handling
use std::collections::HashMap;

/// Key identifiers follow `KeyboardEvent.code`; winit's `KeyCode` debug names match them
pub mod keys {
    pub const ARROW_UP: &str = "ArrowUp";
    pub const ARROW_DOWN: &str = "ArrowDown";
    pub const ARROW_LEFT: &str = "ArrowLeft";
    pub const ARROW_RIGHT: &str = "ArrowRight";
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyChanged { id: String, pressed: bool },
    TouchStarted { x: f32, y: f32 },
    TouchMoved { x: f32, y: f32 },
    /// Window blur or page hidden; key-up events may never arrive
    FocusLost,
}

/// Latest known state of every input the flight controls read
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashMap<String, bool>,
    touch_origin: Option<(f32, f32)>,
    look_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the touch delta for `TouchMoved`, `None` otherwise
    pub fn process_event(&mut self, event: &InputEvent) -> Option<(f32, f32)> {
        match event {
            InputEvent::KeyChanged { id, pressed } => {
                self.on_key_change(id, *pressed);
                None
            }
            InputEvent::TouchStarted { x, y } => {
                self.on_touch_start(*x, *y);
                None
            }
            InputEvent::TouchMoved { x, y } => Some(self.on_touch_move(*x, *y)),
            InputEvent::FocusLost => {
                self.clear_keys();
                None
            }
        }
    }

    pub fn on_key_change(&mut self, id: &str, pressed: bool) {
        match self.keys.get_mut(id) {
            Some(state) => *state = pressed,
            None => {
                self.keys.insert(id.to_string(), pressed);
            }
        }
    }

    pub fn on_touch_start(&mut self, x: f32, y: f32) {
        self.touch_origin = Some((x, y));
    }

    /// Delta from the previous touch point, which `(x, y)` then replaces.
    /// A move without a preceding start only sets the reference point.
    pub fn on_touch_move(&mut self, x: f32, y: f32) -> (f32, f32) {
        let delta = match self.touch_origin {
            Some((ox, oy)) => (x - ox, y - oy),
            None => (0.0, 0.0),
        };
        self.touch_origin = Some((x, y));
        self.look_delta.0 += delta.0;
        self.look_delta.1 += delta.1;
        delta
    }

    pub fn is_pressed(&self, id: &str) -> bool {
        self.keys.get(id).copied().unwrap_or(false)
    }

    pub fn touch_origin(&self) -> Option<(f32, f32)> {
        self.touch_origin
    }

    pub fn clear_keys(&mut self) {
        self.keys.values_mut().for_each(|pressed| *pressed = false);
    }

    /// Take the touch movement accumulated since the last call
    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub turn_left: String,
    pub turn_right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: keys::ARROW_UP.to_string(),
            backward: keys::ARROW_DOWN.to_string(),
            turn_left: keys::ARROW_LEFT.to_string(),
            turn_right: keys::ARROW_RIGHT.to_string(),
        }
    }
}

/// Answers "which flight command is active" against a set of bindings
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        input.is_pressed(&self.bindings.forward)
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        input.is_pressed(&self.bindings.backward)
    }

    pub fn is_turning_left(&self, input: &InputState) -> bool {
        input.is_pressed(&self.bindings.turn_left)
    }

    pub fn is_turning_right(&self, input: &InputState) -> bool {
        input.is_pressed(&self.bindings.turn_right)
    }

    /// Bound keys should not also scroll the page
    pub fn is_bound(&self, id: &str) -> bool {
        let b = &self.bindings;
        [&b.forward, &b.backward, &b.turn_left, &b.turn_right].iter().any(|k| k.as_str() == id)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, TouchEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, pressed: bool) -> InputEvent {
        InputEvent::KeyChanged { id: e.code(), pressed }
    }

    /// First contact point only; `None` when the event carries no touches
    pub fn touch_event_to_input(e: &TouchEvent, started: bool) -> Option<InputEvent> {
        let touch = e.touches().get(0)?;
        let (x, y) = (touch.client_x() as f32, touch.client_y() as f32);
        Some(if started {
            InputEvent::TouchStarted { x, y }
        } else {
            InputEvent::TouchMoved { x, y }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str, pressed: bool) -> InputEvent {
        InputEvent::KeyChanged { id: id.to_string(), pressed }
    }

    #[test]
    fn key_state_follows_latest_event() {
        let mut input = InputState::new();
        let events = [
            key(keys::ARROW_UP, true),
            key(keys::ARROW_LEFT, true),
            key(keys::ARROW_UP, false),
            key(keys::ARROW_UP, true),
            key(keys::ARROW_LEFT, false),
        ];
        for e in &events {
            input.process_event(e);
        }
        assert!(input.is_pressed(keys::ARROW_UP));
        assert!(!input.is_pressed(keys::ARROW_LEFT));
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut input = InputState::new();
        input.on_key_change(keys::ARROW_DOWN, true);
        input.on_key_change(keys::ARROW_DOWN, true);
        assert!(input.is_pressed(keys::ARROW_DOWN));
        input.on_key_change(keys::ARROW_DOWN, false);
        assert!(!input.is_pressed(keys::ARROW_DOWN));
    }

    #[test]
    fn unknown_keys_read_as_released() {
        let input = InputState::new();
        assert!(!input.is_pressed("KeyQ"));
        assert!(!input.is_pressed(""));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = InputState::new();
        input.process_event(&key(keys::ARROW_UP, true));
        input.process_event(&key(keys::ARROW_RIGHT, true));
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.is_pressed(keys::ARROW_UP));
        assert!(!input.is_pressed(keys::ARROW_RIGHT));
    }

    #[test]
    fn touch_move_is_relative_to_last_point() {
        let mut input = InputState::new();
        assert_eq!(input.process_event(&InputEvent::TouchStarted { x: 100.0, y: 50.0 }), None);

        let first = input.process_event(&InputEvent::TouchMoved { x: 130.0, y: 40.0 });
        assert_eq!(first, Some((30.0, -10.0)));
        assert_eq!(input.touch_origin(), Some((130.0, 40.0)));

        let second = input.process_event(&InputEvent::TouchMoved { x: 120.0, y: 45.0 });
        assert_eq!(second, Some((-10.0, 5.0)));
    }

    #[test]
    fn touch_start_resets_reference() {
        let mut input = InputState::new();
        input.on_touch_start(0.0, 0.0);
        input.on_touch_move(10.0, 10.0);
        input.on_touch_start(500.0, 500.0);
        assert_eq!(input.on_touch_move(505.0, 498.0), (5.0, -2.0));
    }

    #[test]
    fn move_without_start_only_sets_reference() {
        let mut input = InputState::new();
        assert_eq!(input.on_touch_move(42.0, 7.0), (0.0, 0.0));
        assert_eq!(input.on_touch_move(45.0, 7.0), (3.0, 0.0));
    }

    #[test]
    fn look_delta_accumulates_until_consumed() {
        let mut input = InputState::new();
        input.on_touch_start(0.0, 0.0);
        input.on_touch_move(4.0, 1.0);
        input.on_touch_move(6.0, -2.0);
        assert_eq!(input.consume_look(), (6.0, -2.0));
        assert_eq!(input.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn processor_uses_bindings() {
        let processor = InputProcessor::new(KeyBindings {
            forward: "KeyW".into(),
            ..KeyBindings::default()
        });
        let mut input = InputState::new();
        input.on_key_change(keys::ARROW_UP, true);
        assert!(!processor.is_moving_forward(&input));
        input.on_key_change("KeyW", true);
        assert!(processor.is_moving_forward(&input));
        assert!(processor.is_bound("KeyW"));
        assert!(processor.is_bound(keys::ARROW_LEFT));
        assert!(!processor.is_bound(keys::ARROW_UP));
    }
}
