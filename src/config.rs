use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use thiserror::Error;

/// Placeholder space texture; any reachable jpeg/png/webp works.
pub const DEFAULT_SKYBOX_URL: &str = "https://i.imgur.com/xyz.jpg";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown input strategy `{0}` (expected `keyboard` or `touch`)")]
    UnknownStrategy(String),

    #[error("unknown config key `{0}`")]
    UnknownKey(String),
}

/// Which of the two control schemes drives the flying object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputStrategy {
    /// Arrow keys move and turn a box-shaped ship
    #[default]
    Keyboard,
    /// Touch drags rotate a flat plane surface
    Touch,
}

impl FromStr for InputStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyboard" | "keys" => Ok(InputStrategy::Keyboard),
            "touch" => Ok(InputStrategy::Touch),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for InputStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputStrategy::Keyboard => f.write_str("keyboard"),
            InputStrategy::Touch => f.write_str("touch"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// World-space offset from the followed object to the eye
    pub follow_offset: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
            follow_offset: Vec3::new(0.0, 2.0, 5.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlightConfig {
    pub strategy: InputStrategy,
    /// Distance moved per frame while a thrust key is held
    pub move_step: f32,
    /// Radians turned per frame while a turn key is held
    pub turn_step: f32,
    /// Radians per pixel of touch drag
    pub touch_sensitivity: f32,
    pub camera: CameraConfig,
    pub canvas_id: String,
    pub skybox_source: String,
    pub skybox_radius: f32,
    pub skybox_segments: u32,
    pub light_position: Vec3,
    pub light_intensity: f32,
    pub ship_size: Vec3,
    pub plane_size: (f32, f32),
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            strategy: InputStrategy::default(),
            move_step: 0.1,
            turn_step: 0.05,
            touch_sensitivity: 0.01,
            camera: CameraConfig::default(),
            canvas_id: "gameCanvas".to_string(),
            skybox_source: DEFAULT_SKYBOX_URL.to_string(),
            skybox_radius: 500.0,
            skybox_segments: 32,
            light_position: Vec3::new(0.0, 10.0, 10.0),
            light_intensity: 1.0,
            ship_size: Vec3::new(1.0, 0.5, 2.0),
            plane_size: (2.0, 2.0),
        }
    }
}

impl FlightConfig {
    /// Apply one `key=value` override. Keys: `input`, `skybox`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "input" => self.strategy = value.parse()?,
            "skybox" => self.skybox_source = value.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Apply every present override, stopping at the first bad one
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, Option<String>)>,
    {
        for (key, value) in overrides {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                self.apply(key, &value)?;
            }
        }
        Ok(self)
    }

    /// Native: `SKYFLIGHT_INPUT` and `SKYFLIGHT_SKYBOX`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides([
            ("input", std::env::var("SKYFLIGHT_INPUT").ok()),
            ("skybox", std::env::var("SKYFLIGHT_SKYBOX").ok()),
        ])
    }

    /// Browser: `?input=touch&skybox=<url>`
    #[cfg(target_arch = "wasm32")]
    pub fn from_location(window: &web_sys::Window) -> Result<Self, crate::error::AppError> {
        let search = window.location().search()?;
        let params = web_sys::UrlSearchParams::new_with_str(&search)?;
        Ok(Self::default().with_overrides([
            ("input", params.get("input")),
            ("skybox", params.get("skybox")),
        ])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_constants() {
        let cfg = FlightConfig::default();
        assert_eq!(cfg.move_step, 0.1);
        assert_eq!(cfg.turn_step, 0.05);
        assert_eq!(cfg.touch_sensitivity, 0.01);
        assert_eq!(cfg.camera.follow_offset, Vec3::new(0.0, 2.0, 5.0));
        assert_eq!(cfg.canvas_id, "gameCanvas");
        assert_eq!(cfg.strategy, InputStrategy::Keyboard);
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Touch".parse::<InputStrategy>(), Ok(InputStrategy::Touch));
        assert_eq!(" keyboard ".parse::<InputStrategy>(), Ok(InputStrategy::Keyboard));
        assert_eq!(
            "gamepad".parse::<InputStrategy>(),
            Err(ConfigError::UnknownStrategy("gamepad".into()))
        );
    }

    #[test]
    fn overrides_skip_missing_and_empty_values() {
        let cfg = FlightConfig::default()
            .with_overrides([
                ("input", Some("touch".to_string())),
                ("skybox", Some(String::new())),
            ])
            .unwrap();
        assert_eq!(cfg.strategy, InputStrategy::Touch);
        assert_eq!(cfg.skybox_source, DEFAULT_SKYBOX_URL);

        let cfg = FlightConfig::default()
            .with_overrides([("skybox", Some("assets/stars.png".to_string())), ("input", None)])
            .unwrap();
        assert_eq!(cfg.skybox_source, "assets/stars.png");
        assert_eq!(cfg.strategy, InputStrategy::Keyboard);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut cfg = FlightConfig::default();
        assert_eq!(cfg.apply("speed", "2"), Err(ConfigError::UnknownKey("speed".into())));
    }

    #[test]
    fn strategy_display_round_trips() {
        for s in [InputStrategy::Keyboard, InputStrategy::Touch] {
            assert_eq!(s.to_string().parse::<InputStrategy>(), Ok(s));
        }
    }
}
