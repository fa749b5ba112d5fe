use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::config::ConfigError;

/// Everything that can stop the demo from starting or drawing a frame
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to create render surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to fetch asset: {0}")]
    Fetch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

impl From<JsValue> for AppError {
    fn from(value: JsValue) -> Self {
        AppError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_transparent() {
        let err = AppError::from(ConfigError::UnknownStrategy("mouse".into()));
        assert_eq!(err.to_string(), ConfigError::UnknownStrategy("mouse".into()).to_string());
    }

    #[test]
    fn fetch_error_mentions_cause() {
        let err = AppError::Fetch("HTTP 404".into());
        assert!(err.to_string().contains("HTTP 404"));
    }
}
