// CONTROLLER: Input, flight logic, and update loop
pub mod flight;
pub mod frame_loop;
pub mod input;
pub mod resize;

pub use flight::FlightController;
pub use frame_loop::{FixedFrames, FlightLoop, FrameOutput, FrameRequester};
pub use input::{InputEvent, InputProcessor, InputState, KeyBindings};
pub use resize::RenderTarget;
