use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::Window,
};

// Import from the library crate
use skyflight::{config::FlightConfig, controller, error::AppError, logging, model, view};

use controller::{FlightLoop, FrameRequester, InputEvent, InputState};
use model::Scene;
use view::{GpuContext, PendingTexture, Renderer};

/// winit's redraw request as a [`FrameRequester`]
struct RedrawRequester<'a>(&'a Window);

impl FrameRequester for RedrawRequester<'_> {
    fn request_next_frame(&mut self) -> bool {
        self.0.request_redraw();
        true
    }
}

struct App {
    window: Arc<Window>,
    renderer: Renderer,
    flight: FlightLoop,
    input_state: Rc<RefCell<InputState>>,
    skybox: PendingTexture,

    // Left-button drags stand in for touch on desktop
    dragging: bool,
    cursor: Option<(f32, f32)>,
}

impl App {
    async fn new(window: Arc<Window>, config: &FlightConfig) -> Result<Self, AppError> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone()).await?;
        let scene = Scene::bootstrap(config);
        let renderer = Renderer::new(gpu, &scene);
        let skybox = PendingTexture::spawn(scene.skybox.texture_source.clone());

        let input_state = Rc::new(RefCell::new(InputState::new()));
        let flight = FlightLoop::new(config, scene.subject.transform, size.width, size.height, input_state.clone());

        Ok(Self {
            window,
            renderer,
            flight,
            input_state,
            skybox,
            dragging: false,
            cursor: None,
        })
    }

    fn dispatch(&mut self, event: InputEvent) {
        self.input_state.borrow_mut().process_event(&event);
    }

    /// Translate window input; returns whether the event was consumed
    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    self.dispatch(InputEvent::KeyChanged { id: format!("{code:?}"), pressed });
                }
                true
            }
            WindowEvent::Touch(touch) => {
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => self.dispatch(InputEvent::TouchStarted { x, y }),
                    TouchPhase::Moved => self.dispatch(InputEvent::TouchMoved { x, y }),
                    TouchPhase::Ended | TouchPhase::Cancelled => {}
                }
                true
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.dragging = *state == ElementState::Pressed;
                if let (true, Some((x, y))) = (self.dragging, self.cursor) {
                    self.dispatch(InputEvent::TouchStarted { x, y });
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.cursor = Some((x, y));
                if self.dragging {
                    self.dispatch(InputEvent::TouchMoved { x, y });
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.dragging = false;
                self.dispatch(InputEvent::FocusLost);
                true
            }
            _ => false,
        }
    }

    fn redraw(&mut self) -> Result<(), AppError> {
        if let Some(image) = self.skybox.poll() {
            self.renderer.set_skybox_texture(image);
        }

        let mut result = Ok(());
        let renderer = &mut self.renderer;
        self.flight.frame(&mut RedrawRequester(&self.window), |output| {
            result = renderer.render(output);
        });
        result
    }
}

#[allow(deprecated)]
fn run() -> Result<(), AppError> {
    let config = FlightConfig::from_env()?;
    tracing::info!(strategy = %config.strategy, skybox = %config.skybox_source, "starting");

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Skyflight")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone(), &config))?;
    window.request_redraw();

    event_loop.run(move |event, elwt| {
        if let Event::WindowEvent { ref event, window_id } = event {
            if window_id != app.window.id() || app.input(event) {
                return;
            }
            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    app.flight.resize(physical_size.width, physical_size.height, &mut app.renderer);
                }
                WindowEvent::RedrawRequested => {
                    if let Err(e) = app.redraw() {
                        tracing::error!(frame = app.flight.frames_run(), "render failed: {e}");
                        elwt.exit();
                    }
                }
                _ => {}
            }
        }
    })?;

    tracing::info!("event loop finished");
    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
