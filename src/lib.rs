// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, TouchEvent, Window};

    use crate::config::FlightConfig;
    use crate::controller::input::wasm::{keyboard_event_to_input, touch_event_to_input};
    use crate::controller::{FlightLoop, FrameRequester, InputEvent, InputProcessor, InputState};
    use crate::error::AppError;
    use crate::logging;
    use crate::model::Scene;
    use crate::view::{GpuContext, PendingTexture, Renderer};

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        run().await.map_err(|e| {
            tracing::error!("startup failed: {e}");
            JsValue::from(e)
        })
    }

    async fn run() -> Result<(), AppError> {
        let window = web_sys::window().ok_or_else(|| AppError::Dom("no global `window`".into()))?;
        let document = window.document().ok_or_else(|| AppError::Dom("no document on window".into()))?;
        let config = FlightConfig::from_location(&window)?;
        tracing::info!(strategy = %config.strategy, skybox = %config.skybox_source, "starting");

        let (width, height) = viewport_size(&window);
        let canvas = init_canvas(&document, &config.canvas_id, width, height)?;

        let gpu = GpuContext::new(&canvas, width, height).await?;
        let scene = Scene::bootstrap(&config);
        let mut renderer = Renderer::new(gpu, &scene);
        let skybox = PendingTexture::spawn(scene.skybox.texture_source.clone());

        let input_state = Rc::new(RefCell::new(InputState::new()));
        let mut flight = FlightLoop::new(&config, scene.subject.transform, width, height, input_state.clone());

        let pending_resize: Rc<Cell<Option<(u32, u32)>>> = Rc::new(Cell::new(None));
        setup_input_listeners(&window, &document, &canvas, input_state, flight.controller().processor().clone())?;
        setup_resize_listener(&window, &canvas, pending_resize.clone())?;

        AnimationFrames::start(window, move |frames| {
            if let Some((w, h)) = pending_resize.take() {
                flight.resize(w, h, &mut renderer);
            }
            if let Some(image) = skybox.poll() {
                renderer.set_skybox_texture(image);
            }
            flight.frame(frames, |output| {
                if let Err(e) = renderer.render(output) {
                    tracing::warn!(frame = output.frame, "render failed: {e}");
                }
            });
        })
    }

    fn viewport_size(window: &Window) -> (u32, u32) {
        let read = |v: Result<JsValue, JsValue>, fallback: f64| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
        let width = read(window.inner_width(), 800.0) as u32;
        let height = read(window.inner_height(), 600.0) as u32;
        (width.max(1), height.max(1))
    }

    /// Use the page's canvas when present, otherwise create one
    fn init_canvas(document: &Document, id: &str, width: u32, height: u32) -> Result<HtmlCanvasElement, AppError> {
        let canvas = match document.get_element_by_id(id) {
            Some(element) => element
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| AppError::Dom(format!("element #{id} is not a canvas")))?,
            None => {
                tracing::debug!(id, "canvas not found, creating one");
                let body = document.body().ok_or_else(|| AppError::Dom("no body on document".into()))?;
                let canvas = document
                    .create_element("canvas")?
                    .dyn_into::<HtmlCanvasElement>()
                    .map_err(|_| AppError::Dom("failed to create canvas".into()))?;
                canvas.set_id(id);
                body.append_child(&canvas)?;
                canvas
            }
        };
        canvas.set_width(width);
        canvas.set_height(height);
        Ok(canvas)
    }

    /// Keyboard on the document, touch on the canvas, focus loss on the window
    fn setup_input_listeners(
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        input_state: Rc<RefCell<InputState>>,
        processor: InputProcessor,
    ) -> Result<(), AppError> {
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let input_state = input_state.clone();
            let processor = processor.clone();
            let listener = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if processor.is_bound(&e.code()) {
                    e.prevent_default();
                }
                input_state.borrow_mut().process_event(&keyboard_event_to_input(&e, pressed));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())?;
            listener.forget();
        }

        for (event_name, started) in [("touchstart", true), ("touchmove", false)] {
            let input_state = input_state.clone();
            let listener = Closure::wrap(Box::new(move |e: TouchEvent| {
                // Keep the page from scrolling or zooming under the drag
                e.prevent_default();
                if let Some(event) = touch_event_to_input(&e, started) {
                    input_state.borrow_mut().process_event(&event);
                }
            }) as Box<dyn FnMut(TouchEvent)>);
            canvas.add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())?;
            listener.forget();
        }

        {
            let input_state = input_state.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                input_state.borrow_mut().process_event(&InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        {
            let document_vis = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                if document_vis.hidden() {
                    input_state.borrow_mut().process_event(&InputEvent::FocusLost);
                }
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        Ok(())
    }

    /// Resize the canvas immediately; the camera and surface follow on the next frame
    fn setup_resize_listener(
        window: &Window,
        canvas: &HtmlCanvasElement,
        pending_resize: Rc<Cell<Option<(u32, u32)>>>,
    ) -> Result<(), AppError> {
        let window_for_size = window.clone();
        let canvas = canvas.clone();
        let resize = Closure::wrap(Box::new(move |_e: Event| {
            let (width, height) = viewport_size(&window_for_size);
            canvas.set_width(width);
            canvas.set_height(height);
            pending_resize.set(Some((width, height)));
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
        Ok(())
    }

    /// `requestAnimationFrame` as a [`FrameRequester`]
    struct AnimationFrames {
        window: Window,
        callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    }

    impl FrameRequester for AnimationFrames {
        fn request_next_frame(&mut self) -> bool {
            match self.callback.borrow().as_ref() {
                Some(cb) => match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::error!("requestAnimationFrame failed: {e:?}");
                        false
                    }
                },
                None => false,
            }
        }
    }

    impl AnimationFrames {
        /// Schedule `on_frame` for the first animation frame. It is handed the
        /// requester so it can book the following one.
        fn start(window: Window, mut on_frame: impl FnMut(&mut AnimationFrames) + 'static) -> Result<(), AppError> {
            let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
            let mut frames = AnimationFrames { window: window.clone(), callback: callback.clone() };

            // The closure holds an Rc to its own slot, so it lives as long as the page
            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                on_frame(&mut frames);
            }) as Box<dyn FnMut()>));

            let mut first = AnimationFrames { window, callback };
            if first.request_next_frame() {
                Ok(())
            } else {
                Err(AppError::Dom("could not schedule the first animation frame".into()))
            }
        }
    }
}
