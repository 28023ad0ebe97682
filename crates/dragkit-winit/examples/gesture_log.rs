//! Logs gestures recognized on two window regions.
//!
//! The window is not drawn. The left half is a "palette" that only reacts to
//! clicks and double clicks; the right half is a "canvas" that tracks drags.
//! Hold Ctrl/Cmd while dragging to see additive drags.
//!
//! Run with `RUST_LOG=info cargo run -p dragkit-winit --example gesture_log`.
//! Set `DRAGKIT_DOUBLE_CLICK_MS` to change the double-click window.

use dragkit_winit::dragkit::{
    self, Document, GestureHandler, GestureRecognizer, MouseButton, Rect,
};
use dragkit_winit::PointerRouter;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

const WINDOW_SIZE: (f32, f32) = (800.0, 500.0);

struct GestureLogApp {
    window: Option<Window>,
    router: PointerRouter,
    // Kept alive for as long as the app runs; dropping detaches them
    _recognizers: Vec<GestureRecognizer>,
}

impl GestureLogApp {
    fn new() -> Self {
        let document = Document::new();
        let palette = document.create_element("palette");
        let canvas = document.create_element("canvas");

        let mut router = PointerRouter::new(document);
        let (width, height) = WINDOW_SIZE;
        router.add_region(
            Rect::from_min_size([0.0, 0.0], [width / 2.0, height]),
            palette.clone(),
        );
        router.add_region(
            Rect::from_min_size([width / 2.0, 0.0], [width / 2.0, height]),
            canvas.clone(),
        );

        let mut palette_recognizer = GestureRecognizer::new();
        palette_recognizer.attach(
            &palette,
            GestureHandler::new()
                .on_activate(|event| event.button == MouseButton::Left)
                .on_click(|event| log::info!("palette: click at {:?}", event.position))
                .on_double_click(|event| {
                    log::info!("palette: double click at {:?}", event.position)
                }),
        );

        let mut canvas_recognizer = GestureRecognizer::new();
        canvas_recognizer.attach(
            &canvas,
            GestureHandler::new()
                .on_activate(|event| {
                    log::info!(
                        "canvas: activated at {:?} (additive: {})",
                        event.position,
                        GestureRecognizer::is_additive(event)
                    );
                    true
                })
                .on_drag_move(|_, coords| {
                    log::debug!("canvas: delta {:?} offset {:?}", coords.delta, coords.offset)
                })
                .on_drag_end(|_, coords| {
                    log::info!(
                        "canvas: drag from {:?} to {:?}",
                        coords.activation,
                        coords.current
                    )
                })
                .on_click(|event| log::info!("canvas: click at {:?}", event.position))
                .with_prevent_default(true),
        );

        Self {
            window: None,
            router,
            _recognizers: vec![palette_recognizer, canvas_recognizer],
        }
    }
}

impl ApplicationHandler for GestureLogApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = WINDOW_SIZE;
        let window_attributes = Window::default_attributes()
            .with_title("dragkit - gesture log")
            .with_resizable(false)
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));

        match event_loop.create_window(window_attributes) {
            Ok(window) => self.window = Some(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }

        self.router.handle_window_event(&event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.router.advance_timers(Instant::now());

        // Sleep until the next deferred click is due
        match self.router.next_timer_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if let Ok(millis) = std::env::var("DRAGKIT_DOUBLE_CLICK_MS") {
        match millis.parse::<u64>() {
            Ok(millis) => dragkit::set_double_click_timeout(Duration::from_millis(millis)),
            Err(err) => log::warn!("ignoring DRAGKIT_DOUBLE_CLICK_MS={millis:?}: {err}"),
        }
    }
    log::info!(
        "double-click window: {:?}",
        dragkit::double_click_timeout()
    );

    let event_loop = EventLoop::new()?;
    let mut app = GestureLogApp::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
