//! Pulse Saver - Main Entry Point
//!
//! A multi-display screensaver rendering a pulsing circle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pulse_saver::output::DisplayList;
use pulse_saver::settings::{ScreensaverSettings, WindowMode};
use pulse_saver::telemetry::{init_logging, LogConfig, LogGuard};
use pulse_saver::App;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Pulse Saver";

/// Application state machine
enum AppState {
    /// Initial state before window is created
    Uninitialized { settings: ScreensaverSettings },
    /// Window and graphics context are ready
    Running { app: App },
    /// Startup failed or the user dismissed the screensaver
    Finished,
}

/// Main application handler implementing winit's ApplicationHandler trait
struct SaverApp {
    state: AppState,
    next_redraw_at: Instant,
}

impl SaverApp {
    fn new(settings: ScreensaverSettings) -> Self {
        Self {
            state: AppState::Uninitialized { settings },
            next_redraw_at: Instant::now(),
        }
    }

    /// Attributes for the primary window
    fn primary_window_attributes(settings: &ScreensaverSettings, displays: &DisplayList) -> WindowAttributes {
        let base = WindowAttributes::default().with_title(WINDOW_TITLE);
        let preview_size = PhysicalSize::new(settings.preview_width, settings.preview_height);

        match (settings.window_mode, displays.primary()) {
            (WindowMode::Saver, Some(primary)) => base
                .with_decorations(false)
                .with_resizable(false)
                .with_position(PhysicalPosition::new(primary.area.x, primary.area.y))
                .with_inner_size(PhysicalSize::new(primary.area.width, primary.area.height)),
            (WindowMode::Saver, None) => {
                tracing::warn!("No display reported, opening a preview-sized window");
                base.with_inner_size(preview_size)
            }
            (WindowMode::Preview, _) => base.with_inner_size(preview_size).with_resizable(false),
        }
    }

    fn dismiss(&mut self, event_loop: &ActiveEventLoop, reason: &str) {
        tracing::info!("Dismissed: {}", reason);
        self.state = AppState::Finished;
        event_loop.exit();
    }
}

impl ApplicationHandler for SaverApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only initialize if we haven't already
        let AppState::Uninitialized { settings } = &self.state else {
            return;
        };
        let settings = settings.clone();

        let displays = DisplayList::query(event_loop);
        tracing::info!("Enumerated {} connected displays", displays.len());
        for info in displays.iter() {
            tracing::info!("  {}", info.summary());
        }

        let window_attributes = Self::primary_window_attributes(&settings, &displays);
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                self.state = AppState::Finished;
                event_loop.exit();
                return;
            }
        };

        if settings.window_mode == WindowMode::Saver {
            window.set_cursor_visible(false);
        }

        tracing::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        match pollster::block_on(App::new(window.clone(), settings)) {
            Ok(app) => {
                tracing::info!("Pulse Saver ready");
                window.request_redraw();
                self.state = AppState::Running { app };
            }
            Err(e) => {
                tracing::error!("Failed to initialize graphics: {}", e);
                self.state = AppState::Finished;
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let AppState::Running { app } = &mut self.state else {
            return;
        };

        let is_main = app.is_main_window(window_id);
        let is_secondary = app.is_secondary_window(window_id);
        if !is_main && !is_secondary {
            return;
        }

        let dismiss_reason = match event {
            WindowEvent::CloseRequested => Some("window closed"),
            WindowEvent::Resized(new_size) if is_main => {
                app.resize(event_loop, new_size);
                None
            }
            WindowEvent::Resized(new_size) => {
                app.resize_secondary(new_size);
                None
            }
            WindowEvent::RedrawRequested if is_main => {
                app.ensure_layout(event_loop);
                app.update();
                app.draw();
                None
            }
            WindowEvent::RedrawRequested => {
                app.draw_secondary();
                None
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                let is_escape = event.physical_key == PhysicalKey::Code(KeyCode::Escape);
                app.dismissal.on_key_pressed(is_escape).then_some("key pressed")
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => app.dismissal.on_mouse_button().then_some("mouse button"),
            WindowEvent::CursorMoved { position, .. } => {
                let window: Option<&Window> = if is_main {
                    Some(app.main_window())
                } else {
                    app.secondary_window().map(|w| w.as_ref())
                };
                let origin = window
                    .and_then(|w| w.inner_position().ok())
                    .unwrap_or_default();
                app.dismissal
                    .on_cursor_moved(origin.x as f64 + position.x, origin.y as f64 + position.y)
                    .then_some("mouse moved")
            }
            _ => None,
        };

        if let Some(reason) = dismiss_reason {
            self.dismiss(event_loop, reason);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Running { app } = &self.state else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        // VSYNC mode: let the display control timing via Fifo present mode
        if app.settings.vsync_enabled {
            app.request_redraws();
            event_loop.set_control_flow(ControlFlow::Poll);
            return;
        }

        // Integer nanoseconds to eliminate floating-point drift
        let target_fps = app.settings.target_fps.max(1);
        let frame_duration = Duration::from_nanos(1_000_000_000u64 / target_fps as u64);

        let now = Instant::now();
        if now < self.next_redraw_at {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_redraw_at));
            return;
        }

        app.request_redraws();
        self.next_redraw_at += frame_duration;

        // Reset if more than 2 frames behind
        if now > self.next_redraw_at + frame_duration * 2 {
            self.next_redraw_at = now + frame_duration;
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_redraw_at));
    }
}

fn main() {
    // Logging depends on the settings, so the load outcome is reported once it is up
    let loaded = ScreensaverSettings::load();
    let settings = loaded.settings.clone();

    // Keep the guard alive for the program duration
    let _log_guard: Option<LogGuard> = match init_logging(&LogConfig::from_settings(&settings)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("Pulse Saver v{}", env!("CARGO_PKG_VERSION"));
    loaded.report();
    tracing::info!(
        "Mode: {:?}, target FPS: {}, vsync: {}",
        settings.window_mode,
        settings.target_fps,
        settings.vsync_enabled
    );

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };

    // Default to sleeping; we explicitly schedule redraws in `about_to_wait`.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = SaverApp::new(settings);

    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
