//! Application state
//!
//! Owns the GPU context, the primary and companion window surfaces, the
//! placement controller and the pulse animation. The event loop in `main.rs`
//! forwards winit events here.

use std::sync::Arc;
use std::time::Instant;

use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::animation::Pulse;
use crate::gpu_context::{GpuContext, GpuError, WindowSurface};
use crate::input::InputDismissal;
use crate::output::{Area, Placement, PlacementController, WinitWindowService};
use crate::renderer::{self, CircleFrame, CircleRenderer, ScreenProjection};
use crate::settings::ScreensaverSettings;

/// Running screensaver
pub struct App {
    /// User settings (immutable while running)
    pub settings: ScreensaverSettings,
    /// Input tracking for dismissal
    pub dismissal: InputDismissal,

    main_window: Arc<Window>,
    gpu: GpuContext,
    main_surface: WindowSurface,
    renderer: CircleRenderer,
    pulse: Pulse,
    placement: PlacementController<Arc<Window>>,
    secondary_surface: Option<WindowSurface>,
    started_at: Instant,
}

impl App {
    /// Create GPU resources for the primary window
    pub async fn new(main_window: Arc<Window>, settings: ScreensaverSettings) -> Result<Self, GpuError> {
        let (gpu, main_surface) = GpuContext::new(main_window.clone(), settings.vsync_enabled).await?;

        let (width, height) = main_surface.size();
        let renderer = CircleRenderer::new(&gpu.device, main_surface.format(), width, height);

        Ok(Self {
            dismissal: InputDismissal::new(settings.dismiss_on_input, settings.mouse_move_threshold),
            pulse: Pulse::new(settings.pulse_amplitude),
            settings,
            main_window,
            gpu,
            main_surface,
            renderer,
            placement: PlacementController::default(),
            secondary_surface: None,
            started_at: Instant::now(),
        })
    }

    pub fn main_window(&self) -> &Arc<Window> {
        &self.main_window
    }

    pub fn is_main_window(&self, window_id: WindowId) -> bool {
        self.main_window.id() == window_id
    }

    pub fn secondary_window(&self) -> Option<&Arc<Window>> {
        self.placement.secondary_window()
    }

    pub fn is_secondary_window(&self, window_id: WindowId) -> bool {
        self.secondary_window().map(|w| w.id() == window_id).unwrap_or(false)
    }

    /// The drawing rectangle, once the first resize resolved it
    pub fn main_area(&self) -> Option<Area> {
        self.placement.layout().main_area()
    }

    /// Primary window resized.
    ///
    /// The first call decides the display layout; every call reconfigures
    /// the surface.
    pub fn resize(&mut self, event_loop: &ActiveEventLoop, new_size: PhysicalSize<u32>) {
        self.main_surface.resize(&self.gpu, new_size);

        let decided = {
            let mut service = WinitWindowService::new(event_loop, &self.main_window);
            self.placement.on_resize(&mut service, new_size.width, new_size.height)
        };

        match decided {
            Some(placement) => self.apply_placement(placement),
            None => {
                // After a multi-display placement the projection stays on the primary display
                if !self.placement.placement().map(|p| p.is_multi()).unwrap_or(false) {
                    let (width, height) = self.main_surface.size();
                    self.renderer.set_projection(ScreenProjection::top_left(width, height));
                }
            }
        }
    }

    /// Resolve the layout from the current window size if no resize arrived yet
    pub fn ensure_layout(&mut self, event_loop: &ActiveEventLoop) {
        if !self.placement.layout().is_resolved() {
            tracing::debug!("No resize before first frame, resolving layout from window size");
            let size = self.main_window.inner_size();
            self.resize(event_loop, size);
        }
    }

    fn apply_placement(&mut self, placement: Placement) {
        if let Placement::Multi {
            applied_main_size: Some((width, height)),
            ..
        } = placement
        {
            self.main_surface.resize(&self.gpu, PhysicalSize::new(width, height));
        }

        let main_area = placement.main_area();
        self.renderer
            .set_projection(ScreenProjection::top_left(main_area.width, main_area.height));

        // Windows just moved under the cursor
        self.dismissal.reset();

        let Some(window) = self.placement.secondary_window().cloned() else {
            return;
        };

        match WindowSurface::new(&self.gpu, window, self.settings.vsync_enabled) {
            Ok(surface) => self.secondary_surface = Some(surface),
            Err(e) => tracing::warn!("Secondary window has no surface: {}", e),
        }
    }

    /// Companion window resized
    pub fn resize_secondary(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(surface) = self.secondary_surface.as_mut() {
            surface.resize(&self.gpu, new_size);
        }
    }

    /// Seconds since the screensaver started
    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Advance the animation to the current time
    pub fn update(&mut self) {
        let elapsed = self.elapsed_secs();
        self.pulse.update(elapsed);
    }

    /// Render one frame into the primary window
    pub fn draw(&mut self) {
        let Some(main_area) = self.main_area() else {
            return;
        };

        let Some(surface_texture) = Self::acquire(&self.gpu, &self.main_surface, "primary") else {
            return;
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = CircleFrame {
            center: main_area.local_center(),
            radius: self.pulse.radius(),
            foreground: self.settings.foreground,
            background: self.settings.background,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Primary Window Encoder"),
            });

        self.renderer.render(&self.gpu.queue, &mut encoder, &view, &frame);

        self.main_window.pre_present_notify();
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Fill the companion window with its background color
    pub fn draw_secondary(&mut self) {
        let Some(surface) = self.secondary_surface.as_ref() else {
            return;
        };

        let Some(surface_texture) = Self::acquire(&self.gpu, surface, "secondary") else {
            return;
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Secondary Window Encoder"),
            });

        let background = self.placement.secondary_spec().background;
        renderer::clear_to(&mut encoder, &view, background.to_wgpu(surface.format()));

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Request a redraw of every window
    pub fn request_redraws(&self) {
        self.main_window.request_redraw();
        if let Some(window) = self.secondary_window() {
            window.request_redraw();
        }
    }

    fn acquire(gpu: &GpuContext, surface: &WindowSurface, which: &str) -> Option<wgpu::SurfaceTexture> {
        match surface.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Reconfiguring {} surface", which);
                surface.reconfigure(gpu);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to get {} window surface: {:?}", which, e);
                None
            }
        }
    }
}
