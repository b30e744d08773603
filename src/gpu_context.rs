//! Shared GPU context for multi-window rendering
//!
//! Provides `GpuContext` for shared GPU resources (device, queue, adapter)
//! and `WindowSurface` for per-window surface resources.
//!
//! The primary window and the companion window share a single device;
//! each keeps its own surface.

use std::sync::Arc;
use winit::window::Window;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors while acquiring GPU resources
#[derive(Debug)]
pub enum GpuError {
    Surface(wgpu::CreateSurfaceError),
    NoAdapter,
    Device(wgpu::RequestDeviceError),
    NoSurfaceFormat,
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::Surface(e) => write!(f, "Failed to create surface: {}", e),
            GpuError::NoAdapter => write!(f, "Failed to find suitable GPU adapter"),
            GpuError::Device(e) => write!(f, "Failed to create device: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "Surface reports no supported formats"),
        }
    }
}

impl std::error::Error for GpuError {}

// ═══════════════════════════════════════════════════════════════════════════════
// GPU CONTEXT — Shared GPU resources
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared GPU resources that can be used across multiple windows.
pub struct GpuContext {
    /// The wgpu instance
    pub instance: wgpu::Instance,
    /// The selected GPU adapter
    pub adapter: wgpu::Adapter,
    /// The GPU device for creating resources
    pub device: wgpu::Device,
    /// The command queue for submitting GPU work
    pub queue: wgpu::Queue,
    /// The preferred surface format (typically sRGB)
    pub surface_format: wgpu::TextureFormat,
}

impl GpuContext {
    /// Create a new GPU context and the surface for the primary window.
    ///
    /// The window is used to pick a compatible adapter; the returned surface
    /// is configured for it.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<(Self, WindowSurface), GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(GpuError::Surface)?;

        // A screensaver has no reason to wake the discrete GPU
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        tracing::info!("Using GPU: {}", adapter.get_info().name);
        tracing::info!("Backend: {:?}", adapter.get_info().backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Pulse Saver Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(GpuError::Device)?;

        let surface_caps = surface.get_capabilities(&adapter);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        tracing::info!("Surface format: {:?}", surface_format);

        let gpu = Self {
            instance,
            adapter,
            device,
            queue,
            surface_format,
        };
        let main_surface = WindowSurface::configure(&gpu, surface, &window, vsync);

        Ok((gpu, main_surface))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WINDOW SURFACE — Per-window rendering resources
// ═══════════════════════════════════════════════════════════════════════════════

/// Choose a present mode: Fifo with vsync, otherwise the lowest-latency available
pub fn choose_present_mode(available: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    if available.contains(&wgpu::PresentMode::Mailbox) {
        wgpu::PresentMode::Mailbox
    } else if available.contains(&wgpu::PresentMode::Immediate) {
        wgpu::PresentMode::Immediate
    } else {
        wgpu::PresentMode::Fifo
    }
}

/// Per-window surface used for presenting.
pub struct WindowSurface {
    /// The wgpu surface for this window
    pub surface: wgpu::Surface<'static>,
    /// Surface configuration
    pub config: wgpu::SurfaceConfiguration,
}

impl WindowSurface {
    /// Create a new window surface for the given window.
    ///
    /// Uses the shared GpuContext for device/adapter access.
    pub fn new(gpu: &GpuContext, window: Arc<Window>, vsync: bool) -> Result<Self, GpuError> {
        let surface = gpu
            .instance
            .create_surface(window.clone())
            .map_err(GpuError::Surface)?;
        Ok(Self::configure(gpu, surface, &window, vsync))
    }

    fn configure(gpu: &GpuContext, surface: wgpu::Surface<'static>, window: &Window, vsync: bool) -> Self {
        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&gpu.adapter);

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: gpu.surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: choose_present_mode(&surface_caps.present_modes, vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&gpu.device, &config);

        Self { surface, config }
    }

    /// Resize the window surface.
    pub fn resize(&mut self, gpu: &GpuContext, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&gpu.device, &self.config);
        }
    }

    /// Re-apply the current configuration (after a lost/outdated surface)
    pub fn reconfigure(&self, gpu: &GpuContext) {
        self.surface.configure(&gpu.device, &self.config);
    }

    /// Get the current surface size.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vsync_forces_fifo() {
        let modes = [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox];
        assert_eq!(choose_present_mode(&modes, true), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn test_present_mode_preference() {
        let all = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Immediate,
            wgpu::PresentMode::Mailbox,
        ];
        assert_eq!(choose_present_mode(&all, false), wgpu::PresentMode::Mailbox);
        assert_eq!(
            choose_present_mode(&[wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate], false),
            wgpu::PresentMode::Immediate
        );
        assert_eq!(choose_present_mode(&[wgpu::PresentMode::Fifo], false), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn test_gpu_error_display() {
        assert_eq!(GpuError::NoAdapter.to_string(), "Failed to find suitable GPU adapter");
    }
}
