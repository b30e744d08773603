//! Window service backed by winit
//!
//! Borrowed for the duration of a single placement decision: it needs the
//! active event loop to enumerate monitors and create windows, and the
//! primary window to move it and to own the companion window.

use std::sync::Arc;

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowLevel};

use super::display::{Area, DisplayInfo, DisplayList};
use super::placement::{SecondaryWindowSpec, WindowService, WindowServiceError};

/// Native window operations for one event-loop turn
pub struct WinitWindowService<'a> {
    event_loop: &'a ActiveEventLoop,
    main_window: &'a Window,
}

impl<'a> WinitWindowService<'a> {
    pub fn new(event_loop: &'a ActiveEventLoop, main_window: &'a Window) -> Self {
        Self {
            event_loop,
            main_window,
        }
    }

    /// Move, resize and optionally pin a window above all others.
    ///
    /// Returns the inner size when the platform applied it synchronously.
    fn place(window: &Window, area: Area, topmost: bool) -> Option<PhysicalSize<u32>> {
        window.set_outer_position(PhysicalPosition::new(area.x, area.y));
        let applied = window.request_inner_size(PhysicalSize::new(area.width, area.height));
        if let Some(size) = applied {
            tracing::debug!("Window resized immediately to {}x{}", size.width, size.height);
        }
        if topmost {
            window.set_window_level(WindowLevel::AlwaysOnTop);
        }
        window.set_visible(true);
        applied
    }

    #[cfg(target_os = "windows")]
    fn main_hwnd(&self) -> Result<winit::platform::windows::HWND, WindowServiceError> {
        use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};

        let handle = self
            .main_window
            .window_handle()
            .map_err(|_| WindowServiceError::NoOwnerHandle)?;
        match handle.as_raw() {
            RawWindowHandle::Win32(h) => Ok(h.hwnd.get()),
            _ => Err(WindowServiceError::NoOwnerHandle),
        }
    }

    #[cfg(target_os = "windows")]
    fn platform_attributes(&self, attrs: WindowAttributes, spec: &SecondaryWindowSpec) -> WindowAttributes {
        use winit::platform::windows::WindowAttributesExtWindows;

        let mut attrs = attrs
            .with_class_name(spec.class_name)
            .with_skip_taskbar(spec.skip_taskbar);

        if spec.owned_by_main {
            match self.main_hwnd() {
                Ok(hwnd) => attrs = attrs.with_owner_window(hwnd),
                Err(e) => tracing::warn!("Creating secondary window without owner: {}", e),
            }
        }

        attrs
    }

    #[cfg(not(target_os = "windows"))]
    fn platform_attributes(&self, attrs: WindowAttributes, spec: &SecondaryWindowSpec) -> WindowAttributes {
        if spec.owned_by_main {
            tracing::debug!(
                "Window ownership not supported on this platform, '{}' is independent",
                spec.title
            );
        }
        attrs
    }
}

impl WindowService for WinitWindowService<'_> {
    type Handle = Arc<Window>;

    fn enumerate_displays(&self) -> DisplayList {
        DisplayList::query(self.event_loop)
    }

    fn primary_display(&self) -> Option<DisplayInfo> {
        self.event_loop
            .primary_monitor()
            .map(|monitor| DisplayInfo::from_monitor(&monitor, true))
    }

    fn move_main_window(&mut self, area: Area, topmost: bool) -> Option<(u32, u32)> {
        tracing::debug!("Moving primary window to {}", area);
        Self::place(self.main_window, area, topmost).map(|size| (size.width, size.height))
    }

    fn register_window_class(&mut self, spec: &SecondaryWindowSpec) -> Result<(), WindowServiceError> {
        // winit registers the class itself when the window is created
        if spec.class_name.is_empty() {
            return Err(WindowServiceError::ClassRejected("empty class name".to_string()));
        }
        tracing::debug!("Window class '{}' ready", spec.class_name);
        Ok(())
    }

    fn create_secondary_window(
        &mut self,
        spec: &SecondaryWindowSpec,
        area: Area,
    ) -> Result<Arc<Window>, WindowServiceError> {
        let attrs = WindowAttributes::default()
            .with_title(spec.title)
            .with_decorations(spec.decorations)
            .with_resizable(false)
            .with_visible(false)
            .with_position(PhysicalPosition::new(area.x, area.y))
            .with_inner_size(PhysicalSize::new(area.width, area.height));
        let attrs = self.platform_attributes(attrs, spec);

        let window = self
            .event_loop
            .create_window(attrs)
            .map_err(|e| WindowServiceError::CreateFailed(e.to_string()))?;

        tracing::info!("Secondary window created at {}", area);
        Ok(Arc::new(window))
    }

    fn show_window(&mut self, handle: &Arc<Window>, area: Area, topmost: bool) {
        Self::place(handle, area, topmost);
        handle.request_redraw();
    }
}
