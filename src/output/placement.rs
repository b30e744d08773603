//! One-shot display placement
//!
//! On the first resize of the primary window the controller decides whether
//! this is a real run on a multi-display desktop or a single-display (or
//! preview) session. In the multi-display case it snaps the primary window
//! onto the primary display and opens a borderless companion window over the
//! secondary display. The decision is taken exactly once per process; later
//! resize events only reconfigure surfaces.
//!
//! All native window work goes through [`WindowService`] so the decision logic
//! can be exercised against a recording double.

use super::display::{Area, DisplayInfo, DisplayList};
use crate::settings::Rgb;

// ═══════════════════════════════════════════════════════════════════════════════
// WINDOW SERVICE — Native windowing capability
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from native window operations. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowServiceError {
    /// The primary window's native handle could not be obtained
    NoOwnerHandle,
    /// The window class description was rejected
    ClassRejected(String),
    /// The OS refused to create the window
    CreateFailed(String),
}

impl std::fmt::Display for WindowServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowServiceError::NoOwnerHandle => write!(f, "No native handle for the primary window"),
            WindowServiceError::ClassRejected(e) => write!(f, "Window class rejected: {}", e),
            WindowServiceError::CreateFailed(e) => write!(f, "No window was created: {}", e),
        }
    }
}

impl std::error::Error for WindowServiceError {}

/// Description of the companion window opened over the secondary display
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryWindowSpec {
    /// Native window class name
    pub class_name: &'static str,
    /// Window title
    pub title: &'static str,
    /// Draw OS decorations (title bar, borders)
    pub decorations: bool,
    /// Owned by the primary window (hidden and destroyed with it)
    pub owned_by_main: bool,
    /// Keep the window out of the taskbar
    pub skip_taskbar: bool,
    /// Fill color of the window
    pub background: Rgb,
}

impl Default for SecondaryWindowSpec {
    fn default() -> Self {
        Self {
            class_name: "SCRNSAVESECOND",
            title: "Screen Saver Second Screen",
            decorations: false,
            owned_by_main: true,
            skip_taskbar: true,
            background: Rgb::BLACK,
        }
    }
}

/// Windowing operations the placement controller needs from the OS
pub trait WindowService {
    /// Handle to a window created by this service
    type Handle;

    /// Connected displays in OS enumeration order
    fn enumerate_displays(&self) -> DisplayList;

    /// The OS-designated primary display
    fn primary_display(&self) -> Option<DisplayInfo> {
        self.enumerate_displays().primary().cloned()
    }

    /// Move and resize the primary window.
    ///
    /// Returns the new inner size when the OS applied it immediately, in which
    /// case no resize event may follow.
    fn move_main_window(&mut self, area: Area, topmost: bool) -> Option<(u32, u32)>;

    /// Make the companion window class known to the OS
    fn register_window_class(&mut self, spec: &SecondaryWindowSpec) -> Result<(), WindowServiceError>;

    /// Create the companion window at the given bounds
    fn create_secondary_window(
        &mut self,
        spec: &SecondaryWindowSpec,
        area: Area,
    ) -> Result<Self::Handle, WindowServiceError>;

    /// Show a window and pin it at the given bounds
    fn show_window(&mut self, handle: &Self::Handle, area: Area, topmost: bool);
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAYOUT STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// The drawing rectangle, empty until the first resize resolves it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutState {
    main_area: Option<Area>,
}

impl LayoutState {
    /// Whether the first resize has been handled
    pub fn is_resolved(&self) -> bool {
        self.main_area.is_some()
    }

    /// The rectangle the animation is centered in
    pub fn main_area(&self) -> Option<Area> {
        self.main_area
    }
}

/// Result of the one-time placement decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One display, or the preview thumbnail: draw into the event's size
    Single { main_area: Area },
    /// Primary window moved onto the primary display; companion window requested
    Multi {
        main_area: Area,
        secondary_area: Area,
        /// Inner size the primary window already has, if it resized synchronously
        applied_main_size: Option<(u32, u32)>,
    },
}

impl Placement {
    pub fn main_area(&self) -> Area {
        match self {
            Placement::Single { main_area } | Placement::Multi { main_area, .. } => *main_area,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Placement::Multi { .. })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLACEMENT CONTROLLER
// ═══════════════════════════════════════════════════════════════════════════════

/// Decides the window layout on the first resize and owns its result
pub struct PlacementController<H> {
    layout: LayoutState,
    placement: Option<Placement>,
    secondary_spec: SecondaryWindowSpec,
    class_registered: bool,
    secondary_window: Option<H>,
}

impl<H> Default for PlacementController<H> {
    fn default() -> Self {
        Self::new(SecondaryWindowSpec::default())
    }
}

impl<H> PlacementController<H> {
    pub fn new(secondary_spec: SecondaryWindowSpec) -> Self {
        Self {
            layout: LayoutState::default(),
            placement: None,
            secondary_spec,
            class_registered: false,
            secondary_window: None,
        }
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn secondary_spec(&self) -> &SecondaryWindowSpec {
        &self.secondary_spec
    }

    /// The companion window, if one was created
    pub fn secondary_window(&self) -> Option<&H> {
        self.secondary_window.as_ref()
    }

    /// Handle a resize of the primary window.
    ///
    /// Only the first call does anything; it returns the placement it chose.
    /// Every later call returns `None` and touches no windows.
    pub fn on_resize<S>(&mut self, service: &mut S, width: u32, height: u32) -> Option<Placement>
    where
        S: WindowService<Handle = H>,
    {
        if self.layout.is_resolved() {
            return None;
        }

        let displays = service.enumerate_displays();
        let primary = service
            .primary_display()
            .or_else(|| displays.primary().cloned());

        // A second display exists only when the list has more than one entry
        let multi = match (primary, displays.secondary_candidate()) {
            // A window narrower than the primary display is the preview thumbnail
            (Some(primary), Some(_)) if primary.width() > width => {
                tracing::info!(
                    "Window {}x{} is smaller than primary display {}, treating as preview",
                    width,
                    height,
                    primary.label()
                );
                None
            }
            (Some(primary), Some(secondary)) => Some((primary, secondary)),
            _ => None,
        };

        let placement = match multi {
            Some((primary, secondary)) => {
                let main_area = primary.area;
                let secondary_area = secondary.area;

                tracing::info!(
                    "Multi-display run: primary {} at {}, secondary {} at {}",
                    primary.label(),
                    main_area,
                    secondary.label(),
                    secondary_area
                );

                // Some platforms apply the size at once and send no resize event
                let applied_main_size = service.move_main_window(main_area, true);
                self.open_secondary_window(service, secondary_area);

                Placement::Multi {
                    main_area,
                    secondary_area,
                    applied_main_size,
                }
            }
            None => {
                let main_area = Area::from_size(width, height);
                tracing::info!("Single-display run, drawing area {}", main_area);
                Placement::Single { main_area }
            }
        };

        self.layout.main_area = Some(placement.main_area());
        self.placement = Some(placement);
        Some(placement)
    }

    /// Register the class, create and show the companion window.
    ///
    /// Failures are logged and leave only the primary window active.
    fn open_secondary_window<S>(&mut self, service: &mut S, area: Area)
    where
        S: WindowService<Handle = H>,
    {
        if !self.class_registered {
            match service.register_window_class(&self.secondary_spec) {
                Ok(()) => self.class_registered = true,
                Err(e) => tracing::warn!("There was an error registering the window class: {}", e),
            }
        }

        match service.create_secondary_window(&self.secondary_spec, area) {
            Ok(handle) => {
                service.show_window(&handle, area, true);
                self.secondary_window = Some(handle);
            }
            Err(e) => {
                tracing::warn!("Secondary window unavailable, continuing on primary only: {}", e);
            }
        }
    }
}
