//! Display enumeration
//!
//! Provides the rectangle type shared by the placement logic and a snapshot of
//! the connected displays. Displays are not cached between runs; a snapshot
//! is taken at startup and kept in the order the OS reported them.

use winit::event_loop::ActiveEventLoop;
use winit::monitor::MonitorHandle;

/// A rectangle in virtual desktop pixels (origin + size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Area {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in physical pixels
    pub width: u32,
    /// Height in physical pixels
    pub height: u32,
}

impl Area {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// An area at the origin with the given size
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Center relative to the area's own origin
    pub fn local_center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Information about a connected display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    /// Display name from the operating system
    pub name: String,

    /// Position and physical resolution in the virtual desktop
    pub area: Area,

    /// DPI scale factor
    pub scale_factor: f64,

    /// Refresh rate in millihertz (e.g., 60000 = 60Hz), if available
    pub refresh_rate_millihertz: Option<u32>,

    /// Whether this is the primary display
    pub is_primary: bool,
}

impl DisplayInfo {
    /// Create a display with only a name and rectangle
    pub fn new(name: impl Into<String>, area: Area) -> Self {
        Self {
            name: name.into(),
            area,
            scale_factor: 1.0,
            refresh_rate_millihertz: None,
            is_primary: false,
        }
    }

    /// Create a DisplayInfo from a winit MonitorHandle
    pub fn from_monitor(monitor: &MonitorHandle, is_primary: bool) -> Self {
        let pos = monitor.position();
        let size = monitor.size();

        Self {
            name: monitor.name().unwrap_or_else(|| "Unknown Display".to_string()),
            area: Area::new(pos.x, pos.y, size.width, size.height),
            scale_factor: monitor.scale_factor(),
            refresh_rate_millihertz: monitor.refresh_rate_millihertz(),
            is_primary,
        }
    }

    /// Get a display label suitable for logs (includes resolution)
    pub fn label(&self) -> String {
        let refresh = self
            .refresh_rate_millihertz
            .map(|r| format!(" @ {}Hz", r / 1000))
            .unwrap_or_default();
        format!(
            "{} ({}x{}{})",
            self.name, self.area.width, self.area.height, refresh
        )
    }

    /// Label plus desktop position, as listed at startup
    pub fn summary(&self) -> String {
        format!(
            "{} at {}{}",
            self.label(),
            self.area,
            if self.is_primary { " (primary)" } else { "" }
        )
    }

    /// Width of the display in physical pixels
    pub fn width(&self) -> u32 {
        self.area.width
    }
}

/// Whether two monitor handles describe the same physical display
fn same_monitor(a: &MonitorHandle, b: &MonitorHandle) -> bool {
    a.name() == b.name() && a.position() == b.position() && a.size() == b.size()
}

/// Snapshot of connected displays in OS enumeration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    displays: Vec<DisplayInfo>,
}

impl DisplayList {
    pub fn new(displays: Vec<DisplayInfo>) -> Self {
        Self { displays }
    }

    /// Query the connected displays from the event loop
    pub fn query(event_loop: &ActiveEventLoop) -> Self {
        let primary_monitor = event_loop.primary_monitor();

        let displays = event_loop
            .available_monitors()
            .map(|monitor| {
                let is_primary = primary_monitor
                    .as_ref()
                    .map(|p| same_monitor(p, &monitor))
                    .unwrap_or(false);
                DisplayInfo::from_monitor(&monitor, is_primary)
            })
            .collect();

        Self { displays }
    }

    /// Get display count
    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// Get all displays in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = &DisplayInfo> {
        self.displays.iter()
    }

    /// The OS-designated primary display, or the first enumerated one
    pub fn primary(&self) -> Option<&DisplayInfo> {
        self.displays
            .iter()
            .find(|d| d.is_primary)
            .or_else(|| self.displays.first())
    }

    /// The display picked for the companion window.
    ///
    /// Every entry after the first overwrites the previous pick, so with three
    /// or more displays the last one wins rather than the second.
    pub fn secondary_candidate(&self) -> Option<&DisplayInfo> {
        let mut selected = None;
        for (index, display) in self.displays.iter().enumerate() {
            if index != 0 {
                selected = Some(display);
            }
        }
        selected
    }
}

impl From<Vec<DisplayInfo>> for DisplayList {
    fn from(displays: Vec<DisplayInfo>) -> Self {
        Self::new(displays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(name: &str, x: i32, width: u32, primary: bool) -> DisplayInfo {
        let mut info = DisplayInfo::new(name, Area::new(x, 0, width, 1080));
        info.is_primary = primary;
        info
    }

    #[test]
    fn test_area_local_center() {
        let area = Area::new(1920, 0, 1280, 1024);
        assert_eq!(area.local_center(), (640.0, 512.0));
        assert_eq!(area.to_string(), "(1920, 0, 1280x1024)");
    }

    #[test]
    fn test_display_label() {
        let mut info = display("DELL U2720Q", 0, 1920, true);
        info.refresh_rate_millihertz = Some(59_950);
        assert_eq!(info.label(), "DELL U2720Q (1920x1080 @ 59Hz)");

        info.refresh_rate_millihertz = None;
        assert_eq!(info.label(), "DELL U2720Q (1920x1080)");
    }

    #[test]
    fn test_display_summary() {
        let main = display("Main", 0, 1920, true);
        assert_eq!(main.summary(), "Main (1920x1080) at (0, 0, 1920x1080) (primary)");

        let side = display("Side", 1920, 1280, false);
        assert_eq!(side.summary(), "Side (1280x1080) at (1920, 0, 1280x1080)");
    }

    #[test]
    fn test_empty_list() {
        let list = DisplayList::default();
        assert!(list.is_empty());
        assert!(list.primary().is_none());
        assert!(list.secondary_candidate().is_none());
    }

    #[test]
    fn test_primary_prefers_os_flag() {
        let list = DisplayList::from(vec![
            display("Left", -1920, 1920, false),
            display("Main", 0, 2560, true),
        ]);
        assert_eq!(list.primary().map(|d| d.name.as_str()), Some("Main"));
    }

    #[test]
    fn test_primary_falls_back_to_first() {
        let list = DisplayList::from(vec![display("A", 0, 1920, false), display("B", 1920, 1920, false)]);
        assert_eq!(list.primary().map(|d| d.name.as_str()), Some("A"));
    }

    #[test]
    fn test_secondary_candidate_last_wins() {
        let list = DisplayList::from(vec![
            display("A", 0, 1920, true),
            display("B", 1920, 1920, false),
            display("C", 3840, 1280, false),
        ]);
        assert_eq!(list.secondary_candidate().map(|d| d.name.as_str()), Some("C"));
    }
}
