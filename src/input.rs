//! Screensaver dismissal
//!
//! A running screensaver ends on user activity: a key press, a mouse click,
//! or the cursor travelling further than a small threshold from where it was
//! first seen. Cursor positions are in virtual desktop coordinates so moving
//! between the primary and companion windows is measured consistently.

/// Tracks user activity and decides when to exit
#[derive(Debug, Clone, PartialEq)]
pub struct InputDismissal {
    enabled: bool,
    threshold: f64,
    origin: Option<(f64, f64)>,
}

impl InputDismissal {
    pub fn new(enabled: bool, threshold: f64) -> Self {
        Self {
            enabled,
            threshold: threshold.max(0.0),
            origin: None,
        }
    }

    /// Forget the reference cursor position (after windows moved under it)
    pub fn reset(&mut self) {
        self.origin = None;
    }

    /// A key was pressed. Escape always dismisses.
    pub fn on_key_pressed(&mut self, is_escape: bool) -> bool {
        is_escape || self.enabled
    }

    /// A mouse button was pressed
    pub fn on_mouse_button(&mut self) -> bool {
        self.enabled
    }

    /// The cursor moved to `(x, y)` in desktop coordinates
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) -> bool {
        if !self.enabled {
            return false;
        }

        match self.origin {
            None => {
                self.origin = Some((x, y));
                false
            }
            Some((ox, oy)) => {
                let (dx, dy) = (x - ox, y - oy);
                (dx * dx + dy * dy).sqrt() > self.threshold
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_always_dismisses() {
        let mut disabled = InputDismissal::new(false, 4.0);
        assert!(disabled.on_key_pressed(true));
        assert!(!disabled.on_key_pressed(false));
        assert!(!disabled.on_mouse_button());
    }

    #[test]
    fn test_any_key_or_click_dismisses_when_enabled() {
        let mut dismissal = InputDismissal::new(true, 4.0);
        assert!(dismissal.on_key_pressed(false));
        assert!(dismissal.on_mouse_button());
    }

    #[test]
    fn test_small_cursor_jitter_is_ignored() {
        let mut dismissal = InputDismissal::new(true, 4.0);
        assert!(!dismissal.on_cursor_moved(100.0, 100.0));
        assert!(!dismissal.on_cursor_moved(102.0, 103.0));
        assert!(dismissal.on_cursor_moved(110.0, 100.0));
    }

    #[test]
    fn test_reset_takes_new_origin() {
        let mut dismissal = InputDismissal::new(true, 4.0);
        dismissal.on_cursor_moved(0.0, 0.0);
        dismissal.reset();
        assert!(!dismissal.on_cursor_moved(500.0, 500.0));
        assert!(!dismissal.on_cursor_moved(501.0, 500.0));
    }

    #[test]
    fn test_cursor_ignored_when_disabled() {
        let mut dismissal = InputDismissal::new(false, 4.0);
        dismissal.on_cursor_moved(0.0, 0.0);
        assert!(!dismissal.on_cursor_moved(1000.0, 1000.0));
    }
}
