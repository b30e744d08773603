//! Display enumeration and window placement
//!
//! Everything needed to decide where the screensaver windows go:
//! - `display`: display rectangles as reported by the OS, in enumeration order
//! - `placement`: the one-shot placement controller and the window service seam
//! - `winit_service`: the production window service backed by winit

pub mod display;
pub mod placement;
pub mod winit_service;

pub use display::{Area, DisplayInfo, DisplayList};
pub use placement::{
    LayoutState, Placement, PlacementController, SecondaryWindowSpec, WindowService, WindowServiceError,
};
pub use winit_service::WinitWindowService;
