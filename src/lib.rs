//! Pulse Saver Library
//!
//! A screensaver that covers one or two displays and renders a pulsing circle.
//! On a multi-display desktop the primary window is snapped onto the primary
//! display and a borderless companion window is opened over the secondary one.

pub mod animation;
pub mod app;
pub mod gpu_context;
pub mod input;
pub mod output;
pub mod renderer;
pub mod settings;
pub mod telemetry;

pub use animation::Pulse;
pub use app::App;
pub use gpu_context::{GpuContext, GpuError, WindowSurface};
pub use input::InputDismissal;
pub use output::{Area, DisplayInfo, DisplayList, LayoutState, Placement, PlacementController, WindowService};
pub use renderer::{CircleRenderer, ScreenProjection};
pub use settings::{Rgb, ScreensaverSettings, SettingsError, SettingsLoad, WindowMode};
