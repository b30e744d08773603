//! Settings management for Pulse Saver
//!
//! Handles loading/saving of the XML settings file in the user's config directory.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// An sRGB color with components in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Clamp every component to 0.0-1.0
    pub fn clamped(self) -> Self {
        Self::new(self.r.clamp(0.0, 1.0), self.g.clamp(0.0, 1.0), self.b.clamp(0.0, 1.0))
    }

    /// Convert to linear light for sRGB render targets
    pub fn to_linear(self) -> [f32; 3] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    /// Clear color for a render pass targeting a surface of `format`
    pub fn to_wgpu(self, format: wgpu::TextureFormat) -> wgpu::Color {
        let [r, g, b] = if format.is_srgb() {
            self.to_linear()
        } else {
            [self.r, self.g, self.b]
        };
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

/// How the primary window is created at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WindowMode {
    /// Borderless window covering the primary display
    #[default]
    Saver,
    /// Small decorated window, like the settings dialog thumbnail
    Preview,
}

/// Screensaver settings stored in the config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "PulseSaverSettings")]
pub struct ScreensaverSettings {
    /// Circle color
    #[serde(rename = "foregroundColor", default = "default_foreground")]
    pub foreground: Rgb,

    /// Clear color of the primary window
    #[serde(rename = "backgroundColor", default = "default_background")]
    pub background: Rgb,

    /// Largest circle radius in pixels (1-10000, default 200)
    #[serde(rename = "pulseAmplitude", default = "default_pulse_amplitude")]
    pub pulse_amplitude: f32,

    /// Target frame rate (24-240)
    #[serde(rename = "targetFps", default = "default_target_fps")]
    pub target_fps: u32,

    /// Whether VSYNC is enabled (syncs to display refresh rate)
    /// - true:  Use Fifo present mode, display controls timing
    /// - false: Manual FPS control
    #[serde(rename = "vsyncEnabled", default)]
    pub vsync_enabled: bool,

    /// Startup window mode
    #[serde(rename = "windowMode", default)]
    pub window_mode: WindowMode,

    /// Preview window width
    #[serde(rename = "previewWidth", default = "default_preview_width")]
    pub preview_width: u32,

    /// Preview window height
    #[serde(rename = "previewHeight", default = "default_preview_height")]
    pub preview_height: u32,

    /// Exit on key press, mouse click or mouse movement
    #[serde(rename = "dismissOnInput", default = "default_dismiss_on_input")]
    pub dismiss_on_input: bool,

    /// Cursor travel in pixels tolerated before dismissing
    #[serde(rename = "mouseMoveThreshold", default = "default_mouse_move_threshold")]
    pub mouse_move_threshold: f64,

    /// Also write logs to the data directory
    #[serde(rename = "logToFile", default)]
    pub log_to_file: bool,
}

fn default_foreground() -> Rgb {
    Rgb::new(1.0, 0.5, 0.25)
}

fn default_background() -> Rgb {
    Rgb::new(0.25, 0.0, 0.0)
}

fn default_pulse_amplitude() -> f32 {
    200.0
}

fn default_target_fps() -> u32 {
    60
}

fn default_preview_width() -> u32 {
    200
}

fn default_preview_height() -> u32 {
    150
}

fn default_dismiss_on_input() -> bool {
    true
}

fn default_mouse_move_threshold() -> f64 {
    4.0
}

impl Default for ScreensaverSettings {
    fn default() -> Self {
        Self {
            foreground: default_foreground(),
            background: default_background(),
            pulse_amplitude: default_pulse_amplitude(),
            target_fps: default_target_fps(),
            vsync_enabled: false,
            window_mode: WindowMode::default(),
            preview_width: default_preview_width(),
            preview_height: default_preview_height(),
            dismiss_on_input: default_dismiss_on_input(),
            mouse_move_threshold: default_mouse_move_threshold(),
            log_to_file: false,
        }
    }
}

impl ScreensaverSettings {
    /// Clamp every value to its valid range
    pub fn sanitize(&mut self) {
        self.target_fps = self.target_fps.clamp(24, 240);
        self.pulse_amplitude = if self.pulse_amplitude.is_finite() {
            self.pulse_amplitude.clamp(1.0, 10_000.0)
        } else {
            default_pulse_amplitude()
        };
        self.preview_width = self.preview_width.max(1);
        self.preview_height = self.preview_height.max(1);
        self.foreground = self.foreground.clamped();
        self.background = self.background.clamped();
        if !self.mouse_move_threshold.is_finite() || self.mouse_move_threshold < 0.0 {
            self.mouse_move_threshold = default_mouse_move_threshold();
        }
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("PulseSaver");
            p.push("settings.xml");
            p
        })
    }

    /// Directory for the log file
    pub fn log_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("PulseSaver"))
    }

    /// Parse settings from XML text
    pub fn from_xml(contents: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = from_str(contents).map_err(SettingsError::XmlParse)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Load settings from an XML file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_xml(&contents)
    }

    /// Save settings to an XML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::Io)?;
        }

        let xml = to_string(self).map_err(SettingsError::XmlWrite)?;
        let formatted = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml);

        fs::write(path, formatted).map_err(SettingsError::Io)?;
        Ok(())
    }

    /// Load settings from the config directory.
    ///
    /// Runs before logging is initialized, so nothing is logged here; call
    /// [`SettingsLoad::report`] once the subscriber is up.
    pub fn load() -> SettingsLoad {
        SettingsLoad::from_path(Self::settings_path())
    }
}

/// Outcome of loading the settings file
#[derive(Debug)]
pub struct SettingsLoad {
    /// Settings to run with (defaults when the file is missing or invalid)
    pub settings: ScreensaverSettings,
    /// File the settings were looked up in
    pub path: Option<PathBuf>,
    /// Why the defaults were used instead of the file
    pub error: Option<SettingsError>,
}

impl SettingsLoad {
    /// Load from `path`. A missing file yields the defaults without an error.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        let Some(file) = path.as_deref() else {
            return Self {
                settings: ScreensaverSettings::default(),
                path,
                error: Some(SettingsError::NoConfigDir),
            };
        };

        if !file.exists() {
            return Self {
                settings: ScreensaverSettings::default(),
                path,
                error: None,
            };
        }

        match ScreensaverSettings::load_from_file(file) {
            Ok(settings) => Self {
                settings,
                path,
                error: None,
            },
            Err(e) => Self {
                settings: ScreensaverSettings::default(),
                path,
                error: Some(e),
            },
        }
    }

    /// Log where the settings came from
    pub fn report(&self) {
        match (&self.path, &self.error) {
            (Some(path), None) if path.exists() => {
                tracing::info!("Loaded settings from {}", path.display())
            }
            (Some(path), None) => {
                tracing::info!("No settings file at {}, using defaults", path.display())
            }
            (Some(path), Some(e)) => {
                tracing::warn!("Failed to load settings from {}: {}", path.display(), e)
            }
            (None, _) => tracing::warn!("No config directory, using default settings"),
        }
    }
}

/// Settings-related errors
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    XmlParse(quick_xml::DeError),
    XmlWrite(quick_xml::SeError),
    NoConfigDir,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::XmlParse(e) => write!(f, "XML parse error: {}", e),
            SettingsError::XmlWrite(e) => write!(f, "XML write error: {}", e),
            SettingsError::NoConfigDir => write!(f, "Could not find config directory"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ScreensaverSettings::default();
        assert_eq!(settings.foreground, Rgb::new(1.0, 0.5, 0.25));
        assert_eq!(settings.background, Rgb::new(0.25, 0.0, 0.0));
        assert_eq!(settings.pulse_amplitude, 200.0);
        assert_eq!(settings.target_fps, 60);
        assert_eq!(settings.window_mode, WindowMode::Saver);
        assert!(settings.dismiss_on_input);
    }

    #[test]
    fn test_sanitize_clamps() {
        let mut settings = ScreensaverSettings::default();
        settings.target_fps = 1000;
        settings.pulse_amplitude = f32::NAN;
        settings.preview_width = 0;
        settings.foreground = Rgb::new(2.0, -1.0, 0.5);
        settings.mouse_move_threshold = -3.0;
        settings.sanitize();

        assert_eq!(settings.target_fps, 240);
        assert_eq!(settings.pulse_amplitude, 200.0);
        assert_eq!(settings.preview_width, 1);
        assert_eq!(settings.foreground, Rgb::new(1.0, 0.0, 0.5));
        assert_eq!(settings.mouse_move_threshold, 4.0);
    }

    #[test]
    fn test_partial_xml_uses_defaults() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<PulseSaverSettings>
    <targetFps>10</targetFps>
    <windowMode>Preview</windowMode>
</PulseSaverSettings>"#;

        let settings = ScreensaverSettings::from_xml(xml).unwrap();
        assert_eq!(settings.target_fps, 24);
        assert_eq!(settings.window_mode, WindowMode::Preview);
        assert_eq!(settings.pulse_amplitude, 200.0);
        assert_eq!(settings.preview_width, 200);
        assert_eq!(settings.preview_height, 150);
    }

    #[test]
    fn test_invalid_xml_is_error() {
        let result = ScreensaverSettings::from_xml("<PulseSaverSettings><targetFps>fast</targetFps>");
        assert!(matches!(result, Err(SettingsError::XmlParse(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("pulse-saver-test-{}", std::process::id()))
            .join("settings.xml");

        let mut settings = ScreensaverSettings::default();
        settings.pulse_amplitude = 320.0;
        settings.dismiss_on_input = false;
        settings.save_to_file(&path).unwrap();

        let loaded = ScreensaverSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_file_falls_back_with_error() {
        let dir = std::env::temp_dir().join(format!("pulse-saver-invalid-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.xml");
        fs::write(&path, "<PulseSaverSettings><targetFps>fast</targetFps>").unwrap();

        let loaded = SettingsLoad::from_path(Some(path.clone()));
        assert_eq!(loaded.settings, ScreensaverSettings::default());
        assert!(matches!(loaded.error, Some(SettingsError::XmlParse(_))));
        assert_eq!(loaded.path, Some(path));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("pulse-saver-does-not-exist").join("settings.xml");
        let loaded = SettingsLoad::from_path(Some(path));
        assert_eq!(loaded.settings, ScreensaverSettings::default());
        assert!(loaded.error.is_none());
    }

    #[test]
    fn test_no_config_dir_is_reported() {
        let loaded = SettingsLoad::from_path(None);
        assert_eq!(loaded.settings, ScreensaverSettings::default());
        assert!(matches!(loaded.error, Some(SettingsError::NoConfigDir)));
    }

    #[test]
    fn test_srgb_to_linear() {
        let linear = Rgb::new(1.0, 0.0, 0.5).to_linear();
        assert!((linear[0] - 1.0).abs() < 1e-6);
        assert_eq!(linear[1], 0.0);
        assert!((linear[2] - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_wgpu_clear_color_respects_format() {
        let color = Rgb::new(0.5, 0.5, 0.5);
        let unorm = color.to_wgpu(wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(unorm.r, 0.5);
        let srgb = color.to_wgpu(wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!(srgb.r < 0.5);
    }
}
