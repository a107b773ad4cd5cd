//! Viewer settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shared::Color;

use crate::adapter::FlyMode;

pub const WINDOW_WIDTH: u32 = 1024;
pub const WINDOW_HEIGHT: u32 = 768;
pub const WINDOW_TITLE: &str = "Meshmagick viewer";
pub const BACKGROUND_COLOR: Color = [0.7706, 0.8165, 1.0];

/// Fixed glyph scale factor. Glyphs are not fitted to the geometry size.
pub const NORMAL_GLYPH_SCALE: f64 = 1.0;
/// Margin added on each side of the reference plane, as a fraction of the x/y extent
pub const PLANE_MARGIN: f64 = 0.1;
/// "Water" tint of the reference plane
pub const PLANE_COLOR: Color = [0.0, 102.0 / 255.0, 204.0 / 255.0];
pub const AXES_LABEL_PRECISION: usize = 4;
pub const AXES_LABEL_WIDTH: usize = 6;
pub const AXES_FONT_FACTOR: f32 = 0.8;

pub const SAVE_FILE_NAME: &str = "mmviewer_save.vtp";
pub const SCREENSHOT_FILE_NAME: &str = "screenshot.png";

/// Shape of an arrow glyph of unit length pointing along +X
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowShape {
    pub tip_resolution: u32,
    pub tip_length: f64,
    pub tip_radius: f64,
    pub shaft_resolution: u32,
    pub shaft_radius: f64,
}

impl ArrowShape {
    /// Arrow used for face normals
    pub const NORMAL: ArrowShape = ArrowShape {
        tip_resolution: 16,
        tip_length: 0.5,
        tip_radius: 0.1,
        shaft_resolution: 6,
        shaft_radius: 0.03,
    };

    /// Slender arrow used by `add_vector`
    pub const VECTOR: ArrowShape = ArrowShape {
        tip_resolution: 16,
        tip_length: 0.1,
        tip_radius: 0.02,
        shaft_resolution: 6,
        shaft_radius: 0.005,
    };
}

impl Default for ArrowShape {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Background color RGB
    pub background: Color,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            title: WINDOW_TITLE.to_string(),
            background: BACKGROUND_COLOR,
        }
    }
}

/// Overlay construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Length of every normal glyph
    pub normal_glyph_scale: f64,
    pub normal_arrow: ArrowShape,
    /// Reference plane margin on each side, fraction of the x/y extent
    pub plane_margin: f64,
    pub plane_color: Color,
    /// Significant digits of the axes labels
    pub axes_label_precision: usize,
    pub axes_label_width: usize,
    pub axes_font_factor: f32,
    pub axes_fly_mode: FlyMode,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            normal_glyph_scale: NORMAL_GLYPH_SCALE,
            normal_arrow: ArrowShape::NORMAL,
            plane_margin: PLANE_MARGIN,
            plane_color: PLANE_COLOR,
            axes_label_precision: AXES_LABEL_PRECISION,
            axes_label_width: AXES_LABEL_WIDTH,
            axes_font_factor: AXES_FONT_FACTOR,
            axes_fly_mode: FlyMode::OuterEdges,
        }
    }
}

/// Export file names and location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub save_file_name: String,
    pub screenshot_file_name: String,
    /// Output directory, `None` means the current working directory
    pub directory: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            save_file_name: SAVE_FILE_NAME.to_string(),
            screenshot_file_name: SCREENSHOT_FILE_NAME.to_string(),
            directory: None,
        }
    }
}

impl OutputSettings {
    pub fn directory(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn save_path(&self) -> PathBuf {
        self.directory().join(&self.save_file_name)
    }

    pub fn screenshot_path(&self) -> PathBuf {
        self.directory().join(&self.screenshot_file_name)
    }
}

/// All viewer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerSettings {
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub overlays: OverlaySettings,
    #[serde(default)]
    pub output: OutputSettings,
}

impl ViewerSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("org", "meshmagick", "mmviewer") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str(&json) {
                    Ok(settings) => return settings,
                    Err(e) => {
                        tracing::warn!("Ignoring malformed {}: {e}", config_path.display())
                    }
                }
            }
        }
        Self::default()
    }

    /// Settings that write exports into `dir`
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.directory = Some(dir.into());
        self
    }
}
