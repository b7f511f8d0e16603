//! View configuration loaded from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use gammaview_core::{Borders, Colormap, Error, Result};
use serde::{Deserialize, Serialize};

use crate::style::{LineStyle, Rgba};

/// Settings of one matrix view.
///
/// Every field has a default, so a JSON document only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Insets between the window edge and the matrix viewport.
    pub borders: Borders,
    /// Start with logarithmic count scaling.
    pub log_scale: bool,
    pub colormap: Colormap,
    /// Factor applied by the zoom keys.
    pub zoom_step: f64,
    /// Factor applied per mouse wheel notch.
    pub wheel_zoom_step: f64,
    /// Fraction of the viewport moved by an arrow key.
    pub pan_fraction: f64,
    /// Style of all cuts; `None` picks a palette color per cut.
    pub cut_style: Option<LineStyle>,
    /// Style of the cut polygon being drawn.
    pub draft_style: LineStyle,
    pub marker_color: Rgba,
    /// Color of the x and y zoom markers.
    pub zoom_marker_color: Rgba,
    /// Width in data units shown by [`crate::View2D::go_to`].
    pub go_to_width: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            borders: Borders::uniform(4),
            log_scale: true,
            colormap: Colormap::Spectrum,
            zoom_step: 2.0,
            wheel_zoom_step: 1.25,
            pan_fraction: 0.25,
            cut_style: None,
            draft_style: LineStyle::dashed([255, 255, 255, 255]),
            marker_color: [0, 255, 0, 255],
            zoom_marker_color: [255, 200, 0, 255],
            go_to_width: 100.0,
        }
    }
}

impl ViewConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file cannot be read, is not
    /// valid JSON or holds invalid values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Same as [`ViewConfig::from_file`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Check all values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !self.borders.is_valid() {
            return Err(Error::ConfigError("borders must not be negative".into()));
        }
        for (name, step) in [
            ("zoom_step", self.zoom_step),
            ("wheel_zoom_step", self.wheel_zoom_step),
        ] {
            if !(step.is_finite() && step > 1.0) {
                return Err(Error::ConfigError(format!(
                    "{name} must be greater than 1, got {step}"
                )));
            }
        }
        if !(self.pan_fraction > 0.0 && self.pan_fraction <= 1.0) {
            return Err(Error::ConfigError(format!(
                "pan_fraction must be in (0, 1], got {}",
                self.pan_fraction
            )));
        }
        if !(self.go_to_width.is_finite() && self.go_to_width > 0.0) {
            return Err(Error::ConfigError(format!(
                "go_to_width must be positive, got {}",
                self.go_to_width
            )));
        }
        Ok(())
    }
}
