//! Color ramps and count-to-ramp scaling.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::util::clamp_to_u8;

/// Number of discrete steps of a color ramp (five 256-step segments).
pub const Z_COLOR_RANGE: i32 = 5 * 256;

/// Available colormaps for matrix display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Colormap {
    /// Black to blue to cyan to green to yellow to red.
    #[default]
    Spectrum,
    /// Hot (Thermal) - black to red to yellow to white.
    Hot,
    /// Grayscale - black to white.
    Grayscale,
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Spectrum => write!(f, "Spectrum"),
            Colormap::Hot => write!(f, "Hot (Thermal)"),
            Colormap::Grayscale => write!(f, "Grayscale"),
        }
    }
}

impl Colormap {
    /// Map a ramp index in `[0, Z_COLOR_RANGE)` to RGB.
    ///
    /// Indices below the range give the lowest color, indices above the
    /// highest.
    #[must_use]
    pub fn rgb(self, z: i32) -> [u8; 3] {
        let z = z.clamp(0, Z_COLOR_RANGE - 1);
        match self {
            Colormap::Spectrum => {
                let seg = z / 256;
                let v = clamp_to_u8(z % 256);
                match seg {
                    0 => [0, 0, v],
                    1 => [0, v, 255],
                    2 => [0, 255, 255 - v],
                    3 => [v, 255, 0],
                    _ => [255, 255 - v, 0],
                }
            }
            Colormap::Hot => {
                // Red first, then green, then blue.
                let r = clamp_to_u8(z * 3 * 256 / Z_COLOR_RANGE);
                let g = clamp_to_u8(z * 3 * 256 / Z_COLOR_RANGE - 256);
                let b = clamp_to_u8(z * 3 * 256 / Z_COLOR_RANGE - 512);
                [r, g, b]
            }
            Colormap::Grayscale => {
                let v = clamp_to_u8(z * 256 / Z_COLOR_RANGE);
                [v, v, v]
            }
        }
    }

    /// Same as [`Colormap::rgb`] with an opaque alpha channel.
    #[must_use]
    pub fn rgba(self, z: i32) -> [u8; 4] {
        let [r, g, b] = self.rgb(z);
        [r, g, b, 255]
    }
}

/// Compress a count for logarithmic display.
///
/// Counts below one are passed through linearly so the curve stays
/// continuous and non-negative.
#[must_use]
pub fn log_compress(x: f64) -> f64 {
    if x < 1.0 {
        x.max(0.0)
    } else {
        x.ln() + 1.0
    }
}

/// Visible count window mapped onto the color ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScale {
    /// Lowest displayed (possibly log-compressed) value.
    pub offset: f64,
    /// Width of the displayed window.
    pub visible_region: f64,
    /// Compress counts with [`log_compress`] before scaling.
    pub log_scale: bool,
}

impl Default for ZScale {
    fn default() -> Self {
        Self {
            offset: 0.0,
            visible_region: 1.0,
            log_scale: true,
        }
    }
}

impl ZScale {
    /// Window covering `[0, maximum]` counts.
    #[must_use]
    pub fn for_maximum(maximum: f64, log_scale: bool) -> Self {
        let top = if log_scale {
            log_compress(maximum)
        } else {
            maximum
        };
        let visible_region = if top.is_finite() && top > 0.0 { top } else { 1.0 };
        Self {
            offset: 0.0,
            visible_region,
            log_scale,
        }
    }

    /// Returns true if the window can be used for scaling.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.offset.is_finite() && self.visible_region.is_finite() && self.visible_region > 0.0
    }

    /// Ramp index for a bin content.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_ramp(&self, counts: f64) -> i32 {
        let v = if self.log_scale {
            log_compress(counts)
        } else {
            counts
        };
        let z = (v - self.offset) / self.visible_region * f64::from(Z_COLOR_RANGE);
        // NaN saturates to 0, infinities to the ends of i32.
        z as i32
    }
}
