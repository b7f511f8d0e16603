//! Line styles for overlays.
//!
//! A [`StyleRegistry`] is owned by one view and hands out [`StyleId`]s.
//! Identical styles share one id, so overlays that use the same color and
//! pattern do not grow the registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// RGBA color.
pub type Rgba = [u8; 4];

/// Dash pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinePattern {
    #[default]
    Solid,
    /// `on` pixels drawn, then `off` pixels skipped.
    Dashed { on: u32, off: u32 },
}

impl LinePattern {
    /// The default on/off dash.
    #[must_use]
    pub fn dashed() -> Self {
        LinePattern::Dashed { on: 4, off: 4 }
    }

    /// Returns true if the pixel at `step` along the line is drawn.
    #[must_use]
    pub fn is_on(&self, step: u64) -> bool {
        match *self {
            LinePattern::Solid => true,
            LinePattern::Dashed { on, off } => {
                let period = u64::from(on) + u64::from(off);
                period == 0 || step % period < u64::from(on)
            }
        }
    }
}

/// Color and pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Rgba,
    #[serde(default)]
    pub pattern: LinePattern,
}

impl LineStyle {
    #[must_use]
    pub fn solid(color: Rgba) -> Self {
        Self {
            color,
            pattern: LinePattern::Solid,
        }
    }

    #[must_use]
    pub fn dashed(color: Rgba) -> Self {
        Self {
            color,
            pattern: LinePattern::dashed(),
        }
    }
}

/// Handle of a style registered in a [`StyleRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleId(usize);

/// Solid and dashed variants of one marker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyles {
    pub solid: StyleId,
    pub dashed: StyleId,
}

/// Styles used by one view.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: Vec<LineStyle>,
    lookup: HashMap<LineStyle, StyleId>,
}

impl StyleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style, returning the existing id for a known style.
    pub fn register(&mut self, style: LineStyle) -> StyleId {
        if let Some(id) = self.lookup.get(&style) {
            return *id;
        }
        let id = StyleId(self.styles.len());
        self.styles.push(style);
        self.lookup.insert(style, id);
        id
    }

    /// Register the solid and dashed line of one color.
    pub fn marker_styles(&mut self, color: Rgba) -> MarkerStyles {
        MarkerStyles {
            solid: self.register(LineStyle::solid(color)),
            dashed: self.register(LineStyle::dashed(color)),
        }
    }

    #[must_use]
    pub fn get(&self, id: StyleId) -> Option<&LineStyle> {
        self.styles.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Color for the `index`-th automatically styled cut.
#[must_use]
pub fn palette_color(index: usize) -> Rgba {
    const PALETTE: [Rgba; 10] = [
        [0x4a, 0x9e, 0xff, 0xff],
        [0xef, 0x44, 0x44, 0xff],
        [0x10, 0xb9, 0x81, 0xff],
        [0xf5, 0x9e, 0x0b, 0xff],
        [0x8b, 0x5c, 0xff, 0xff],
        [0xf4, 0x72, 0xb6, 0xff],
        [0x22, 0xc5, 0xe5, 0xff],
        [0x84, 0xcc, 0x16, 0xff],
        [0xf9, 0x73, 0x16, 0xff],
        [0x06, 0xb6, 0xd4, 0xff],
    ];
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_deduplicates() {
        let mut reg = StyleRegistry::new();
        let a = reg.register(LineStyle::solid([255, 0, 0, 255]));
        let b = reg.register(LineStyle::solid([255, 0, 0, 255]));
        let c = reg.register(LineStyle::dashed([255, 0, 0, 255]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(c).unwrap().pattern, LinePattern::dashed());
    }

    #[test]
    fn test_marker_styles_share_color() {
        let mut reg = StyleRegistry::new();
        let styles = reg.marker_styles([1, 2, 3, 255]);
        assert_eq!(reg.get(styles.solid).unwrap().color, [1, 2, 3, 255]);
        assert_eq!(reg.get(styles.dashed).unwrap().color, [1, 2, 3, 255]);
        assert_eq!(reg.marker_styles([1, 2, 3, 255]), styles);
    }

    #[test]
    fn test_dash_pattern() {
        let dash = LinePattern::Dashed { on: 2, off: 3 };
        let drawn: Vec<bool> = (0..6).map(|s| dash.is_on(s)).collect();
        assert_eq!(drawn, [true, true, false, false, false, true]);
        assert!(LinePattern::Dashed { on: 0, off: 0 }.is_on(7));
    }
}
