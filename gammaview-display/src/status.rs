//! Cursor readout for the host's status bar.

use std::fmt;

use gammaview_core::util::format_count;
use gammaview_core::LogicalPoint;

use crate::overlay::CutId;

/// Receives the status text of a view.
pub trait StatusSink {
    fn set_status(&mut self, text: &str);
}

/// Data under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub point: LogicalPoint,
    /// Bin content, `None` outside the matrix.
    pub value: Option<f64>,
    /// Cuts containing `point`, in drawing order.
    pub cuts: Vec<CutId>,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {:.1}  y: {:.1}", self.point.x, self.point.y)?;
        match self.value {
            Some(v) => write!(f, "  z: {}", format_count(v))?,
            None => write!(f, "  z: -")?,
        }
        if !self.cuts.is_empty() {
            write!(f, "  cuts:")?;
            for id in &self.cuts {
                write!(f, " {id}")?;
            }
        }
        Ok(())
    }
}

/// A sink that keeps the last text, for headless use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
}

impl StatusSink for StatusLine {
    fn set_status(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }
}
