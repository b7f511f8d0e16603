//! Error types for gammaview-core.

use thiserror::Error;

/// Result type alias for gammaview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for matrix display operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Viewport size, zoom factor or offset outside the valid range.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The histogram is missing or inconsistent.
    #[error("data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// A raster buffer could not be allocated.
    #[error("cannot allocate {bytes} bytes for a {width}x{height} raster")]
    ResourceExhaustion { bytes: usize, width: u32, height: u32 },

    /// Cut polygon rejected.
    #[error("invalid cut: {0}")]
    InvalidCut(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidGeometry`] with a formatted message.
    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }
}
