//! Error types for the collage core

use thiserror::Error;

/// Result type alias for collage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while routing, rendering or exporting a collage
///
/// Route decode problems are deliberately absent: a malformed or out-of-range
/// route value is recovered to its default inside the codec and never reaches
/// callers.
#[derive(Error, Debug)]
pub enum Error {
    /// A location URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The scene has no dialog text anchor to render into
    #[error("Scene anchor missing: {0}")]
    MissingSceneAnchor(&'static str),

    /// The serialized scene could not be decoded as an image
    #[error("Export decode failed: {0}")]
    ExportDecode(String),

    /// Drawing the decoded scene onto the export surface failed
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// Encoding the raster surface to PNG failed
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// An operation needing the async runtime was called outside of one
    #[error("No async runtime available: {0}")]
    Runtime(String),

    /// The application initialization phase was requested twice
    #[error("Application already started")]
    AlreadyStarted,

    /// Reading or writing the theme preference failed
    #[error("Theme preference storage failed: {0}")]
    Theme(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<resvg::usvg::Error> for Error {
    fn from(err: resvg::usvg::Error) -> Self {
        Error::ExportDecode(err.to_string())
    }
}
