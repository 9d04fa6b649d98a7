//! Dialog Collage
//!
//! The core of a shareable text-collage page: the user types into a dialog
//! box drawn over a pannable, zoomable backdrop, and everything worth
//! sharing lives in the URL fragment. The page itself is modelled headlessly
//! so the core can run and be tested without a browser.
//!
//! # Components
//!
//! - **Codec** ([`codec`]): `Configuration` ⇄ flat `key=value` route with
//!   default elision and boolean coercion
//! - **Route store** ([`route`]): canonical snapshot, navigation following and
//!   debounced, self-tagged writes back to the location
//! - **View controller** ([`view`]): applies snapshots to the [`rendering`]
//!   scene and turns sliders, text edits and pan/zoom into route updates
//! - **Export** ([`export`]): scene → SVG → decoded tree → fixed-size PNG,
//!   bound to the download link and preview in completion order
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dialog_collage::{App, CollageConfig, MemoryLocation};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let location = Arc::new(MemoryLocation::new("https://collage.example/#text=Hello&fontSize=30")?);
//! let app = App::with_svg_decoder(CollageConfig::default(), location)?;
//! let config = app.start()?;
//! assert_eq!(config.font_size, 30);
//!
//! let artifact = app.export().await?;
//! println!("{} ({} bytes)", artifact.filename, artifact.png.len());
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod app;
pub mod codec;
pub mod error;
pub mod export;
pub mod model;
pub mod rendering;
pub mod route;
pub mod theme;
pub mod view;

pub use app::{App, ErrorHandler};
pub use codec::{ConfigCodec, RouteMap};
pub use error::{Error, Result};
pub use export::{ExportArtifact, ExportPipeline, ExportSurface, SceneDecoder, SvgDecoder};
pub use model::{ConfigUpdate, Configuration, Defaults, Kerning, ViewTransform};
pub use rendering::Scene;
pub use route::{Location, MemoryLocation, NavigationEvent, Origin, RouteStore};
pub use view::{Gesture, ViewController};

/// Configuration for the collage core
///
/// Every field has a default, so a partial JSON file is enough to override a
/// few settings.
///
/// # Examples
///
/// ```
/// let cfg = dialog_collage::CollageConfig::default();
/// assert_eq!(cfg.export.width, 512);
/// assert_eq!(cfg.commit_interval_ms, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollageConfig {
    /// Field defaults and slider/zoom bounds
    pub defaults: Defaults,
    /// Export resolution, independent of on-screen zoom
    pub export: ExportSize,
    /// Quiet period before a pan/zoom stream is written to the route
    pub commit_interval_ms: u64,
    /// Smallest per-axis transform change worth writing
    pub transform_epsilon: f64,
    /// Load system fonts for the export decoder
    pub load_system_fonts: bool,
    /// Dialog text font family
    pub font_family: String,
    /// Longest download file name stem
    pub slug_max_len: usize,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            export: ExportSize::default(),
            commit_interval_ms: 500,
            transform_epsilon: 0.1,
            load_system_fonts: true,
            font_family: "monospace".to_string(),
            slug_max_len: 64,
        }
    }
}

impl CollageConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CollageConfig = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::Config(format!("{:?}: {}", path, e)))?;
        Self::from_json(&json)
    }

    /// Reject settings the core cannot work with
    pub fn validate(&self) -> Result<()> {
        let d = &self.defaults;
        if self.export.width == 0 || self.export.height == 0 {
            return Err(Error::Config("export size must be non-zero".into()));
        }
        if !(d.scale_range.0 > 0.0 && d.scale_range.0 <= d.scale_range.1) {
            return Err(Error::Config(format!("invalid scale range {:?}", d.scale_range)));
        }
        if d.font_size_range.0 > d.font_size_range.1 || d.kerning_range.0 > d.kerning_range.1 {
            return Err(Error::Config("slider range minimum exceeds maximum".into()));
        }
        if !d.scale_in_range(d.values.view.k) || !d.font_size_in_range(d.values.font_size) {
            return Err(Error::Config("default values lie outside their ranges".into()));
        }
        if self.slug_max_len == 0 {
            return Err(Error::Config("slug_max_len must be positive".into()));
        }
        Ok(())
    }
}

/// Pixel size of exported images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ExportSize {
    fn default() -> Self {
        Self {
            width: 512,
            height: 448,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CollageConfig::default();
        assert_eq!(config.export, ExportSize { width: 512, height: 448 });
        assert_eq!(config.transform_epsilon, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_config() {
        let config = CollageConfig::from_json(r#"{ "commit_interval_ms": 250, "export": { "width": 256, "height": 224 } }"#).unwrap();
        assert_eq!(config.commit_interval_ms, 250);
        assert_eq!(config.export.width, 256);
        assert_eq!(config.defaults, Defaults::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            CollageConfig::from_json(r#"{ "export": { "width": 0, "height": 10 } }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(CollageConfig::from_json("[1, 2]"), Err(Error::Config(_))));
    }
}
