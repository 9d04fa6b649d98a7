//! Scene model, its SVG serialization and the raster stage of the export

pub mod paint;
pub mod raster;
pub mod scene;

pub use scene::{BoxRect, DialogText, Scene, SceneLayout};

/// A rendered PNG and its pixel size
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}
