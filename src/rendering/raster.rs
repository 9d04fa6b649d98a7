//! Raster stage of the export: decoded SVG tree to PNG bytes

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

use crate::rendering::Screenshot;
use crate::{Error, ExportSize, Result};

/// Draw `tree` scaled onto a fixed-size surface and encode it
///
/// The surface size is the export resolution; the tree is stretched to fill
/// it regardless of its own intrinsic size.
pub fn rasterize(tree: &usvg::Tree, size: ExportSize) -> Result<Screenshot> {
    let mut pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
        Error::Raster(format!("invalid raster size {}x{}", size.width, size.height))
    })?;

    let tree_size = tree.size();
    let sx = size.width as f32 / tree_size.width();
    let sy = size.height as f32 / tree_size.height();
    resvg::render(tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());

    let png_data = encode_png(&pixmap)?;
    Ok(Screenshot {
        width: size.width,
        height: size.height,
        png_data,
    })
}

/// Encode at the strongest compression setting
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    // PNG wants straight alpha; the pixmap stores premultiplied
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut png = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(&rgba, pixmap.width(), pixmap.height(), ExtendedColorType::Rgba8)
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(png)
}
