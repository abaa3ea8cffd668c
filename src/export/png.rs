//! SVG → PNG rasterization through an in-memory pixmap.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::export::ExportError;

/// Rasterizes a standalone SVG document to PNG bytes on a `px`×`px`
/// transparent surface.
///
/// The document is scaled uniformly so its larger declared dimension fills
/// `px`; the exported documents are square, so they fill the surface.
pub(crate) fn rasterize(markup: &str, px: u32) -> Result<Vec<u8>, ExportError> {
    let tree =
        Tree::from_str(markup, &Options::default()).map_err(|_| ExportError::InvalidMarkup)?;

    let size = tree.size();
    let scale = px as f32 / size.width().max(size.height());
    let mut pixmap = Pixmap::new(px, px).ok_or(ExportError::Surface(px))?;
    resvg::render(
        &tree,
        Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let image = pixmap_to_rgba(&pixmap);
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Converts a tiny_skia pixmap to an `image::RgbaImage`.
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let height = pixmap.height();
    let mut img = RgbaImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            // In-bounds by construction, so the lookup always succeeds
            let Some(pixel) = pixmap.pixel(x, y) else {
                continue;
            };
            // tiny_skia stores premultiplied alpha
            let (r, g, b, a) =
                unpremultiply(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha());
            img.put_pixel(x, y, Rgba([r, g, b, a]));
        }
    }

    img
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}
