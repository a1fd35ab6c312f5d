//! Flattening, PNG/base64 encoding and the image-host hand-off.

pub mod upload;

use std::io::Cursor;

use base64::Engine as _;
use image::{ImageFormat, RgbImage};

use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::Fnv1a64;
use crate::raster::Canvas;
use crate::raster::composite::unpremultiply;

#[cfg(feature = "net")]
pub use upload::ImgbbHost;
pub use upload::{ImageHost, KeyRing, publish};

/// Composite the canvas over an opaque `background` and drop alpha.
pub fn flatten(canvas: &Canvas, background: [u8; 3]) -> RgbImage {
    let mut out = Vec::with_capacity(canvas.data().len() / 4 * 3);
    for px in canvas.data().chunks_exact(4) {
        let a = u32::from(px[3]);
        let [r, g, b, _] = unpremultiply([px[0], px[1], px[2], px[3]]);
        for (c, bg) in [r, g, b].into_iter().zip(background) {
            let v = (u32::from(c) * a + u32::from(bg) * (255 - a) + 127) / 255;
            out.push(v.min(255) as u8);
        }
    }
    // Length is width * height * 3 by construction.
    RgbImage::from_raw(canvas.width(), canvas.height(), out)
        .unwrap_or_else(|| RgbImage::new(canvas.width(), canvas.height()))
}

pub fn encode_png(image: &RgbImage) -> PosterResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| PosterError::encode(format!("png encode failed: {e}")))?;
    Ok(buf.into_inner())
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Stable upload name for a title: `ogposter_<16 hex digits>`.
pub fn upload_name(title: &str) -> String {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(title.as_bytes());
    format!("ogposter_{:016x}", h.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{CanvasSize, Rgb8};

    #[test]
    fn transparent_canvas_flattens_to_background() {
        let c = Canvas::new(CanvasSize::new(8, 4).unwrap()).unwrap();
        let img = flatten(&c, [10, 20, 30]);
        assert_eq!(img.dimensions(), (8, 4));
        assert!(img.pixels().all(|p| p.0 == [10, 20, 30]));
    }

    #[test]
    fn opaque_canvas_ignores_background() {
        let mut c = Canvas::new(CanvasSize::new(3, 3).unwrap()).unwrap();
        c.clear(Rgb8::new(200, 100, 50));
        let img = flatten(&c, [0, 0, 0]);
        assert!(img.pixels().all(|p| p.0 == [200, 100, 50]));
    }

    #[test]
    fn png_round_trips_dimensions() {
        let img = RgbImage::from_pixel(12, 7, image::Rgb([1, 2, 3]));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let back = image::load_from_memory(&png).unwrap();
        assert_eq!((back.width(), back.height()), (12, 7));
    }

    #[test]
    fn base64_and_names() {
        assert_eq!(encode_base64(b"hi"), "aGk=");
        let a = upload_name("hello");
        assert_eq!(a, upload_name("hello"));
        assert_ne!(a, upload_name("hellp"));
        assert!(a.starts_with("ogposter_") && a.len() == 9 + 16);
    }
}
