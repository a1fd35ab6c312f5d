use image::RgbImage;

use crate::foundation::core::Rgb8;
use crate::raster::Canvas;
use crate::topic::GradientKind;

/// Position of pixel `(x, y)` along the gradient, in `[0, 1]`.
pub fn gradient_ratio(kind: GradientKind, x: f32, y: f32, w: f32, h: f32) -> f32 {
    let r = match kind {
        GradientKind::Diagonal => (x + y) / (w + h),
        GradientKind::Horizontal => x / w,
        GradientKind::Vertical => y / h,
        GradientKind::Radial => {
            let (cx, cy) = (w / 2.0, h / 2.0);
            let max_dist = (cx * cx + cy * cy).sqrt();
            ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / max_dist
        }
    };
    if r.is_finite() { r.clamp(0.0, 1.0) } else { 0.0 }
}

/// Smoothstep easing.
pub fn ease(r: f32) -> f32 {
    r * r * (3.0 - 2.0 * r)
}

/// Three-stop interpolation. Missing stops are padded: two stops repeat the second, one
/// stop pairs with black, none is black.
pub fn interpolate(stops: &[Rgb8], r: f32) -> Rgb8 {
    let (c1, c2, c3) = match stops {
        [] => return Rgb8::BLACK,
        [a] => (*a, Rgb8::BLACK, Rgb8::BLACK),
        [a, b] => (*a, *b, *b),
        [a, b, c, ..] => (*a, *b, *c),
    };
    if r < 0.5 {
        c1.lerp(c2, r * 2.0)
    } else {
        c2.lerp(c3, (r - 0.5) * 2.0)
    }
}

fn color_at(stops: &[Rgb8], kind: GradientKind, x: u32, y: u32, w: u32, h: u32) -> Rgb8 {
    let r = gradient_ratio(kind, x as f32, y as f32, w as f32, h as f32);
    interpolate(stops, ease(r))
}

/// Paint an opaque eased gradient over the whole canvas.
pub fn paint_gradient(canvas: &mut Canvas, stops: &[Rgb8], kind: GradientKind) {
    let (w, h) = (canvas.width(), canvas.height());
    let data = canvas.data_mut();
    for y in 0..h {
        let row = y as usize * w as usize * 4;
        for x in 0..w {
            let i = row + x as usize * 4;
            data[i..i + 4].copy_from_slice(&color_at(stops, kind, x, y, w, h).with_alpha(255));
        }
    }
}

/// The same gradient as a standalone opaque image, for when no canvas can be built.
pub fn gradient_image(width: u32, height: u32, stops: &[Rgb8], kind: GradientKind) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let c = color_at(stops, kind, x, y, width, height);
        image::Rgb([c.r, c.g, c.b])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::CanvasSize;
    use crate::topic::Palette;

    #[test]
    fn ease_fixed_points() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        assert_eq!(ease(0.5), 0.5);
    }

    #[test]
    fn ratio_per_kind() {
        assert_eq!(gradient_ratio(GradientKind::Diagonal, 0.0, 0.0, 100.0, 50.0), 0.0);
        assert_eq!(gradient_ratio(GradientKind::Horizontal, 50.0, 7.0, 100.0, 50.0), 0.5);
        assert_eq!(gradient_ratio(GradientKind::Vertical, 3.0, 25.0, 100.0, 50.0), 0.5);
        assert_eq!(gradient_ratio(GradientKind::Radial, 50.0, 25.0, 100.0, 50.0), 0.0);
        assert_eq!(gradient_ratio(GradientKind::Radial, 0.0, 0.0, 100.0, 50.0), 1.0);
        assert_eq!(gradient_ratio(GradientKind::Horizontal, 1.0, 1.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn interpolate_endpoints_and_padding() {
        let s = [Rgb8::new(10, 0, 0), Rgb8::new(0, 20, 0), Rgb8::new(0, 0, 30)];
        assert_eq!(interpolate(&s, 0.0), s[0]);
        assert_eq!(interpolate(&s, 0.5), s[1]);
        assert_eq!(interpolate(&s, 1.0), s[2]);
        assert_eq!(interpolate(&s[..2], 1.0), s[1]);
        assert_eq!(interpolate(&s[..1], 1.0), Rgb8::BLACK);
        assert_eq!(interpolate(&[], 0.3), Rgb8::BLACK);
    }

    #[test]
    fn horizontal_gradient_endpoints_on_canvas() {
        let mut c = Canvas::new(CanvasSize::new(64, 4).unwrap()).unwrap();
        let s = [Rgb8::new(0, 0, 0), Rgb8::new(100, 100, 100), Rgb8::new(200, 0, 0)];
        paint_gradient(&mut c, &s, GradientKind::Horizontal);
        assert_eq!(c.pixel(0, 2), Some([0, 0, 0, 255]));
        let right = c.pixel(63, 2).unwrap();
        assert!(right[0] > 190 && right[3] == 255);
    }

    #[test]
    fn image_matches_canvas_gradient() {
        let s = Palette::OceanDeep.stops();
        let mut c = Canvas::new(CanvasSize::new(32, 18).unwrap()).unwrap();
        paint_gradient(&mut c, &s, GradientKind::Radial);
        let img = gradient_image(32, 18, &s, GradientKind::Radial);
        for (x, y) in [(0, 0), (16, 9), (31, 17), (5, 12)] {
            let [r, g, b, _] = c.pixel(x, y).unwrap();
            assert_eq!(img.get_pixel(x, y).0, [r, g, b]);
        }
        assert_eq!(gradient_image(0, 5, &s, GradientKind::Diagonal).len(), 0);
    }
}
