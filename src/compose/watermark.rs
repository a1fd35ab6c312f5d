use kurbo::{Point, Rect};

use crate::compose::Composer;
use crate::foundation::error::PosterResult;
use crate::foundation::math::alpha_u8;
use crate::raster::Canvas;
use crate::raster::shapes::{bezpath_to_cpu, rounded_rect};
use crate::text::{FontRole, shape_for_display};

const PAD_X: f64 = 12.0;
const PAD_Y: f64 = 6.0;
const MARGIN: f64 = 24.0;
const BACKDROP_SHARE: f32 = 0.45;

/// Pill rectangle for a watermark of `text_width` × `font_size` on a `w`×`h` canvas.
pub fn watermark_rect(w: f64, h: f64, text_width: f64, font_size: f64) -> Rect {
    let pw = text_width + 2.0 * PAD_X;
    let ph = font_size + 2.0 * PAD_Y;
    let x1 = w - MARGIN;
    let y1 = h - MARGIN;
    Rect::new(x1 - pw, y1 - ph, x1, y1)
}

/// Bottom-right pill with the configured text; no-op for empty text.
pub fn draw_watermark(canvas: &mut Canvas, composer: &mut Composer<'_, '_>) -> PosterResult<()> {
    let style = composer.style;
    let text = style.watermark_text.trim();
    if text.is_empty() {
        return Ok(());
    }

    let role = FontRole::Hook.for_text(text);
    let font = composer.fonts.get(role, style.watermark_font_size as f32);
    let display = shape_for_display(text);
    let text_width = f64::from(composer.painter.measure(&font, &display));
    let rect = watermark_rect(
        f64::from(canvas.width()),
        f64::from(canvas.height()),
        text_width,
        f64::from(font.size),
    );

    let backdrop = alpha_u8(style.watermark_opacity * BACKDROP_SHARE);
    let ink = alpha_u8(style.watermark_opacity);
    let painter = composer.painter.as_mut();
    canvas.draw(|ctx| {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, backdrop));
        ctx.fill_path(&bezpath_to_cpu(&rounded_rect(rect, rect.height() / 2.0)));
        painter.paint(
            ctx,
            &font,
            &display,
            Point::new(rect.x0 + PAD_X, rect.y0 + PAD_Y),
            [255, 255, 255, ink],
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::test_support::*;
    use crate::style::StyleConfig;
    use crate::topic::TopicProfile;

    #[test]
    fn pill_sits_in_bottom_right_margin() {
        let r = watermark_rect(1200.0, 630.0, 100.0, 18.0);
        assert_eq!(r.x1, 1176.0);
        assert_eq!(r.y1, 606.0);
        assert_eq!(r.width(), 124.0);
        assert_eq!(r.height(), 30.0);
    }

    #[test]
    fn empty_text_is_skipped() {
        let style = StyleConfig::default();
        let profile = TopicProfile::generic();
        let r = resolver();
        let mut canvas = black_canvas();
        let before = canvas.data().to_vec();
        let mut c = composer(&style, &profile, &r);
        draw_watermark(&mut canvas, &mut c).unwrap();
        assert_eq!(canvas.data(), before.as_slice());
    }

    #[test]
    fn text_lightens_the_corner() {
        let style = StyleConfig {
            watermark_text: "ogposter".into(),
            watermark_opacity: 1.0,
            ..StyleConfig::default()
        };
        let profile = TopicProfile::generic();
        let r = resolver();
        let mut canvas = black_canvas();
        let mut c = composer(&style, &profile, &r);
        draw_watermark(&mut canvas, &mut c).unwrap();
        let lit = (1000..1176)
            .flat_map(|x| (576..606).map(move |y| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y).is_some_and(|p| p[0] > 200))
            .count();
        assert!(lit > 20);
        assert_eq!(canvas.pixel(10, 10), Some([0, 0, 0, 255]));
    }
}
