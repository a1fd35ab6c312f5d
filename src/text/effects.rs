use kurbo::Point;

use crate::style::StyleConfig;
use crate::text::font::FontHandle;
use crate::text::painter::GlyphPainter;

/// Outline and drop shadow drawn under a text fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextEffects {
    /// Stamp radius in px; 0 disables the outline.
    pub outline_width: u32,
    pub outline_alpha: u8,
    pub shadow: bool,
    pub shadow_offset: u32,
    pub shadow_alpha: u8,
}

impl TextEffects {
    pub fn from_style(style: &StyleConfig) -> Self {
        Self {
            outline_width: style.text_outline_width,
            outline_alpha: style.text_outline_alpha,
            shadow: style.text_shadow,
            shadow_offset: style.text_shadow_offset,
            shadow_alpha: style.text_shadow_alpha,
        }
    }

    pub fn none() -> Self {
        Self {
            outline_width: 0,
            outline_alpha: 0,
            shadow: false,
            shadow_offset: 0,
            shadow_alpha: 0,
        }
    }

    /// Integer offsets inside the outline disc, excluding the center.
    pub fn outline_offsets(&self) -> Vec<(i32, i32)> {
        let r = i32::try_from(self.outline_width).unwrap_or(i32::MAX).min(20);
        let mut out = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx, dy) != (0, 0) && dx * dx + dy * dy <= r * r {
                    out.push((dx, dy));
                }
            }
        }
        out
    }
}

/// Paint one display-order line: outline, then shadow, then fill.
pub fn paint_text_line(
    ctx: &mut vello_cpu::RenderContext,
    painter: &mut dyn GlyphPainter,
    font: &FontHandle,
    display: &str,
    origin: Point,
    color: [u8; 4],
    effects: &TextEffects,
) {
    if display.is_empty() {
        return;
    }

    if effects.outline_width > 0 && effects.outline_alpha > 0 {
        // Opaque stamps inside one layer, so overlaps don't darken.
        ctx.push_opacity_layer(f32::from(effects.outline_alpha) / 255.0);
        for (dx, dy) in effects.outline_offsets() {
            let at = Point::new(origin.x + f64::from(dx), origin.y + f64::from(dy));
            painter.paint(ctx, font, display, at, [0, 0, 0, 255]);
        }
        ctx.pop_layer();
    }

    if effects.shadow && effects.shadow_alpha > 0 {
        let off = f64::from(effects.shadow_offset);
        let at = Point::new(origin.x + off, origin.y + off);
        painter.paint(ctx, font, display, at, [0, 0, 0, effects.shadow_alpha]);
    }

    painter.paint(ctx, font, display, origin, color);
}
