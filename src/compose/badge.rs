use kurbo::{Point, Rect};

use crate::foundation::core::Rgb8;
use crate::raster::shapes::{bezpath_to_cpu, rounded_rect};
use crate::text::{FontBook, FontHandle, FontRole, GlyphPainter, shape_for_display};
use crate::topic::TopicProfile;

pub const BADGE_FONT_SIZE: f32 = 26.0;
const PAD_X: f64 = 16.0;
const PAD_Y: f64 = 8.0;
const FILL_ALPHA: u8 = 230;

/// Topic pill: emoji plus label on the accent color.
#[derive(Clone, Debug)]
pub struct Badge {
    pub font: FontHandle,
    /// Label in display order.
    pub display: String,
    pub text_width: f64,
    pub width: f64,
    pub height: f64,
}

/// `"{emoji} {text}"`, or just the text.
pub fn badge_label(profile: &TopicProfile) -> Option<String> {
    let text = profile.badge_text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(match profile.badge_emoji {
        Some(e) => format!("{e} {text}"),
        None => text.to_string(),
    })
}

impl Badge {
    /// `None` when the profile has no badge.
    pub fn measure(
        profile: &TopicProfile,
        fonts: &mut FontBook<'_>,
        painter: &mut dyn GlyphPainter,
    ) -> Option<Self> {
        let label = badge_label(profile)?;
        let font = fonts.get(FontRole::Badge.for_text(&label), BADGE_FONT_SIZE);
        let display = shape_for_display(&label);
        let text_width = f64::from(painter.measure(&font, &display));
        let height = f64::from(font.size) + 2.0 * PAD_Y;
        Some(Self {
            width: text_width + 2.0 * PAD_X,
            height,
            text_width,
            display,
            font,
        })
    }

    pub fn rect_at(&self, x: f64, y: f64) -> Rect {
        Rect::new(x, y, x + self.width, y + self.height)
    }

    /// Paint with the pill's top-left at `(x, y)`.
    pub fn paint(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        painter: &mut dyn GlyphPainter,
        x: f64,
        y: f64,
        accent: Rgb8,
    ) {
        let pill = rounded_rect(self.rect_at(x, y), self.height / 2.0);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            accent.r, accent.g, accent.b, FILL_ALPHA,
        ));
        ctx.fill_path(&bezpath_to_cpu(&pill));
        painter.paint(
            ctx,
            &self.font,
            &self.display,
            Point::new(x + PAD_X, y + PAD_Y),
            Rgb8::WHITE.with_alpha(255),
        );
    }
}
