//! Text fitting, RTL shaping, emoji runs and glyph painting.

pub mod effects;
pub mod fit;
pub mod font;
pub mod painter;
pub mod runs;
pub mod script;

use kurbo::Point;

use crate::style::TextAlign;

pub use effects::TextEffects;
pub use fit::fit_and_wrap;
pub use font::{FontBook, FontFace, FontHandle, FontResolver, FontRole};
pub use painter::{CombinedPainter, GlyphPainter, PainterKind, SegmentedPainter};
pub use runs::{RunKind, TextRun, segment_runs};
pub use script::shape_for_display;

/// A fitted, wrapped block of text ready to paint.
#[derive(Clone, Debug)]
pub struct TextBlock {
    pub font: FontHandle,
    /// Logical lines as wrapped.
    pub lines: Vec<String>,
    /// The same lines in display order.
    pub display: Vec<String>,
    pub widths: Vec<f32>,
    pub line_height: f32,
}

impl TextBlock {
    /// Fit `text` into `max_width` × `max_lines` and measure the result.
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        text: &str,
        role: FontRole,
        max_width: f32,
        max_lines: usize,
        start_size: f32,
        min_size: f32,
        line_height_factor: f32,
        fonts: &mut FontBook<'_>,
        painter: &mut dyn GlyphPainter,
    ) -> Self {
        let (font, lines) = fit_and_wrap(
            text, role, max_width, max_lines, start_size, min_size, fonts, painter,
        );
        let display: Vec<String> = lines.iter().map(|l| shape_for_display(l)).collect();
        let widths = display.iter().map(|d| painter.measure(&font, d)).collect();
        let line_height = font.size * line_height_factor;
        Self {
            font,
            lines,
            display,
            widths,
            line_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn height(&self) -> f32 {
        self.line_height * self.lines.len() as f32
    }

    pub fn max_width(&self) -> f32 {
        self.widths.iter().copied().fold(0.0, f32::max)
    }

    /// Paint every line starting at `top`, aligned within `left..right`.
    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        painter: &mut dyn GlyphPainter,
        left: f64,
        right: f64,
        top: f64,
        align: TextAlign,
        color: [u8; 4],
        effects: &TextEffects,
    ) {
        let lh = f64::from(self.line_height);
        let pad = (lh - f64::from(self.font.size)) / 2.0;
        for (i, (line, width)) in self.display.iter().zip(&self.widths).enumerate() {
            let x = align_x(align, left, right, f64::from(*width));
            let y = top + lh * i as f64 + pad;
            effects::paint_text_line(
                ctx,
                painter,
                &self.font,
                line,
                Point::new(x, y),
                color,
                effects,
            );
        }
    }
}

/// Left edge of a line of `width` aligned inside `left..right`.
pub fn align_x(align: TextAlign, left: f64, right: f64, width: f64) -> f64 {
    match align {
        TextAlign::Center => left + (right - left - width) / 2.0,
        TextAlign::Right => right - width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_measures_each_line() {
        let resolver = FontResolver::builtin_only();
        let mut book = FontBook::new(&resolver);
        let mut painter = SegmentedPainter::new(FontFace::Builtin);
        let block = TextBlock::fit(
            "alpha beta gamma delta",
            FontRole::Hook,
            200.0,
            3,
            40.0,
            20.0,
            1.25,
            &mut book,
            &mut painter,
        );
        assert!(!block.is_empty());
        assert_eq!(block.widths.len(), block.lines.len());
        assert!(block.max_width() <= 200.0);
        assert!((block.height() - block.line_height * block.lines.len() as f32).abs() < 1e-3);
        assert!((block.line_height - block.font.size * 1.25).abs() < 1e-3);
    }

    #[test]
    fn alignment() {
        assert_eq!(align_x(TextAlign::Center, 0.0, 100.0, 40.0), 30.0);
        assert_eq!(align_x(TextAlign::Right, 0.0, 100.0, 40.0), 60.0);
    }
}
