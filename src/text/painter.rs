//! Glyph measurement and painting.
//!
//! Text handed to a [`GlyphPainter`] is already in visual order (see
//! [`crate::text::script::shape_for_display`]). Painters wrap it in a left-to-right override
//! before shaping so that `parley` lays it out exactly as given.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

use kurbo::{Affine, Point, Rect};

use crate::raster::shapes::{affine_to_cpu, rect_to_cpu};
use crate::text::font::{FontFace, FontHandle, LoadedFont, builtin_advance_em};
use crate::text::runs::{RunKind, is_emoji, segment_runs};

const LRO: char = '\u{202D}';
const PDF: char = '\u{202C}';

/// Baseline position of the placeholder face, in em below the line top.
const BUILTIN_BASELINE_EM: f32 = 0.8;

/// Which face a shaped glyph run belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaceSlot {
    #[default]
    Primary,
    Emoji,
}

/// `parley` brush: the face slot only; color is chosen at paint time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphBrush {
    pub slot: FaceSlot,
}

/// Owns the `parley` contexts for one render.
pub struct Shaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    families: HashMap<PathBuf, Option<String>>,
}

impl std::fmt::Debug for Shaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shaper")
            .field("families", &self.families)
            .finish_non_exhaustive()
    }
}

impl Default for Shaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Register `font` once and return its family name.
    fn family(&mut self, font: &LoadedFont) -> Option<String> {
        if let Some(name) = self.families.get(&font.path) {
            return name.clone();
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(font.shaping.clone(), None);
        let name = families
            .first()
            .and_then(|(id, _)| self.font_ctx.collection.family_name(*id))
            .map(str::to_string);
        if name.is_none() {
            tracing::warn!(path = %font.path.display(), "font registered without a family name");
        }
        self.families.insert(font.path.clone(), name.clone());
        name
    }

    /// Lay out one line of visual-order `text` with `primary`, styling `emoji_ranges` with
    /// `emoji` when given.
    fn layout(
        &mut self,
        text: &str,
        primary: &LoadedFont,
        emoji: Option<(&LoadedFont, &[Range<usize>])>,
        size: f32,
    ) -> Option<parley::Layout<GlyphBrush>> {
        let primary_family = self.family(primary)?;
        let emoji_family = match emoji {
            Some((font, ranges)) if !ranges.is_empty() => {
                self.family(font).map(|name| (name, ranges))
            }
            _ => None,
        };

        let wrapped = format!("{LRO}{text}{PDF}");
        let shift = LRO.len_utf8();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &wrapped, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(primary_family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush::default()));
        if let Some((name, ranges)) = emoji_family {
            for r in ranges {
                let range = r.start + shift..r.end + shift;
                builder.push(
                    parley::style::StyleProperty::FontStack(parley::style::FontStack::Source(
                        Cow::Owned(name.clone()),
                    )),
                    range.clone(),
                );
                builder.push(
                    parley::style::StyleProperty::Brush(GlyphBrush {
                        slot: FaceSlot::Emoji,
                    }),
                    range,
                );
            }
        }

        let mut layout: parley::Layout<GlyphBrush> = builder.build(&wrapped);
        layout.break_all_lines(None);
        Some(layout)
    }
}

fn layout_width(layout: &parley::Layout<GlyphBrush>) -> f32 {
    layout.full_width()
}

fn layout_baseline(layout: &parley::Layout<GlyphBrush>) -> f32 {
    layout
        .lines()
        .next()
        .map(|l| l.metrics().baseline)
        .unwrap_or(0.0)
}

fn set_color(ctx: &mut vello_cpu::RenderContext, rgba: [u8; 4]) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
}

/// Paint a shaped layout with its top-left at `origin`.
fn paint_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<GlyphBrush>,
    primary: &LoadedFont,
    emoji: Option<&LoadedFont>,
    origin: Point,
    color: [u8; 4],
) {
    ctx.set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
    set_color(ctx, color);
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let font = match run.style().brush.slot {
                FaceSlot::Emoji => emoji.unwrap_or(primary),
                FaceSlot::Primary => primary,
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font.raster)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

/// Paint placeholder glyphs as solid blocks with the baseline at `baseline_y`.
fn paint_builtin(
    ctx: &mut vello_cpu::RenderContext,
    text: &str,
    size: f32,
    x: f64,
    baseline_y: f64,
    color: [u8; 4],
) {
    set_color(ctx, color);
    let size = f64::from(size);
    let mut cursor = x;
    for c in text.chars() {
        let adv = f64::from(builtin_advance_em(c)) * size;
        if adv > 0.0 && !c.is_whitespace() {
            let (top, inset) = if is_emoji(c) {
                (baseline_y - 0.75 * size, 0.08 * size)
            } else {
                (baseline_y - 0.62 * size, 0.06 * size)
            };
            let rect = Rect::new(cursor + inset, top, cursor + adv - inset, baseline_y);
            ctx.fill_rect(&rect_to_cpu(rect));
        }
        cursor += adv;
    }
}

/// Width of `text` in `face`, shaped on its own.
fn measure_face(shaper: &mut Shaper, face: &FontFace, size: f32, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    match face {
        FontFace::Builtin => crate::text::font::builtin_width(text, size),
        FontFace::File(font) => shaper
            .layout(text, font, None, size)
            .map(|l| layout_width(&l))
            .unwrap_or_else(|| crate::text::font::builtin_width(text, size)),
    }
}

fn baseline_offset(shaper: &mut Shaper, face: &FontFace, size: f32) -> f32 {
    match face {
        FontFace::Builtin => BUILTIN_BASELINE_EM * size,
        FontFace::File(font) => shaper
            .layout("H", font, None, size)
            .map(|l| layout_baseline(&l))
            .unwrap_or(BUILTIN_BASELINE_EM * size),
    }
}

/// Paint `text` in `face` so that its baseline sits at `baseline_y`; returns the advance.
fn paint_face(
    ctx: &mut vello_cpu::RenderContext,
    shaper: &mut Shaper,
    face: &FontFace,
    size: f32,
    text: &str,
    x: f64,
    baseline_y: f64,
    color: [u8; 4],
) -> f32 {
    match face {
        FontFace::File(font) => {
            if let Some(layout) = shaper.layout(text, font, None, size) {
                let top = baseline_y - f64::from(layout_baseline(&layout));
                paint_layout(ctx, &layout, font, None, Point::new(x, top), color);
                return layout_width(&layout);
            }
            paint_builtin(ctx, text, size, x, baseline_y, color);
            crate::text::font::builtin_width(text, size)
        }
        FontFace::Builtin => {
            paint_builtin(ctx, text, size, x, baseline_y, color);
            crate::text::font::builtin_width(text, size)
        }
    }
}

/// Measures and paints one line of visual-order text.
pub trait GlyphPainter {
    /// Total horizontal advance of `text` at `font`.
    fn measure(&mut self, font: &FontHandle, text: &str) -> f32;

    /// Paint `text` with the line box's top-left at `origin`.
    fn paint(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        font: &FontHandle,
        text: &str,
        origin: Point,
        color: [u8; 4],
    );
}

/// Shapes and paints each plain / emoji run separately, advancing by measured widths.
#[derive(Debug)]
pub struct SegmentedPainter {
    shaper: Shaper,
    emoji: FontFace,
}

impl SegmentedPainter {
    pub fn new(emoji: FontFace) -> Self {
        Self {
            shaper: Shaper::new(),
            emoji,
        }
    }
}

fn segmented_measure(shaper: &mut Shaper, emoji: &FontFace, font: &FontHandle, text: &str) -> f32 {
    segment_runs(text)
        .iter()
        .map(|run| {
            let face = match run.kind {
                RunKind::Emoji => emoji,
                RunKind::Plain => &font.face,
            };
            measure_face(shaper, face, font.size, run.text(text))
        })
        .sum()
}

fn segmented_paint(
    ctx: &mut vello_cpu::RenderContext,
    shaper: &mut Shaper,
    emoji: &FontFace,
    font: &FontHandle,
    text: &str,
    origin: Point,
    color: [u8; 4],
) {
    let baseline = origin.y + f64::from(baseline_offset(shaper, &font.face, font.size));
    let mut x = origin.x;
    for run in segment_runs(text) {
        let face = match run.kind {
            RunKind::Emoji => emoji,
            RunKind::Plain => &font.face,
        };
        let adv = paint_face(ctx, shaper, face, font.size, run.text(text), x, baseline, color);
        x += f64::from(adv);
    }
}

impl GlyphPainter for SegmentedPainter {
    fn measure(&mut self, font: &FontHandle, text: &str) -> f32 {
        segmented_measure(&mut self.shaper, &self.emoji, font, text)
    }

    fn paint(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        font: &FontHandle,
        text: &str,
        origin: Point,
        color: [u8; 4],
    ) {
        segmented_paint(ctx, &mut self.shaper, &self.emoji, font, text, origin, color);
    }
}

/// Shapes the whole line in one `parley` layout with emoji ranges on the emoji font.
/// Falls back to segmented behavior when either face is the placeholder.
#[derive(Debug)]
pub struct CombinedPainter {
    shaper: Shaper,
    emoji: FontFace,
}

impl CombinedPainter {
    pub fn new(emoji: FontFace) -> Self {
        Self {
            shaper: Shaper::new(),
            emoji,
        }
    }

    fn faces(&self, font: &FontHandle) -> Option<(Arc<LoadedFont>, Arc<LoadedFont>)> {
        match (&font.face, &self.emoji) {
            (FontFace::File(p), FontFace::File(e)) => Some((Arc::clone(p), Arc::clone(e))),
            _ => None,
        }
    }
}

fn emoji_ranges(text: &str) -> Vec<Range<usize>> {
    segment_runs(text)
        .into_iter()
        .filter(|r| r.kind == RunKind::Emoji)
        .map(|r| r.range)
        .collect()
}

impl GlyphPainter for CombinedPainter {
    fn measure(&mut self, font: &FontHandle, text: &str) -> f32 {
        let Some((primary, emoji)) = self.faces(font) else {
            return segmented_measure(&mut self.shaper, &self.emoji, font, text);
        };
        let ranges = emoji_ranges(text);
        match self
            .shaper
            .layout(text, &primary, Some((&emoji, &ranges)), font.size)
        {
            Some(layout) => layout_width(&layout),
            None => segmented_measure(&mut self.shaper, &self.emoji, font, text),
        }
    }

    fn paint(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        font: &FontHandle,
        text: &str,
        origin: Point,
        color: [u8; 4],
    ) {
        let Some((primary, emoji)) = self.faces(font) else {
            segmented_paint(ctx, &mut self.shaper, &self.emoji, font, text, origin, color);
            return;
        };
        let ranges = emoji_ranges(text);
        match self
            .shaper
            .layout(text, &primary, Some((&emoji, &ranges)), font.size)
        {
            Some(layout) => paint_layout(ctx, &layout, &primary, Some(&emoji), origin, color),
            None => segmented_paint(ctx, &mut self.shaper, &self.emoji, font, text, origin, color),
        }
    }
}

/// Which painter an engine uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PainterKind {
    /// Combined when an emoji font file is available, segmented otherwise.
    #[default]
    Auto,
    Combined,
    Segmented,
}

impl PainterKind {
    /// Resolve `Auto` against the available emoji face.
    pub fn resolve(self, emoji: &FontFace) -> PainterKind {
        match self {
            PainterKind::Auto if emoji.is_builtin() => PainterKind::Segmented,
            PainterKind::Auto => PainterKind::Combined,
            other => other,
        }
    }

    /// Fresh painter for one render.
    pub fn build(self, emoji: FontFace) -> Box<dyn GlyphPainter> {
        match self.resolve(&emoji) {
            PainterKind::Combined => Box::new(CombinedPainter::new(emoji)),
            _ => Box::new(SegmentedPainter::new(emoji)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::font::{FontRole, builtin_width};

    #[test]
    fn painters_agree_on_placeholder_advance() {
        let font = FontHandle::builtin(FontRole::Title, 40.0);
        let mut seg = SegmentedPainter::new(FontFace::Builtin);
        let mut comb = CombinedPainter::new(FontFace::Builtin);
        for text in ["", "hello", "🚀 launch 👨‍👩‍👧 day", "\u{FEB3}\u{FEFC}\u{FEE1} 🤖"] {
            let a = seg.measure(&font, text);
            let b = comb.measure(&font, text);
            assert!((a - b).abs() < 1e-3, "{text}: {a} vs {b}");
            assert!((a - builtin_width(text, 40.0)).abs() < 1e-3);
        }
    }

    #[test]
    fn auto_resolves_by_emoji_face() {
        assert_eq!(
            PainterKind::Auto.resolve(&FontFace::Builtin),
            PainterKind::Segmented
        );
        assert_eq!(
            PainterKind::Combined.resolve(&FontFace::Builtin),
            PainterKind::Combined
        );
    }

    #[test]
    fn placeholder_paint_marks_pixels() {
        let mut ctx = vello_cpu::RenderContext::new(64, 32);
        let mut p = SegmentedPainter::new(FontFace::Builtin);
        let font = FontHandle::builtin(FontRole::Hook, 20.0);
        p.paint(&mut ctx, &font, "ab", Point::new(2.0, 4.0), [255, 255, 255, 255]);
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(64, 32);
        ctx.render_to_pixmap(&mut pixmap);
        let lit = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .filter(|px| px[3] > 0)
            .count();
        assert!(lit > 50);
    }

    #[test]
    fn emoji_ranges_follow_segmentation() {
        let text = "a🤖b";
        assert_eq!(emoji_ranges(text), vec![1..5]);
    }
}
