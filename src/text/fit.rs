use crate::text::font::{FontBook, FontHandle, FontRole};
use crate::text::painter::GlyphPainter;
use crate::text::script::shape_for_display;

const SIZE_STEP: f32 = 2.0;

/// Greedy word wrap of `text` at `font`. Words are the whitespace-split logical text; each
/// candidate line is measured in display form. A word wider than `max_width` gets a line
/// of its own.
pub fn wrap_words(
    text: &str,
    font: &FontHandle,
    max_width: f32,
    painter: &mut dyn GlyphPainter,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if painter.measure(font, &shape_for_display(&candidate)) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Largest size in `min_size..=start_size` (2px steps) at which `text` wraps into at most
/// `max_lines` lines of `max_width`.
///
/// When even `min_size` does not fit, its wrapping is truncated to `max_lines`. The returned
/// lines are logical text; display shaping happens at paint time.
#[allow(clippy::too_many_arguments)]
pub fn fit_and_wrap(
    text: &str,
    role: FontRole,
    max_width: f32,
    max_lines: usize,
    start_size: f32,
    min_size: f32,
    fonts: &mut FontBook<'_>,
    painter: &mut dyn GlyphPainter,
) -> (FontHandle, Vec<String>) {
    let role = role.for_text(text);
    let start = if start_size.is_finite() { start_size.max(1.0) } else { 1.0 };
    let floor = if min_size.is_finite() { min_size.clamp(1.0, start) } else { start };

    if text.trim().is_empty() || max_lines == 0 {
        return (fonts.get(role, start), Vec::new());
    }

    let mut size = start;
    loop {
        let font = fonts.get(role, size);
        let lines = wrap_words(text, &font, max_width, painter);
        if lines.len() <= max_lines {
            return (font, lines);
        }
        if size <= floor {
            tracing::debug!(size, lines = lines.len(), max_lines, "text truncated at minimum size");
            let mut lines = lines;
            lines.truncate(max_lines);
            return (font, lines);
        }
        size = (size - SIZE_STEP).max(floor);
    }
}
