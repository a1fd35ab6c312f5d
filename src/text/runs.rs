use std::ops::Range;

/// Kind of a [`TextRun`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunKind {
    Plain,
    Emoji,
}

/// A maximal same-kind byte range of a string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub range: Range<usize>,
    pub kind: RunKind,
}

impl TextRun {
    /// The run's slice of `text`.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.range.clone()]
    }
}

/// Pictographic code points that render from an emoji font.
pub fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2300..=0x23FF
            | 0x2B00..=0x2BFF
            | 0x00A9
            | 0x00AE
            | 0x203C
            | 0x2049
            | 0x2122
            | 0x2139
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

/// Code points that modify the preceding emoji instead of standing alone: ZWJ, variation
/// selectors, skin tones, combining keycap and tag characters.
pub fn is_emoji_component(c: char) -> bool {
    matches!(
        u32::from(c),
        0x200D | 0xFE0E | 0xFE0F | 0x1F3FB..=0x1F3FF | 0x20E3 | 0xE0020..=0xE007F
    )
}

/// Bases that become an emoji only when followed by the combining keycap.
pub fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

/// End byte of a keycap sequence (`base FE0F? 20E3`) starting at `start`, if one does.
fn keycap_end(text: &str, start: usize) -> Option<usize> {
    let mut chars = text[start..].char_indices();
    let (_, base) = chars.next()?;
    if !is_keycap_base(base) {
        return None;
    }
    let (mut at, mut next) = chars.next()?;
    if next == '\u{FE0F}' {
        (at, next) = chars.next()?;
    }
    (next == '\u{20E3}').then(|| start + at + next.len_utf8())
}

/// True when the text opens with an emoji or a keycap sequence.
pub fn starts_with_emoji(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| is_emoji(c) && !is_emoji_component(c))
        || keycap_end(text, 0).is_some()
}

/// True when any character is an emoji.
pub fn contains_emoji(text: &str) -> bool {
    segment_runs(text).iter().any(|r| r.kind == RunKind::Emoji)
}

/// Split `text` into maximal plain / emoji runs covering every byte, in order.
///
/// Keycap sequences count as emoji. Other components never open a run; they extend
/// whichever run precedes them (a leading component starts a plain run).
pub fn segment_runs(text: &str) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut i = 0;
    while let Some(c) = text[i..].chars().next() {
        let (kind, end) = match keycap_end(text, i) {
            Some(end) => (RunKind::Emoji, end),
            None if is_emoji_component(c) && !runs.is_empty() => {
                let end = i + c.len_utf8();
                if let Some(last) = runs.last_mut() {
                    last.range.end = end;
                }
                i = end;
                continue;
            }
            None if is_emoji(c) && !is_emoji_component(c) => (RunKind::Emoji, i + c.len_utf8()),
            None => (RunKind::Plain, i + c.len_utf8()),
        };

        match runs.last_mut() {
            Some(last) if last.kind == kind => last.range.end = end,
            _ => runs.push(TextRun {
                range: i..end,
                kind,
            }),
        }
        i = end;
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(String, RunKind)> {
        segment_runs(text)
            .iter()
            .map(|r| (r.text(text).to_string(), r.kind))
            .collect()
    }

    #[test]
    fn runs_cover_input_without_gaps() {
        let text = "🚀 إطلاق GPT-5 اليوم 🔥🔥 done";
        let runs = segment_runs(text);
        assert_eq!(runs.first().unwrap().range.start, 0);
        assert_eq!(runs.last().unwrap().range.end, text.len());
        for w in runs.windows(2) {
            assert_eq!(w[0].range.end, w[1].range.start);
            assert_ne!(w[0].kind, w[1].kind);
        }
    }

    #[test]
    fn zwj_sequence_stays_in_one_run() {
        let text = "hi 👨‍👩‍👧 there";
        assert_eq!(
            kinds(text),
            vec![
                ("hi ".to_string(), RunKind::Plain),
                ("👨‍👩‍👧".to_string(), RunKind::Emoji),
                (" there".to_string(), RunKind::Plain),
            ]
        );
    }

    #[test]
    fn modifiers_attach_to_previous_emoji() {
        let text = "👍🏽☁️x";
        assert_eq!(
            kinds(text),
            vec![
                ("👍🏽☁️".to_string(), RunKind::Emoji),
                ("x".to_string(), RunKind::Plain),
            ]
        );
    }

    #[test]
    fn empty_and_plain_inputs() {
        assert!(segment_runs("").is_empty());
        assert_eq!(kinds("abc"), vec![("abc".to_string(), RunKind::Plain)]);
        assert_eq!(kinds("\u{FE0F}a"), vec![("\u{FE0F}a".to_string(), RunKind::Plain)]);
    }

    #[test]
    fn keycaps_join_the_emoji_run() {
        assert_eq!(
            kinds("Top 1\u{FE0F}\u{20E3} pick"),
            vec![
                ("Top ".to_string(), RunKind::Plain),
                ("1\u{FE0F}\u{20E3}".to_string(), RunKind::Emoji),
                (" pick".to_string(), RunKind::Plain),
            ]
        );
        assert_eq!(
            kinds("#\u{20E3}🔥x"),
            vec![
                ("#\u{20E3}🔥".to_string(), RunKind::Emoji),
                ("x".to_string(), RunKind::Plain),
            ]
        );
        assert_eq!(kinds("1\u{FE0F}"), vec![("1\u{FE0F}".to_string(), RunKind::Plain)]);
        assert_eq!(kinds("42"), vec![("42".to_string(), RunKind::Plain)]);
        assert!(starts_with_emoji("3\u{FE0F}\u{20E3} tips"));
        assert!(contains_emoji("step *\u{20E3}"));
        assert!(!contains_emoji("step 1"));
    }

    #[test]
    fn emoji_prefix_detection() {
        assert!(starts_with_emoji("🤖 AI"));
        assert!(!starts_with_emoji("AI 🤖"));
        assert!(contains_emoji("AI 🤖"));
        assert!(!starts_with_emoji(""));
    }
}
