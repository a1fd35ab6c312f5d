//! Right-to-left handling: Arabic contextual reshaping and bidi reordering to visual order.

use unicode_bidi::BidiInfo;

/// True for Arabic (all blocks incl. presentation forms) and Hebrew characters.
pub fn is_rtl_char(c: char) -> bool {
    matches!(
        u32::from(c),
        0x0590..=0x05FF
            | 0x0600..=0x06FF
            | 0x0750..=0x077F
            | 0x08A0..=0x08FF
            | 0xFB50..=0xFDFF
            | 0xFE70..=0xFEFF
    )
}

pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// Harakat and other marks that do not break joining.
fn is_transparent(c: char) -> bool {
    matches!(u32::from(c), 0x0610..=0x061A | 0x064B..=0x065F | 0x0670 | 0x06D6..=0x06ED)
}

/// Contextual forms of one letter. `initial`/`medial` are `None` for right-joining letters;
/// `fin` is `None` for letters that never join.
#[derive(Clone, Copy)]
struct Forms {
    iso: u32,
    fin: Option<u32>,
    ini: Option<u32>,
    med: Option<u32>,
}

const fn dual(base: u32) -> Forms {
    Forms {
        iso: base,
        fin: Some(base + 1),
        ini: Some(base + 2),
        med: Some(base + 3),
    }
}

const fn right(base: u32) -> Forms {
    Forms {
        iso: base,
        fin: Some(base + 1),
        ini: None,
        med: None,
    }
}

const NONE: Forms = Forms {
    iso: 0,
    fin: None,
    ini: None,
    med: None,
};

const TATWEEL: char = '\u{0640}';
const LAM: char = '\u{0644}';

fn forms(c: char) -> Option<Forms> {
    let f = match c {
        '\u{0621}' => Forms { iso: 0xFE80, ..NONE },
        '\u{0622}' => right(0xFE81),
        '\u{0623}' => right(0xFE83),
        '\u{0624}' => right(0xFE85),
        '\u{0625}' => right(0xFE87),
        '\u{0626}' => dual(0xFE89),
        '\u{0627}' => right(0xFE8D),
        '\u{0628}' => dual(0xFE8F),
        '\u{0629}' => right(0xFE93),
        '\u{062A}' => dual(0xFE95),
        '\u{062B}' => dual(0xFE99),
        '\u{062C}' => dual(0xFE9D),
        '\u{062D}' => dual(0xFEA1),
        '\u{062E}' => dual(0xFEA5),
        '\u{062F}' => right(0xFEA9),
        '\u{0630}' => right(0xFEAB),
        '\u{0631}' => right(0xFEAD),
        '\u{0632}' => right(0xFEAF),
        '\u{0633}' => dual(0xFEB1),
        '\u{0634}' => dual(0xFEB5),
        '\u{0635}' => dual(0xFEB9),
        '\u{0636}' => dual(0xFEBD),
        '\u{0637}' => dual(0xFEC1),
        '\u{0638}' => dual(0xFEC5),
        '\u{0639}' => dual(0xFEC9),
        '\u{063A}' => dual(0xFECD),
        '\u{0641}' => dual(0xFED1),
        '\u{0642}' => dual(0xFED5),
        '\u{0643}' => dual(0xFED9),
        '\u{0644}' => dual(0xFEDD),
        '\u{0645}' => dual(0xFEE1),
        '\u{0646}' => dual(0xFEE5),
        '\u{0647}' => dual(0xFEE9),
        '\u{0648}' => right(0xFEED),
        '\u{0649}' => right(0xFEEF),
        '\u{064A}' => dual(0xFEF1),
        '\u{0671}' => right(0xFB50),
        '\u{067E}' => dual(0xFB56),
        '\u{0686}' => dual(0xFB7A),
        '\u{0698}' => right(0xFB8A),
        '\u{06A9}' => dual(0xFB8E),
        '\u{06AF}' => dual(0xFB92),
        '\u{06CC}' => dual(0xFBFC),
        _ => return None,
    };
    Some(f)
}

/// Lam + alef ligature `(isolated, final)`.
fn lam_alef(alef: char) -> Option<(u32, u32)> {
    match alef {
        '\u{0622}' => Some((0xFEF5, 0xFEF6)),
        '\u{0623}' => Some((0xFEF7, 0xFEF8)),
        '\u{0625}' => Some((0xFEF9, 0xFEFA)),
        '\u{0627}' => Some((0xFEFB, 0xFEFC)),
        _ => None,
    }
}

/// Can `c` connect to the letter after it (in logical order)?
fn joins_forward(c: char) -> bool {
    c == TATWEEL || forms(c).is_some_and(|f| f.med.is_some())
}

/// Can `c` connect to the letter before it?
fn joins_backward(c: char) -> bool {
    c == TATWEEL || forms(c).is_some_and(|f| f.fin.is_some())
}

fn push_cp(out: &mut String, cp: u32, fallback: char) {
    out.push(char::from_u32(cp).unwrap_or(fallback));
}

/// Replace Arabic letters with their contextual presentation forms, in logical order.
///
/// Transparent marks are skipped when looking for neighbours and copied through unchanged.
/// Lam followed by an alef variant becomes a single ligature.
pub fn reshape_arabic(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let prev_letter = |i: usize| chars[..i].iter().rev().find(|c| !is_transparent(**c)).copied();
    let next_index = |i: usize| (i + 1..chars.len()).find(|&j| !is_transparent(chars[j]));

    let mut out = String::with_capacity(text.len());
    let mut resume = 0usize;
    for (i, &c) in chars.iter().enumerate() {
        if i < resume {
            continue;
        }
        let Some(f) = forms(c) else {
            out.push(c);
            continue;
        };

        let joins_prev = joins_backward(c) && prev_letter(i).is_some_and(joins_forward);
        let next = next_index(i);

        if c == LAM
            && let Some(j) = next
            && let Some((iso, fin)) = lam_alef(chars[j])
        {
            push_cp(&mut out, if joins_prev { fin } else { iso }, c);
            // Marks between lam and alef follow the ligature.
            for &m in &chars[i + 1..j] {
                out.push(m);
            }
            resume = j + 1;
            continue;
        }

        let joins_next = joins_forward(c) && next.is_some_and(|j| joins_backward(chars[j]));
        let cp = match (joins_prev, joins_next) {
            (true, true) => f.med,
            (true, false) => f.fin,
            (false, true) => f.ini,
            (false, false) => None,
        }
        .unwrap_or(f.iso);
        push_cp(&mut out, cp, c);
    }
    out
}

/// Reshape (when needed) and reorder `text` into left-to-right visual order for painting.
/// Text without RTL characters is returned unchanged.
pub fn shape_for_display(text: &str) -> String {
    if !contains_rtl(text) {
        return text.to_string();
    }
    let reshaped = reshape_arabic(text);
    let bidi = BidiInfo::new(&reshaped, None);
    let mut out = String::with_capacity(reshaped.len());
    for para in &bidi.paragraphs {
        let line = para.range.clone();
        out.push_str(&bidi.reorder_line(para, line));
    }
    out
}
