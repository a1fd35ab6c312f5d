use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Context as _;

use crate::foundation::error::{PosterError, PosterResult};
use crate::text::runs::{is_emoji, is_emoji_component};
use crate::text::script::contains_rtl;

/// What a piece of text is used for; each role has its own candidate font list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FontRole {
    Title,
    Hook,
    Badge,
    Rtl,
    Emoji,
}

impl FontRole {
    pub const ALL: [FontRole; 5] = [
        FontRole::Title,
        FontRole::Hook,
        FontRole::Badge,
        FontRole::Rtl,
        FontRole::Emoji,
    ];

    fn index(self) -> usize {
        match self {
            FontRole::Title => 0,
            FontRole::Hook => 1,
            FontRole::Badge => 2,
            FontRole::Rtl => 3,
            FontRole::Emoji => 4,
        }
    }

    /// File names tried in order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            FontRole::Title => &[
                "NotoSans-Bold.ttf",
                "Roboto-Bold.ttf",
                "arialbd.ttf",
                "Arial Bold.ttf",
                "DejaVuSans-Bold.ttf",
                "LiberationSans-Bold.ttf",
            ],
            FontRole::Hook => &[
                "NotoSans-Regular.ttf",
                "Roboto-Regular.ttf",
                "arial.ttf",
                "Arial.ttf",
                "DejaVuSans.ttf",
                "LiberationSans-Regular.ttf",
            ],
            FontRole::Badge => &[
                "NotoSans-SemiBold.ttf",
                "Roboto-Medium.ttf",
                "NotoSans-Bold.ttf",
                "arialbd.ttf",
                "DejaVuSans-Bold.ttf",
            ],
            FontRole::Rtl => &[
                "NotoSansArabic-Bold.ttf",
                "NotoSansArabic-Regular.ttf",
                "NotoNaskhArabic-Regular.ttf",
                "Amiri-Regular.ttf",
                "Tahoma.ttf",
                "tahoma.ttf",
                "segoeui.ttf",
                "arial.ttf",
                "DejaVuSans.ttf",
            ],
            FontRole::Emoji => &[
                "NotoColorEmoji.ttf",
                "seguiemj.ttf",
                "Apple Color Emoji.ttc",
                "NotoEmoji-Regular.ttf",
                "TwemojiMozilla.ttf",
            ],
        }
    }

    /// Text blocks containing RTL script use the RTL font instead of their own role.
    pub fn for_text(self, text: &str) -> FontRole {
        match self {
            FontRole::Title | FontRole::Hook | FontRole::Badge if contains_rtl(text) => {
                FontRole::Rtl
            }
            other => other,
        }
    }
}

/// A font file read into memory, ready for both shaping and rasterization.
pub struct LoadedFont {
    pub path: PathBuf,
    pub(crate) shaping: parley::fontique::Blob<u8>,
    pub(crate) raster: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont").field("path", &self.path).finish()
    }
}

impl LoadedFont {
    pub fn load(path: &Path) -> PosterResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(PosterError::font(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            shaping: parley::fontique::Blob::from(bytes.clone()),
            raster: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        })
    }
}

/// Either a real font or the built-in placeholder.
#[derive(Clone, Debug)]
pub enum FontFace {
    File(Arc<LoadedFont>),
    /// Fixed-advance face painted as solid blocks; always available.
    Builtin,
}

impl FontFace {
    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin)
    }
}

/// A face at a concrete pixel size.
#[derive(Clone, Debug)]
pub struct FontHandle {
    pub role: FontRole,
    pub size: f32,
    pub face: FontFace,
}

impl FontHandle {
    pub fn builtin(role: FontRole, size: f32) -> Self {
        Self {
            role,
            size,
            face: FontFace::Builtin,
        }
    }
}

/// Horizontal advance of `c` in the placeholder face, in em.
pub fn builtin_advance_em(c: char) -> f32 {
    let cp = u32::from(c);
    if is_emoji_component(c)
        || matches!(
            cp,
            0x0300..=0x036F
                | 0x0610..=0x061A
                | 0x064B..=0x065F
                | 0x0670
                | 0x06D6..=0x06ED
                | 0x200B..=0x200F
                | 0x202A..=0x202E
                | 0x2066..=0x2069
        )
    {
        0.0
    } else if c.is_whitespace() {
        0.3
    } else if is_emoji(c) {
        1.0
    } else {
        0.55
    }
}

/// Width of `text` in the placeholder face at `size` px.
pub fn builtin_width(text: &str, size: f32) -> f32 {
    text.chars().map(builtin_advance_em).sum::<f32>() * size
}

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];
const MAX_DEPTH: usize = 4;

fn discover(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .max_depth(MAX_DEPTH)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            })
            .collect();
        files.sort();
        out.extend(files);
    }
    out
}

/// `POSTER_FONT_DIR`, the bundled `assets/fonts`, then platform font directories.
pub fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(d) = std::env::var("POSTER_FONT_DIR") {
        let d = d.trim();
        if !d.is_empty() {
            dirs.push(PathBuf::from(d));
        }
    }
    dirs.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));
    dirs.push(PathBuf::from("assets/fonts"));
    for d in [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/System/Library/Fonts",
        "/Library/Fonts",
        "C:/Windows/Fonts",
    ] {
        dirs.push(PathBuf::from(d));
    }
    dirs
}

static DEFAULT_DISCOVERY: OnceLock<Vec<PathBuf>> = OnceLock::new();

enum Discovery {
    Default,
    Dirs(OnceLock<Vec<PathBuf>>, Vec<PathBuf>),
    None,
}

/// Maps roles to font files. Resolution never fails: a role with no file on disk gets
/// [`FontFace::Builtin`]. Results are computed once per role and then only read.
pub struct FontResolver {
    discovery: Discovery,
    loaded: [OnceLock<FontFace>; 5],
}

impl std::fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.discovery {
            Discovery::Default => "default".to_string(),
            Discovery::Dirs(_, d) => format!("{d:?}"),
            Discovery::None => "builtin".to_string(),
        };
        f.debug_struct("FontResolver").field("dirs", &mode).finish()
    }
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FontResolver {
    /// Search the default directories (discovery shared process-wide).
    pub fn new() -> Self {
        Self::with_discovery(Discovery::Default)
    }

    /// Search only `dirs`, in order.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self::with_discovery(Discovery::Dirs(OnceLock::new(), dirs))
    }

    /// Never touch the filesystem; every role is the placeholder face.
    pub fn builtin_only() -> Self {
        Self::with_discovery(Discovery::None)
    }

    fn with_discovery(discovery: Discovery) -> Self {
        Self {
            discovery,
            loaded: Default::default(),
        }
    }

    fn files(&self) -> &[PathBuf] {
        match &self.discovery {
            Discovery::Default => DEFAULT_DISCOVERY
                .get_or_init(|| discover(&default_font_dirs()))
                .as_slice(),
            Discovery::Dirs(cache, dirs) => cache.get_or_init(|| discover(dirs)).as_slice(),
            Discovery::None => &[],
        }
    }

    /// First candidate file name present in the discovered files; candidate order wins
    /// over directory order.
    pub fn find(&self, role: FontRole) -> Option<PathBuf> {
        let files = self.files();
        role.candidates().iter().find_map(|name| {
            files
                .iter()
                .find(|p| {
                    p.file_name()
                        .and_then(|f| f.to_str())
                        .is_some_and(|f| f.eq_ignore_ascii_case(name))
                })
                .cloned()
        })
    }

    /// The face for `role`, loading it on first use.
    pub fn face(&self, role: FontRole) -> FontFace {
        self.loaded[role.index()]
            .get_or_init(|| match self.find(role) {
                Some(path) => match LoadedFont::load(&path) {
                    Ok(f) => {
                        tracing::debug!(?role, path = %path.display(), "font resolved");
                        FontFace::File(Arc::new(f))
                    }
                    Err(e) => {
                        tracing::warn!(?role, error = %e, "font load failed; using placeholder");
                        FontFace::Builtin
                    }
                },
                None => {
                    tracing::debug!(?role, "no font file found; using placeholder");
                    FontFace::Builtin
                }
            })
            .clone()
    }

    pub fn handle(&self, role: FontRole, size: f32) -> FontHandle {
        FontHandle {
            role,
            size,
            face: self.face(role),
        }
    }
}

/// Per-render memo of `(role, size)` → [`FontHandle`].
#[derive(Debug)]
pub struct FontBook<'a> {
    resolver: &'a FontResolver,
    cache: HashMap<(FontRole, u32), FontHandle>,
}

impl<'a> FontBook<'a> {
    pub fn new(resolver: &'a FontResolver) -> Self {
        Self {
            resolver,
            cache: HashMap::new(),
        }
    }

    pub fn get(&mut self, role: FontRole, size: f32) -> FontHandle {
        let size = if size.is_finite() { size.max(1.0) } else { 1.0 };
        self.cache
            .entry((role, size.to_bits()))
            .or_insert_with(|| self.resolver.handle(role, size))
            .clone()
    }

    /// The emoji face, independent of size.
    pub fn emoji_face(&self) -> FontFace {
        self.resolver.face(FontRole::Emoji)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_only_never_touches_disk() {
        let r = FontResolver::builtin_only();
        for role in FontRole::ALL {
            assert!(r.face(role).is_builtin());
            assert!(r.find(role).is_none());
        }
    }

    #[test]
    fn missing_dirs_fall_back_to_builtin() {
        let r = FontResolver::with_dirs(vec![PathBuf::from("/nonexistent/ogposter/fonts")]);
        assert!(r.handle(FontRole::Title, 40.0).face.is_builtin());
    }

    #[test]
    fn rtl_text_switches_role() {
        assert_eq!(FontRole::Title.for_text("مرحبا"), FontRole::Rtl);
        assert_eq!(FontRole::Badge.for_text("AI"), FontRole::Badge);
        assert_eq!(FontRole::Emoji.for_text("مرحبا"), FontRole::Emoji);
    }

    #[test]
    fn builtin_advances() {
        assert_eq!(builtin_width("", 100.0), 0.0);
        assert!((builtin_width("ab", 100.0) - 110.0).abs() < 1e-3);
        assert!((builtin_width("a b", 10.0) - 14.0).abs() < 1e-3);
        assert!((builtin_width("🤖", 10.0) - 10.0).abs() < 1e-3);
        assert_eq!(builtin_width("\u{200D}\u{FE0F}", 10.0), 0.0);
    }

    #[test]
    fn book_memoizes_by_role_and_size() {
        let r = FontResolver::builtin_only();
        let mut book = FontBook::new(&r);
        let a = book.get(FontRole::Hook, 30.0);
        let b = book.get(FontRole::Hook, 30.0);
        assert_eq!(a.size, b.size);
        assert_eq!(book.cache.len(), 1);
        book.get(FontRole::Hook, 28.0);
        assert_eq!(book.cache.len(), 2);
    }
}
