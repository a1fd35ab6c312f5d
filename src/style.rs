//! Poster style parameters: compiled-in defaults, optional per-deployment overrides, and the
//! clamping rules that turn any override into a usable [`StyleConfig`].

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::PosterResult;

/// Poster language. Drives badge labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Arabic.
    #[default]
    Ar,
    /// English.
    En,
}

/// Horizontal alignment for text blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Centered within the content bounds.
    #[default]
    Center,
    /// Flush with the right edge of the content bounds (RTL locales).
    Right,
}

/// Immutable, fully resolved style for one render.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StyleConfig {
    pub language: Language,
    pub text_align: TextAlign,

    pub title_font_size: u32,
    pub hook_font_size: u32,
    pub min_title_font_size: u32,
    pub min_hook_font_size: u32,
    pub max_title_lines: usize,
    pub max_hook_lines: usize,

    pub overlay_opacity: f32,
    pub card_opacity: u8,
    pub border_width: u32,
    pub border_glow: bool,

    pub text_shadow: bool,
    pub text_shadow_offset: u32,
    pub text_shadow_alpha: u8,
    pub text_outline_width: u32,
    pub text_outline_alpha: u8,

    pub watermark_text: String,
    pub watermark_opacity: f32,
    pub watermark_font_size: u32,

    pub auto_emoji_title: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            language: Language::Ar,
            text_align: TextAlign::Center,
            title_font_size: 104,
            hook_font_size: 52,
            min_title_font_size: 64,
            min_hook_font_size: 34,
            max_title_lines: 2,
            max_hook_lines: 1,
            overlay_opacity: 0.55,
            card_opacity: 150,
            border_width: 4,
            border_glow: true,
            text_shadow: true,
            text_shadow_offset: 3,
            text_shadow_alpha: 220,
            text_outline_width: 3,
            text_outline_alpha: 220,
            watermark_text: String::new(),
            watermark_opacity: 0.33,
            watermark_font_size: 18,
            auto_emoji_title: true,
        }
    }
}

/// Per-deployment overrides. `None` keeps the default for that field.
///
/// Integers are taken as `i64` and floats as `f64` so that out-of-range JSON values still
/// deserialize and get clamped instead of rejected.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverrides {
    /// When `false`, every override is ignored.
    pub enabled: bool,

    pub language: Option<Language>,
    pub text_align: Option<TextAlign>,

    pub title_font_size: Option<i64>,
    pub hook_font_size: Option<i64>,
    pub min_title_font_size: Option<i64>,
    pub min_hook_font_size: Option<i64>,
    pub max_title_lines: Option<i64>,
    pub max_hook_lines: Option<i64>,

    pub overlay_opacity: Option<f64>,
    pub card_opacity: Option<i64>,
    pub border_width: Option<i64>,
    pub border_glow: Option<bool>,

    pub text_shadow: Option<bool>,
    pub text_shadow_offset: Option<i64>,
    pub text_shadow_alpha: Option<i64>,
    pub text_outline_width: Option<i64>,
    pub text_outline_alpha: Option<i64>,

    pub watermark_text: Option<String>,
    pub watermark_opacity: Option<f64>,
    pub watermark_font_size: Option<i64>,

    pub auto_emoji_title: Option<bool>,
}

impl Default for StyleOverrides {
    fn default() -> Self {
        Self {
            enabled: true,
            language: None,
            text_align: None,
            title_font_size: None,
            hook_font_size: None,
            min_title_font_size: None,
            min_hook_font_size: None,
            max_title_lines: None,
            max_hook_lines: None,
            overlay_opacity: None,
            card_opacity: None,
            border_width: None,
            border_glow: None,
            text_shadow: None,
            text_shadow_offset: None,
            text_shadow_alpha: None,
            text_outline_width: None,
            text_outline_alpha: None,
            watermark_text: None,
            watermark_opacity: None,
            watermark_font_size: None,
            auto_emoji_title: None,
        }
    }
}

impl StyleOverrides {
    /// Overrides with nothing set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse overrides from a JSON document.
    pub fn from_json_str(json: &str) -> PosterResult<Self> {
        let o = serde_json::from_str(json).context("parse style overrides JSON")?;
        Ok(o)
    }

    /// Read and parse overrides from a JSON file.
    pub fn from_json_file(path: &Path) -> PosterResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read style overrides '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

fn clamp_int(v: Option<i64>, default: u32, lo: u32, hi: u32) -> u32 {
    match v {
        Some(v) => v.clamp(i64::from(lo), i64::from(hi)) as u32,
        None => default.clamp(lo, hi),
    }
}

fn clamp_unit(v: Option<f64>, default: f32) -> f32 {
    match v {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0) as f32,
        _ => default,
    }
}

impl StyleConfig {
    /// Merge `overrides` over the defaults, clamping every value into its documented range.
    ///
    /// Pure; a disabled override set yields the defaults.
    pub fn resolve(overrides: Option<&StyleOverrides>) -> StyleConfig {
        let d = StyleConfig::default();
        let Some(o) = overrides.filter(|o| o.enabled) else {
            return d;
        };

        let title_font_size = clamp_int(o.title_font_size, d.title_font_size, 16, 180);
        let hook_font_size = clamp_int(o.hook_font_size, d.hook_font_size, 12, 120);
        let min_title_font_size =
            clamp_int(o.min_title_font_size, d.min_title_font_size, 10, 160).min(title_font_size);
        let min_hook_font_size =
            clamp_int(o.min_hook_font_size, d.min_hook_font_size, 10, 100).min(hook_font_size);

        StyleConfig {
            language: o.language.unwrap_or(d.language),
            text_align: o.text_align.unwrap_or(d.text_align),
            title_font_size,
            hook_font_size,
            min_title_font_size,
            min_hook_font_size,
            max_title_lines: clamp_int(o.max_title_lines, d.max_title_lines as u32, 1, 5) as usize,
            max_hook_lines: clamp_int(o.max_hook_lines, d.max_hook_lines as u32, 0, 3) as usize,
            overlay_opacity: clamp_unit(o.overlay_opacity, d.overlay_opacity),
            card_opacity: clamp_int(o.card_opacity, u32::from(d.card_opacity), 0, 255) as u8,
            border_width: clamp_int(o.border_width, d.border_width, 0, 20),
            border_glow: o.border_glow.unwrap_or(d.border_glow),
            text_shadow: o.text_shadow.unwrap_or(d.text_shadow),
            text_shadow_offset: clamp_int(o.text_shadow_offset, d.text_shadow_offset, 0, 20),
            text_shadow_alpha: clamp_int(
                o.text_shadow_alpha,
                u32::from(d.text_shadow_alpha),
                0,
                255,
            ) as u8,
            text_outline_width: clamp_int(o.text_outline_width, d.text_outline_width, 0, 20),
            text_outline_alpha: clamp_int(
                o.text_outline_alpha,
                u32::from(d.text_outline_alpha),
                0,
                255,
            ) as u8,
            watermark_text: o
                .watermark_text
                .as_deref()
                .map(str::trim)
                .unwrap_or(d.watermark_text.as_str())
                .to_string(),
            watermark_opacity: clamp_unit(o.watermark_opacity, d.watermark_opacity),
            watermark_font_size: clamp_int(o.watermark_font_size, d.watermark_font_size, 8, 48),
            auto_emoji_title: o.auto_emoji_title.unwrap_or(d.auto_emoji_title),
        }
    }
}
