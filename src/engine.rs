//! Poster generation entry points.

use std::path::Path;

use anyhow::Context as _;
use image::{DynamicImage, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::background::gradient::gradient_image;
use crate::background::{
    AiBackground, BackgroundSynthesizer, BackgroundTier, LocalBackgrounds, OrnamentConfig,
    apply_contrast,
};
use crate::compose::{Composer, compose};
use crate::encode::{ImageHost, encode_png, flatten, publish};
use crate::foundation::core::CanvasSize;
use crate::foundation::error::PosterResult;
use crate::raster::Canvas;
use crate::style::{StyleConfig, StyleOverrides};
use crate::text::{FontBook, FontResolver, PainterKind};
use crate::topic::{
    GradientKind, Palette, TemplateKind, TopicOverrides, TopicProfile, auto_emoji_title,
    classify_with,
};

pub const MAX_VARIANTS: usize = 5;

/// Input for one poster.
#[derive(Clone, Debug, Default)]
pub struct PosterRequest {
    pub title: String,
    pub hook: Option<String>,
    pub palette: Option<Palette>,
    pub gradient: Option<GradientKind>,
    pub template: Option<TemplateKind>,
    /// Pre-fetched background; skips background synthesis.
    pub background: Option<DynamicImage>,
    pub seed: Option<u64>,
}

impl PosterRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn hook(mut self, hook: impl Into<String>) -> Self {
        self.hook = Some(hook.into());
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn gradient(mut self, gradient: GradientKind) -> Self {
        self.gradient = Some(gradient);
        self
    }

    pub fn template(mut self, template: TemplateKind) -> Self {
        self.template = Some(template);
        self
    }

    pub fn background(mut self, image: DynamicImage) -> Self {
        self.background = Some(image);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn topic_overrides(&self) -> TopicOverrides {
        TopicOverrides {
            palette: self.palette,
            gradient: self.gradient,
            template: self.template,
        }
    }

    fn hook_text(&self) -> Option<&str> {
        self.hook.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }
}

/// A finished, opaque poster.
#[derive(Clone, Debug)]
pub struct Poster {
    pub title: String,
    pub image: RgbImage,
    pub profile: TopicProfile,
    pub tier: BackgroundTier,
    pub template: TemplateKind,
}

impl Poster {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> PosterResult<Vec<u8>> {
        encode_png(&self.image)
    }

    pub fn save_png(&self, path: &Path) -> PosterResult<()> {
        let png = self.to_png()?;
        std::fs::write(path, png).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

pub struct PosterEngineBuilder {
    size: CanvasSize,
    overrides: Option<StyleOverrides>,
    fonts: Option<FontResolver>,
    painter: PainterKind,
    ai: Option<AiBackground>,
    local: Option<LocalBackgrounds>,
    ornaments: OrnamentConfig,
    host: Option<Box<dyn ImageHost>>,
    seed: Option<u64>,
}

impl Default for PosterEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PosterEngineBuilder {
    pub fn new() -> Self {
        Self {
            size: CanvasSize::default(),
            overrides: None,
            fonts: None,
            painter: PainterKind::Auto,
            ai: None,
            local: None,
            ornaments: OrnamentConfig::default(),
            host: None,
            seed: None,
        }
    }

    pub fn size(mut self, size: CanvasSize) -> Self {
        self.size = size;
        self
    }

    pub fn style(mut self, overrides: StyleOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn fonts(mut self, fonts: FontResolver) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn painter(mut self, kind: PainterKind) -> Self {
        self.painter = kind;
        self
    }

    pub fn ai(mut self, ai: AiBackground) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn local(mut self, local: LocalBackgrounds) -> Self {
        self.local = Some(local);
        self
    }

    pub fn ornaments(mut self, ornaments: OrnamentConfig) -> Self {
        self.ornaments = ornaments;
        self
    }

    pub fn host(mut self, host: impl ImageHost + 'static) -> Self {
        self.host = Some(Box::new(host));
        self
    }

    /// Fixed seed for every call that does not bring its own.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> PosterEngine {
        let style = StyleConfig::resolve(self.overrides.as_ref());
        tracing::debug!(
            width = self.size.width,
            height = self.size.height,
            align = ?style.text_align,
            "poster engine ready"
        );
        PosterEngine {
            size: self.size,
            style,
            fonts: self.fonts.unwrap_or_default(),
            painter: self.painter,
            backgrounds: BackgroundSynthesizer {
                ai: self.ai,
                local: self.local,
                ornaments: self.ornaments,
            },
            host: self.host,
            seed: self.seed,
        }
    }
}

/// Turns headlines into posters. Shareable across threads; every call owns its own state.
pub struct PosterEngine {
    size: CanvasSize,
    style: StyleConfig,
    fonts: FontResolver,
    painter: PainterKind,
    backgrounds: BackgroundSynthesizer,
    host: Option<Box<dyn ImageHost>>,
    seed: Option<u64>,
}

impl std::fmt::Debug for PosterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosterEngine")
            .field("size", &self.size)
            .field("style", &self.style)
            .field("fonts", &self.fonts)
            .field("painter", &self.painter)
            .field("backgrounds", &self.backgrounds)
            .field("host", &self.host.is_some())
            .field("seed", &self.seed)
            .finish()
    }
}

impl Default for PosterEngine {
    fn default() -> Self {
        PosterEngineBuilder::new().build()
    }
}

impl PosterEngine {
    pub fn builder() -> PosterEngineBuilder {
        PosterEngineBuilder::new()
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    fn base_seed(&self, request: &PosterRequest) -> u64 {
        request
            .seed
            .or(self.seed)
            .unwrap_or_else(rand::random::<u64>)
    }

    fn profile(&self, request: &PosterRequest) -> TopicProfile {
        classify_with(
            &request.title,
            request.hook_text(),
            self.style.language,
            &request.topic_overrides(),
        )
    }

    /// Render one poster. Never fails: any stage that errors is logged and skipped.
    #[tracing::instrument(skip(self, request), fields(title = %request.title))]
    pub fn generate(&self, request: &PosterRequest) -> Poster {
        let profile = self.profile(request);
        let template = profile.template;
        self.generate_with(request, profile, template, self.base_seed(request))
    }

    /// Render and hand the PNG to the configured host.
    pub fn generate_and_upload(&self, request: &PosterRequest) -> (Poster, Option<String>) {
        let poster = self.generate(request);
        let url = match &self.host {
            Some(host) => publish(&poster, host.as_ref()),
            None => {
                tracing::debug!("no image host configured; skipping upload");
                None
            }
        };
        (poster, url)
    }

    /// `count` posters (clamped to 1..=5); variant `i` uses seed + i and the template
    /// `i` steps after the classified one.
    pub fn generate_variants(&self, request: &PosterRequest, count: usize) -> Vec<Poster> {
        let count = count.clamp(1, MAX_VARIANTS);
        let base = self.base_seed(request);
        let profile = self.profile(request);
        (0..count)
            .map(|i| {
                let template = profile.template.rotate(i);
                let seed = base.wrapping_add(i as u64);
                self.generate_with(request, profile.clone(), template, seed)
            })
            .collect()
    }

    /// Variants plus an upload per poster; failed uploads are dropped.
    pub fn generate_variants_and_upload(
        &self,
        request: &PosterRequest,
        count: usize,
    ) -> (Vec<Poster>, Vec<String>) {
        let posters = self.generate_variants(request, count);
        let urls = match &self.host {
            Some(host) => posters
                .iter()
                .filter_map(|p| publish(p, host.as_ref()))
                .collect(),
            None => Vec::new(),
        };
        (posters, urls)
    }

    fn generate_with(
        &self,
        request: &PosterRequest,
        mut profile: TopicProfile,
        template: TemplateKind,
        seed: u64,
    ) -> Poster {
        profile.template = template;
        let (image, tier) = match self.render(request, &profile, seed) {
            Ok(out) => out,
            Err(e) => {
                tracing::warn!(error = %e, "render failed; returning bare gradient");
                let image = gradient_image(
                    self.size.width,
                    self.size.height,
                    &profile.palette.stops(),
                    profile.gradient,
                );
                (image, BackgroundTier::Procedural)
            }
        };
        tracing::info!(
            bucket = profile.bucket.unwrap_or("generic"),
            palette = profile.palette.name(),
            ?template,
            ?tier,
            seed,
            "poster generated"
        );
        Poster {
            title: request.title.clone(),
            image,
            profile,
            tier,
            template,
        }
    }

    fn render(
        &self,
        request: &PosterRequest,
        profile: &TopicProfile,
        seed: u64,
    ) -> PosterResult<(RgbImage, BackgroundTier)> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut canvas = Canvas::new(self.size)?;
        let hook = request.hook_text();

        let supplied = request.background.as_ref().and_then(|img| {
            canvas
                .fill_cover(img)
                .inspect_err(|e| tracing::warn!(error = %e, "supplied background unusable"))
                .ok()
        });
        let tier = match supplied {
            Some(()) => BackgroundTier::Supplied,
            None => self
                .backgrounds
                .synthesize(&mut canvas, profile, &request.title, hook, &mut rng),
        };

        if let Err(e) = apply_contrast(&mut canvas, &self.style, profile.accent()) {
            tracing::warn!(error = %e, "contrast pass skipped");
        }

        let title = if self.style.auto_emoji_title {
            auto_emoji_title(&request.title, profile)
        } else {
            request.title.clone()
        };

        let fonts = FontBook::new(&self.fonts);
        let painter = self.painter.build(fonts.emoji_face());
        let mut composer = Composer {
            style: &self.style,
            profile,
            fonts,
            painter,
        };
        if let Err(e) = compose(&mut canvas, &mut composer, profile.template, &title, hook) {
            tracing::warn!(error = %e, "composition incomplete");
        }

        Ok((flatten(&canvas, [0, 0, 0]), tier))
    }
}

/// How many posters a post deserves: 1 for short simple headlines, up to 4 for long or
/// list/guide style content.
pub fn variant_count_hint(title: &str, summary: &str, has_existing_image: bool) -> usize {
    const CAROUSEL_KEYS: [&str; 29] = [
        "خطوة",
        "خطوات",
        "دليل",
        "شرح",
        "ملخص",
        "مقارنة",
        "أفضل",
        "افضل",
        "قائمة",
        "نصائح",
        "أخطاء",
        "اخطاء",
        "مميزات",
        "عيوب",
        "أسئلة",
        "اسئلة",
        "كيف",
        "لماذا",
        "how to",
        "guide",
        "step",
        "tips",
        "mistakes",
        "comparison",
        "vs",
        "top ",
        "best ",
        "checklist",
        "steps",
    ];

    let title = title.trim();
    let summary = summary.trim();
    let title_len = title.chars().count();
    let summary_len = summary.chars().count();
    let text = format!("{title} {summary}").to_lowercase();

    let numbered_list = title.chars().any(|c| c.is_ascii_digit())
        && (text.contains("top") || text.contains("أفضل") || text.contains("افضل"));
    let carousel = numbered_list || CAROUSEL_KEYS.iter().any(|k| text.contains(k));

    if title_len <= 55 && summary_len <= 140 && !carousel {
        return 1;
    }
    if title_len <= 85 && summary_len <= 240 && !carousel {
        return if has_existing_image { 1 } else { 2 };
    }
    if carousel && (title_len > 55 || summary_len > 140) {
        return 3;
    }
    if title_len > 95 || summary_len > 320 {
        return 4;
    }
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::ImageFetcher;

    fn engine() -> PosterEngine {
        PosterEngine::builder()
            .size(CanvasSize::new(300, 160).unwrap())
            .fonts(FontResolver::builtin_only())
            .seed(11)
            .build()
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PosterEngine>();
    }

    #[test]
    fn empty_title_still_renders() {
        let p = engine().generate(&PosterRequest::new(""));
        assert_eq!((p.width(), p.height()), (300, 160));
        assert_eq!(p.tier, BackgroundTier::Procedural);
    }

    #[test]
    fn same_seed_same_pixels() {
        let e = engine();
        let req = PosterRequest::new("Deterministic output").hook("seeded");
        let a = e.generate(&req);
        let b = e.generate(&req);
        assert_eq!(a.image.as_raw(), b.image.as_raw());
    }

    #[test]
    fn supplied_background_skips_synthesis() {
        let bg = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, image::Rgb([0, 200, 0])));
        let p = engine().generate(&PosterRequest::new("x").background(bg));
        assert_eq!(p.tier, BackgroundTier::Supplied);
    }

    struct Down;
    impl ImageFetcher for Down {
        fn fetch(&self, _: &str, _: CanvasSize, _: u64) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("timeout")
        }
    }

    #[test]
    fn ai_failure_degrades_silently() {
        let e = PosterEngine::builder()
            .size(CanvasSize::new(200, 100).unwrap())
            .fonts(FontResolver::builtin_only())
            .ai(AiBackground::new(Down))
            .build();
        let p = e.generate(&PosterRequest::new("Cloud news").seed(3));
        assert_eq!(p.tier, BackgroundTier::Procedural);
        assert_eq!(p.profile.bucket, Some("cloud"));
    }

    #[test]
    fn variants_clamp_and_rotate() {
        let e = engine();
        let req = PosterRequest::new("Rotating").template(TemplateKind::SplitHero);
        assert_eq!(e.generate_variants(&req, 0).len(), 1);
        let vs = e.generate_variants(&req, 9);
        assert_eq!(vs.len(), MAX_VARIANTS);
        assert_eq!(vs[0].template, TemplateKind::SplitHero);
        assert_eq!(vs[1].template, TemplateKind::SplitHero.rotate(1));
        assert_ne!(vs[0].image.as_raw(), vs[1].image.as_raw());
    }

    #[test]
    fn unusable_canvas_size_falls_back_to_gradient() {
        let e = PosterEngine::builder()
            .size(CanvasSize {
                width: 70_000,
                height: 2,
            })
            .fonts(FontResolver::builtin_only())
            .build();
        let req = PosterRequest::new("Oversized")
            .palette(Palette::SunsetGlow)
            .gradient(GradientKind::Horizontal)
            .seed(1);
        let p = e.generate(&req);
        assert_eq!(p.tier, BackgroundTier::Procedural);
        assert_eq!((p.width(), p.height()), (70_000, 2));
        let [first, _, last] = Palette::SunsetGlow.stops();
        assert_eq!(p.image.get_pixel(0, 0).0, [first.r, first.g, first.b]);
        let right = p.image.get_pixel(69_999, 1).0;
        assert_ne!(right, [first.r, first.g, first.b]);
        assert!(right.iter().zip([last.r, last.g, last.b]).all(|(a, b)| a.abs_diff(b) <= 1));
    }

    #[test]
    fn upload_without_host_is_none() {
        let (p, url) = engine().generate_and_upload(&PosterRequest::new("x"));
        assert!(url.is_none());
        assert_eq!(p.width(), 300);
    }

    #[test]
    fn hint_follows_length_and_keywords() {
        assert_eq!(variant_count_hint("Short news", "", false), 1);
        let medium = "A".repeat(70);
        assert_eq!(variant_count_hint(&medium, "", false), 2);
        assert_eq!(variant_count_hint(&medium, "", true), 1);
        let long_guide = format!("{} guide", "word ".repeat(14));
        assert_eq!(variant_count_hint(&long_guide, "", false), 3);
        let very_long = "B".repeat(120);
        assert_eq!(variant_count_hint(&very_long, "", false), 4);
        assert_eq!(variant_count_hint("Top 10 phones", "", false), 2);
    }
}
