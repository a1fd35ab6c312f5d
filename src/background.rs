//! Background synthesis with tiered fallback, plus the contrast pass applied to every tier.

pub mod ai;
pub mod gradient;
pub mod local;
pub mod ornament;

use rand::Rng;

use crate::foundation::core::{Rect, Rgb8};
use crate::foundation::error::PosterResult;
use crate::raster::Canvas;
use crate::raster::shapes::{bezpath_to_cpu, frame};
use crate::style::StyleConfig;
use crate::topic::TopicProfile;

pub use ai::{AiBackground, HeuristicPrompt, ImageFetcher, PromptChain, PromptWriter};
#[cfg(feature = "net")]
pub use ai::PollinationsFetcher;
pub use local::{LocalBackgrounds, PickStrategy};
pub use ornament::OrnamentConfig;

/// Which source produced the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundTier {
    /// Caller-provided image.
    Supplied,
    Ai,
    Local,
    Procedural,
}

/// Runs the AI → local → procedural chain.
#[derive(Debug, Default)]
pub struct BackgroundSynthesizer {
    pub ai: Option<AiBackground>,
    pub local: Option<LocalBackgrounds>,
    pub ornaments: OrnamentConfig,
}

impl BackgroundSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `canvas` with the first tier that succeeds. The procedural tier cannot fail
    /// short of a rasterizer error, in which case the plain gradient stays.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        canvas: &mut Canvas,
        profile: &TopicProfile,
        title: &str,
        hook: Option<&str>,
        rng: &mut R,
    ) -> BackgroundTier {
        if let Some(ai) = &self.ai {
            let seed = rng.r#gen::<u32>();
            let applied = ai
                .fetch_image(title, hook, profile, canvas.size(), u64::from(seed))
                .and_then(|img| canvas.fill_cover(&img).map_err(anyhow::Error::from));
            match applied {
                Ok(()) => return BackgroundTier::Ai,
                Err(e) => tracing::warn!(error = %e, "AI background failed; falling back"),
            }
        }

        if let Some(local) = &self.local {
            match local.paint(canvas, profile, rng) {
                Ok(_) => return BackgroundTier::Local,
                Err(e) => tracing::warn!(error = %e, "local background failed; falling back"),
            }
        }

        self.procedural(canvas, profile, rng);
        BackgroundTier::Procedural
    }

    /// Gradient plus ornaments.
    pub fn procedural<R: Rng + ?Sized>(
        &self,
        canvas: &mut Canvas,
        profile: &TopicProfile,
        rng: &mut R,
    ) {
        gradient::paint_gradient(canvas, &profile.palette.stops(), profile.gradient);
        if let Err(e) =
            ornament::draw_ornaments(canvas, profile.accent(), &self.ornaments, rng)
        {
            tracing::warn!(error = %e, "ornaments skipped");
        }
    }
}

/// Dark overlay, then the glow rings and main border in the accent color.
pub fn apply_contrast(canvas: &mut Canvas, style: &StyleConfig, accent: Rgb8) -> PosterResult<()> {
    canvas.fill_overlay(Rgb8::BLACK, style.overlay_opacity);

    let (w, h) = (f64::from(canvas.width()), f64::from(canvas.height()));
    let bw = f64::from(style.border_width);

    let mut rings = Vec::new();
    if style.border_glow {
        for i in 0..4u8 {
            let inset = bw + f64::from(4 - i) * 2.0;
            rings.push((inset, 2.0, 20 + i * 20));
        }
    }
    if style.border_width > 0 {
        rings.push((bw, bw, 180));
    }
    if rings.is_empty() {
        return Ok(());
    }

    canvas.draw(|ctx| {
        for (inset, width, alpha) in rings {
            let rect = Rect::new(inset, inset, w - inset, h - inset);
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                continue;
            }
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                accent.r, accent.g, accent.b, alpha,
            ));
            ctx.fill_path(&bezpath_to_cpu(&frame(rect, width)));
        }
    })
}
