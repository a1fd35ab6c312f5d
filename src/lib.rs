//! ogposter turns a headline into a finished social-preview poster.
//!
//! The pipeline per call:
//!
//! - Resolve a [`StyleConfig`] and classify the text into a [`TopicProfile`]
//! - Fill the canvas from an AI image, a local image or a procedural gradient
//! - Compose one of the [`TemplateKind`] layouts with fitted, RTL-aware text
//! - Flatten to an opaque image and optionally hand it to an [`ImageHost`]
//!
//! Start with [`PosterEngine::builder`].
#![forbid(unsafe_code)]

mod foundation;

/// Background tiers and the contrast pass.
pub mod background;
/// Template layouts.
pub mod compose;
/// Flattening, encoding and upload.
pub mod encode;
/// Engine entry points.
pub mod engine;
pub(crate) mod raster;
/// Style defaults and overrides.
pub mod style;
/// Font resolution, fitting, shaping and glyph painting.
pub mod text;
/// Headline classification.
pub mod topic;

pub use crate::foundation::core::{CanvasSize, Point, Rect, Rgb8, Vec2};
pub use crate::foundation::error::{PosterError, PosterResult};

pub use crate::background::{
    AiBackground, BackgroundTier, HeuristicPrompt, ImageFetcher, LocalBackgrounds, PickStrategy,
    PromptChain, PromptWriter,
};
#[cfg(feature = "net")]
pub use crate::background::PollinationsFetcher;
#[cfg(feature = "net")]
pub use crate::encode::ImgbbHost;
pub use crate::encode::{ImageHost, KeyRing, encode_base64, encode_png, flatten, publish};
pub use crate::engine::{
    Poster, PosterEngine, PosterEngineBuilder, PosterRequest, variant_count_hint,
};
pub use crate::raster::Canvas;
pub use crate::style::{Language, StyleConfig, StyleOverrides, TextAlign};
pub use crate::text::{FontResolver, FontRole, GlyphPainter, PainterKind, fit_and_wrap};
pub use crate::topic::{GradientKind, Palette, TemplateKind, TopicProfile, classify};
