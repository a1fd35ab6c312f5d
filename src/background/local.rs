use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{PosterError, PosterResult};
use crate::raster::Canvas;
use crate::topic::{self, TopicProfile};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// How a local background file is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStrategy {
    /// Uniform random choice.
    Random,
    /// File-name relevance to the topic, random among ties.
    #[default]
    Topic,
}

/// A directory of curated backdrop images.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalBackgrounds {
    pub dir: PathBuf,
    pub strategy: PickStrategy,
    /// Gaussian blur strength; 0 disables.
    pub blur_radius: u32,
    /// Black dim overlay opacity in `[0, 1]`.
    pub dim_opacity: f32,
}

impl LocalBackgrounds {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            strategy: PickStrategy::Topic,
            blur_radius: 0,
            dim_opacity: 0.12,
        }
    }

    pub fn with_strategy(mut self, strategy: PickStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_blur(mut self, radius: u32) -> Self {
        self.blur_radius = radius.min(64);
        self
    }

    pub fn with_dim(mut self, opacity: f32) -> Self {
        self.dim_opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Read `POSTER_BACKGROUNDS_*` variables. Returns `None` unless enabled and a directory
    /// is set (defaulting to `assets/backgrounds`).
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let enabled = get("POSTER_BACKGROUNDS_ENABLED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        if !enabled {
            return None;
        }
        let dir = get("POSTER_BACKGROUNDS_DIR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "assets/backgrounds".to_string());
        let strategy = match get("POSTER_BACKGROUNDS_STRATEGY")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("random") => PickStrategy::Random,
            _ => PickStrategy::Topic,
        };
        let blur = get("POSTER_BACKGROUNDS_BLUR")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0);
        let dim = get("POSTER_BACKGROUNDS_DIM")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(0.12);

        Some(
            Self::new(dir)
                .with_strategy(strategy)
                .with_blur(blur)
                .with_dim(dim),
        )
    }

    /// Image files directly inside the directory, sorted by path.
    pub fn candidates(&self) -> PosterResult<Vec<PathBuf>> {
        let mut out = Vec::new();
        let walker = walkdir::WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);
        for entry in walker {
            match entry {
                Ok(e) if e.file_type().is_file() && has_image_extension(e.path()) => {
                    out.push(e.into_path());
                }
                Ok(_) => {}
                Err(e) if e.depth() == 0 => {
                    return Err(e)
                        .with_context(|| {
                            format!("read backgrounds dir '{}'", self.dir.display())
                        })
                        .map_err(PosterError::from);
                }
                Err(e) => tracing::debug!(error = %e, "skipping unreadable background entry"),
            }
        }
        out.sort();
        Ok(out)
    }

    /// Choose one of `candidates` for `profile`.
    pub fn pick<'a, R: Rng + ?Sized>(
        &self,
        candidates: &'a [PathBuf],
        profile: &TopicProfile,
        rng: &mut R,
    ) -> Option<&'a PathBuf> {
        if self.strategy == PickStrategy::Random {
            return candidates.choose(rng);
        }

        let scores: Vec<u32> = candidates.iter().map(|p| score_file(p, profile)).collect();
        let best = scores.iter().copied().max().unwrap_or(0);
        if best == 0 {
            return candidates.choose(rng);
        }
        let top: Vec<&PathBuf> = candidates
            .iter()
            .zip(&scores)
            .filter(|(_, s)| **s == best)
            .map(|(p, _)| p)
            .collect();
        top.choose(rng).copied()
    }

    /// Pick, decode, cover-crop, blur and dim a background into `canvas`.
    pub fn paint<R: Rng + ?Sized>(
        &self,
        canvas: &mut Canvas,
        profile: &TopicProfile,
        rng: &mut R,
    ) -> PosterResult<PathBuf> {
        let candidates = self.candidates()?;
        let path = self
            .pick(&candidates, profile, rng)
            .ok_or_else(|| PosterError::decode("no local background images"))?
            .clone();

        let img = image::open(&path).map_err(|e| {
            PosterError::decode(format!("decode background '{}': {e}", path.display()))
        })?;
        canvas.fill_cover(&img)?;
        canvas.blur(self.blur_radius)?;
        canvas.fill_overlay(Rgb8::BLACK, self.dim_opacity);
        tracing::debug!(path = %path.display(), "local background applied");
        Ok(path)
    }
}

fn has_image_extension(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Relevance of a file name to a profile: +3 per keyword of the profile's bucket found in
/// the stem, +1 when the stem mentions the palette name.
pub fn score_file(path: &Path, profile: &TopicProfile) -> u32 {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase()
        .replace(['_', '-', '.'], " ");

    let mut score = 0u32;
    if let Some(bucket) = profile.bucket.and_then(topic::bucket_named) {
        score += 3 * topic::keyword_hits(&stem, bucket) as u32;
    }
    let palette = profile.palette.name();
    if stem.contains(&palette.replace('_', " ")) || stem.contains(&palette.replace('_', "")) {
        score += 1;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Language;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/bg/{n}"))).collect()
    }

    #[test]
    fn topic_pick_prefers_keyword_file() {
        let profile = topic::classify("New AI model beats benchmarks", None, Language::En);
        let c = paths(&["ocean_waves.jpg", "ai_neural_glow.png", "city.webp"]);
        let local = LocalBackgrounds::new("/bg");
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = local.pick(&c, &profile, &mut rng).unwrap();
            assert!(p.ends_with("ai_neural_glow.png"));
        }
    }

    #[test]
    fn palette_name_breaks_zero_keyword_scores() {
        let profile = TopicProfile::generic();
        assert_eq!(score_file(Path::new("/bg/tech_blue_01.png"), &profile), 1);
        assert_eq!(score_file(Path::new("/bg/sunset.png"), &profile), 0);
    }

    #[test]
    fn all_zero_scores_fall_back_to_random() {
        let profile = TopicProfile::generic();
        let c = paths(&["a.png", "b.png"]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(LocalBackgrounds::new("/bg").pick(&c, &profile, &mut rng).is_some());
        assert!(
            LocalBackgrounds::new("/bg")
                .pick(&[], &profile, &mut rng)
                .is_none()
        );
    }

    #[test]
    fn env_lookup_parses_settings() {
        let vars = [
            ("POSTER_BACKGROUNDS_ENABLED", "1"),
            ("POSTER_BACKGROUNDS_DIR", "/srv/bg"),
            ("POSTER_BACKGROUNDS_STRATEGY", "random"),
            ("POSTER_BACKGROUNDS_BLUR", "6"),
            ("POSTER_BACKGROUNDS_DIM", "2.5"),
        ];
        let get = |k: &str| {
            vars.iter()
                .find(|(n, _)| *n == k)
                .map(|(_, v)| v.to_string())
        };
        let local = LocalBackgrounds::from_lookup(get).unwrap();
        assert_eq!(local.dir, PathBuf::from("/srv/bg"));
        assert_eq!(local.strategy, PickStrategy::Random);
        assert_eq!(local.blur_radius, 6);
        assert_eq!(local.dim_opacity, 1.0);

        assert!(LocalBackgrounds::from_lookup(|_| None).is_none());
    }

    #[test]
    fn candidates_list_only_top_level_images() {
        let dir = std::env::temp_dir().join(format!("ogposter-local-{}", std::process::id()));
        let nested = dir.join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        for name in ["b_cloud.png", "a_space.JPG", "notes.txt"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }
        std::fs::write(nested.join("deep.png"), b"x").unwrap();

        let found = LocalBackgrounds::new(&dir).candidates().unwrap();
        assert_eq!(found, vec![dir.join("a_space.JPG"), dir.join("b_cloud.png")]);

        std::fs::remove_dir_all(&dir).unwrap();
        assert!(LocalBackgrounds::new(&dir).candidates().is_err());
    }

    #[test]
    fn extension_filter() {
        assert!(has_image_extension(Path::new("x.JPG")));
        assert!(has_image_extension(Path::new("x.webp")));
        assert!(!has_image_extension(Path::new("x.txt")));
        assert!(!has_image_extension(Path::new("noext")));
    }
}
