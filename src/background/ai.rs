//! Externally generated backgrounds: a prompt writer chain plus an image fetcher.

use crate::foundation::core::CanvasSize;
use crate::topic::TopicProfile;

/// Produces a short image-generation prompt for a headline.
pub trait PromptWriter: Send + Sync {
    /// Stable provider name for logs.
    fn name(&self) -> &str;

    fn write_prompt(
        &self,
        title: &str,
        hook: Option<&str>,
        profile: &TopicProfile,
    ) -> anyhow::Result<String>;
}

/// Template prompt built from the title and the palette mood. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicPrompt;

impl HeuristicPrompt {
    pub fn prompt(&self, title: &str, profile: &TopicProfile) -> String {
        let subject: String = title.split_whitespace().collect::<Vec<_>>().join(" ");
        let subject: String = subject.chars().take(120).collect();
        let theme = profile.bucket.unwrap_or("technology news");
        format!(
            "abstract editorial background about {theme}: {subject}, {mood}, \
             cinematic lighting, high detail, no text, no letters, no watermark",
            mood = profile.palette.mood(),
        )
    }
}

impl PromptWriter for HeuristicPrompt {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn write_prompt(
        &self,
        title: &str,
        _hook: Option<&str>,
        profile: &TopicProfile,
    ) -> anyhow::Result<String> {
        Ok(self.prompt(title, profile))
    }
}

/// Tries writers in order; the heuristic template is always the last resort.
#[derive(Default)]
pub struct PromptChain {
    writers: Vec<Box<dyn PromptWriter>>,
    fallback: HeuristicPrompt,
}

impl std::fmt::Debug for PromptChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptChain")
            .field(
                "writers",
                &self.writers.iter().map(|w| w.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl PromptChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(mut self, writer: impl PromptWriter + 'static) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    /// First non-empty prompt from the chain.
    pub fn prompt(&self, title: &str, hook: Option<&str>, profile: &TopicProfile) -> String {
        for w in &self.writers {
            match w.write_prompt(title, hook, profile) {
                Ok(p) if !p.trim().is_empty() => return p.trim().to_string(),
                Ok(_) => tracing::warn!(writer = w.name(), "prompt writer returned empty prompt"),
                Err(e) => tracing::warn!(writer = w.name(), error = %e, "prompt writer failed"),
            }
        }
        self.fallback.prompt(title, profile)
    }
}

/// Fetches encoded image bytes for a prompt.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, prompt: &str, size: CanvasSize, seed: u64) -> anyhow::Result<Vec<u8>>;
}

/// The AI tier: prompt chain plus fetcher.
pub struct AiBackground {
    pub prompts: PromptChain,
    pub fetcher: Box<dyn ImageFetcher>,
}

impl std::fmt::Debug for AiBackground {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiBackground")
            .field("prompts", &self.prompts)
            .finish_non_exhaustive()
    }
}

impl AiBackground {
    pub fn new(fetcher: impl ImageFetcher + 'static) -> Self {
        Self {
            prompts: PromptChain::new(),
            fetcher: Box::new(fetcher),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptChain) -> Self {
        self.prompts = prompts;
        self
    }

    /// Prompt, fetch and decode. Errors are left to the caller to log and fall through.
    pub fn fetch_image(
        &self,
        title: &str,
        hook: Option<&str>,
        profile: &TopicProfile,
        size: CanvasSize,
        seed: u64,
    ) -> anyhow::Result<image::DynamicImage> {
        let prompt = self.prompts.prompt(title, hook, profile);
        tracing::debug!(%prompt, "requesting AI background");
        let bytes = self.fetcher.fetch(&prompt, size, seed)?;
        let img = image::load_from_memory(&bytes)?;
        Ok(img)
    }
}

#[cfg(feature = "net")]
pub use pollinations::PollinationsFetcher;

#[cfg(feature = "net")]
mod pollinations {
    use std::time::Duration;

    use anyhow::Context as _;

    use super::ImageFetcher;
    use crate::foundation::core::CanvasSize;

    /// Text-to-image over plain HTTP GET.
    #[derive(Debug)]
    pub struct PollinationsFetcher {
        base_url: String,
        client: reqwest::blocking::Client,
    }

    impl PollinationsFetcher {
        pub const DEFAULT_BASE: &'static str = "https://image.pollinations.ai/prompt";
        pub const TIMEOUT: Duration = Duration::from_secs(45);

        pub fn new() -> anyhow::Result<Self> {
            Self::with_base_url(Self::DEFAULT_BASE)
        }

        pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Self::TIMEOUT)
                .build()
                .context("build HTTP client")?;
            Ok(Self {
                base_url: base_url.into(),
                client,
            })
        }

        pub(crate) fn url_for(
            &self,
            prompt: &str,
            size: CanvasSize,
            seed: u64,
        ) -> anyhow::Result<reqwest::Url> {
            let mut url = reqwest::Url::parse(&self.base_url)
                .with_context(|| format!("parse base url '{}'", self.base_url))?;
            url.path_segments_mut()
                .map_err(|_| anyhow::anyhow!("base url cannot carry a path"))?
                .push(prompt);
            url.query_pairs_mut()
                .append_pair("width", &size.width.to_string())
                .append_pair("height", &size.height.to_string())
                .append_pair("seed", &seed.to_string())
                .append_pair("nologo", "true");
            Ok(url)
        }
    }

    impl ImageFetcher for PollinationsFetcher {
        fn fetch(&self, prompt: &str, size: CanvasSize, seed: u64) -> anyhow::Result<Vec<u8>> {
            let url = self.url_for(prompt, size, seed)?;
            let resp = self
                .client
                .get(url)
                .send()
                .context("request AI background")?
                .error_for_status()
                .context("AI background status")?;
            let bytes = resp.bytes().context("read AI background body")?;
            Ok(bytes.to_vec())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Language;
    use crate::topic;

    struct Failing;
    impl PromptWriter for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn write_prompt(&self, _: &str, _: Option<&str>, _: &TopicProfile) -> anyhow::Result<String> {
            anyhow::bail!("quota exhausted")
        }
    }

    struct Fixed(&'static str);
    impl PromptWriter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn write_prompt(&self, _: &str, _: Option<&str>, _: &TopicProfile) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn chain_skips_failures_and_blanks() {
        let profile = topic::classify("AI", None, Language::En);
        let chain = PromptChain::new()
            .with_writer(Failing)
            .with_writer(Fixed("   "))
            .with_writer(Fixed(" galaxy "));
        assert_eq!(chain.prompt("AI", None, &profile), "galaxy");
    }

    #[test]
    fn empty_chain_uses_heuristic() {
        let profile = topic::classify("AI chips", None, Language::En);
        let p = PromptChain::new().prompt("AI   chips", None, &profile);
        assert!(p.contains("AI chips"));
        assert!(p.contains(profile.palette.mood()));
        assert!(p.contains("no text"));
    }

    struct Garbage;
    impl ImageFetcher for Garbage {
        fn fetch(&self, _: &str, _: CanvasSize, _: u64) -> anyhow::Result<Vec<u8>> {
            Ok(b"not an image".to_vec())
        }
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        let ai = AiBackground::new(Garbage);
        let profile = TopicProfile::generic();
        assert!(
            ai.fetch_image("x", None, &profile, CanvasSize::OG, 0)
                .is_err()
        );
    }
}
