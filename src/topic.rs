//! Keyword-bucket topic classification.
//!
//! A [`TopicProfile`] bundles everything that gives a poster its look (palette, gradient,
//! template, badge). It is derived from the headline text by testing an ordered list of
//! keyword buckets; the first bucket with any hit wins.

use clap::ValueEnum;

use crate::foundation::core::Rgb8;
use crate::style::Language;
use crate::text::runs::starts_with_emoji;

/// Curated three-stop palettes. The last stop doubles as the accent color.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Palette {
    CosmicNight,
    SunsetGlow,
    OceanDeep,
    #[value(alias = "cyberpunk")]
    CyberPunk,
    ForestMist,
    RoyalGold,
    TechBlue,
    WarmEmber,
}

impl Palette {
    /// Every palette, in declaration order.
    pub const ALL: [Palette; 8] = [
        Palette::CosmicNight,
        Palette::SunsetGlow,
        Palette::OceanDeep,
        Palette::CyberPunk,
        Palette::ForestMist,
        Palette::RoyalGold,
        Palette::TechBlue,
        Palette::WarmEmber,
    ];

    /// Gradient stops, dark to light.
    pub fn stops(self) -> [Rgb8; 3] {
        match self {
            Palette::CosmicNight => [
                Rgb8::new(15, 23, 42),
                Rgb8::new(30, 58, 138),
                Rgb8::new(139, 92, 246),
            ],
            Palette::SunsetGlow => [
                Rgb8::new(127, 29, 29),
                Rgb8::new(194, 65, 12),
                Rgb8::new(251, 191, 36),
            ],
            Palette::OceanDeep => [
                Rgb8::new(6, 78, 59),
                Rgb8::new(13, 148, 136),
                Rgb8::new(45, 212, 191),
            ],
            Palette::CyberPunk => [
                Rgb8::new(30, 10, 60),
                Rgb8::new(236, 72, 153),
                Rgb8::new(34, 211, 238),
            ],
            Palette::ForestMist => [
                Rgb8::new(20, 30, 25),
                Rgb8::new(34, 87, 64),
                Rgb8::new(74, 222, 128),
            ],
            Palette::RoyalGold => [
                Rgb8::new(23, 23, 33),
                Rgb8::new(88, 28, 135),
                Rgb8::new(250, 204, 21),
            ],
            Palette::TechBlue => [
                Rgb8::new(15, 23, 42),
                Rgb8::new(37, 99, 235),
                Rgb8::new(96, 165, 250),
            ],
            Palette::WarmEmber => [
                Rgb8::new(69, 10, 10),
                Rgb8::new(185, 28, 28),
                Rgb8::new(252, 165, 165),
            ],
        }
    }

    /// Accent color (last stop).
    pub fn accent(self) -> Rgb8 {
        self.stops()[2]
    }

    /// Stable snake_case name, also used to match background file names.
    pub fn name(self) -> &'static str {
        match self {
            Palette::CosmicNight => "cosmic_night",
            Palette::SunsetGlow => "sunset_glow",
            Palette::OceanDeep => "ocean_deep",
            Palette::CyberPunk => "cyber_punk",
            Palette::ForestMist => "forest_mist",
            Palette::RoyalGold => "royal_gold",
            Palette::TechBlue => "tech_blue",
            Palette::WarmEmber => "warm_ember",
        }
    }

    /// Short mood words for prompt templates.
    pub fn mood(self) -> &'static str {
        match self {
            Palette::CosmicNight => "deep space, violet nebula glow",
            Palette::SunsetGlow => "warm sunset, golden light",
            Palette::OceanDeep => "deep ocean teal, calm water light",
            Palette::CyberPunk => "neon cyberpunk city, magenta and cyan",
            Palette::ForestMist => "misty forest, soft green light",
            Palette::RoyalGold => "luxurious dark purple with gold highlights",
            Palette::TechBlue => "clean modern technology, blue light",
            Palette::WarmEmber => "glowing embers, deep red",
        }
    }
}


/// How the gradient ratio is derived from pixel position.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Diagonal,
    Horizontal,
    Vertical,
    Radial,
}


/// Named poster layouts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    HeroCard,
    SplitHero,
    MinimalBold,
}

impl TemplateKind {
    /// Every template, in rotation order.
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::HeroCard,
        TemplateKind::SplitHero,
        TemplateKind::MinimalBold,
    ];

    /// The template `step` positions after `self` in rotation order.
    pub fn rotate(self, step: usize) -> TemplateKind {
        let i = TemplateKind::ALL
            .iter()
            .position(|t| *t == self)
            .unwrap_or(0);
        TemplateKind::ALL[(i + step) % TemplateKind::ALL.len()]
    }
}


/// Resolved look for one poster.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TopicProfile {
    /// Name of the bucket that matched, `None` for the generic profile.
    pub bucket: Option<&'static str>,
    pub palette: Palette,
    pub gradient: GradientKind,
    pub template: TemplateKind,
    pub badge_text: Option<String>,
    pub badge_emoji: Option<&'static str>,
}

impl TopicProfile {
    /// Profile used when no bucket matches.
    pub fn generic() -> Self {
        Self {
            bucket: None,
            palette: Palette::TechBlue,
            gradient: GradientKind::Diagonal,
            template: TemplateKind::HeroCard,
            badge_text: None,
            badge_emoji: None,
        }
    }

    /// Accent color of the palette.
    pub fn accent(&self) -> Rgb8 {
        self.palette.accent()
    }

    /// Replace classified values with explicit choices, field by field.
    pub fn with_overrides(mut self, overrides: &TopicOverrides) -> Self {
        if let Some(p) = overrides.palette {
            self.palette = p;
        }
        if let Some(g) = overrides.gradient {
            self.gradient = g;
        }
        if let Some(t) = overrides.template {
            self.template = t;
        }
        self
    }
}

/// Caller-chosen replacements for classified profile fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TopicOverrides {
    pub palette: Option<Palette>,
    pub gradient: Option<GradientKind>,
    pub template: Option<TemplateKind>,
}

/// One keyword bucket and the look it maps to.
#[derive(Debug)]
pub struct TopicBucket {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub palette: Palette,
    pub gradient: GradientKind,
    pub template: TemplateKind,
    pub badge_en: &'static str,
    pub badge_ar: &'static str,
    pub emoji: &'static str,
}

impl TopicBucket {
    fn profile(&self, language: Language) -> TopicProfile {
        let badge = match language {
            Language::Ar => self.badge_ar,
            Language::En => self.badge_en,
        };
        TopicProfile {
            bucket: Some(self.name),
            palette: self.palette,
            gradient: self.gradient,
            template: self.template,
            badge_text: Some(badge.to_string()),
            badge_emoji: Some(self.emoji),
        }
    }
}

// Order is priority.
static BUCKETS: [TopicBucket; 7] = [
    TopicBucket {
        name: "ai",
        keywords: &[
            "ai",
            "artificial intelligence",
            "machine learning",
            "deep learning",
            "llm",
            "gpt",
            "chatgpt",
            "openai",
            "neural",
            "gemini",
            "الذكاء الاصطناعي",
            "ذكاء اصطناعي",
            "الذكاء",
            "تعلم الآلة",
            "التعلم العميق",
            "نموذج لغوي",
        ],
        palette: Palette::CosmicNight,
        gradient: GradientKind::Diagonal,
        template: TemplateKind::HeroCard,
        badge_en: "AI",
        badge_ar: "ذكاء اصطناعي",
        emoji: "🤖",
    },
    TopicBucket {
        name: "security",
        keywords: &[
            "security",
            "cybersecurity",
            "cyber",
            "hack",
            "hacker",
            "hacked",
            "breach",
            "malware",
            "ransomware",
            "vulnerability",
            "phishing",
            "privacy",
            "encryption",
            "الأمن السيبراني",
            "أمن",
            "اختراق",
            "ثغرة",
            "هجوم",
            "تشفير",
            "خصوصية",
            "برمجيات خبيثة",
        ],
        palette: Palette::CyberPunk,
        gradient: GradientKind::Radial,
        template: TemplateKind::SplitHero,
        badge_en: "SECURITY",
        badge_ar: "أمن سيبراني",
        emoji: "🛡️",
    },
    TopicBucket {
        name: "cloud",
        keywords: &[
            "cloud",
            "aws",
            "azure",
            "gcp",
            "kubernetes",
            "docker",
            "serverless",
            "devops",
            "data center",
            "الحوسبة السحابية",
            "سحابة",
            "السحابة",
            "سحابي",
            "السحابية",
        ],
        palette: Palette::OceanDeep,
        gradient: GradientKind::Horizontal,
        template: TemplateKind::HeroCard,
        badge_en: "CLOUD",
        badge_ar: "الحوسبة السحابية",
        emoji: "☁️",
    },
    TopicBucket {
        name: "dev",
        keywords: &[
            "python",
            "javascript",
            "typescript",
            "rust",
            "programming",
            "developer",
            "developers",
            "code",
            "coding",
            "github",
            "api",
            "framework",
            "react",
            "linux",
            "open source",
            "برمجة",
            "البرمجة",
            "مطور",
            "المطورين",
            "كود",
            "مفتوح المصدر",
        ],
        palette: Palette::ForestMist,
        gradient: GradientKind::Vertical,
        template: TemplateKind::MinimalBold,
        badge_en: "DEV",
        badge_ar: "برمجة",
        emoji: "💻",
    },
    TopicBucket {
        name: "business",
        keywords: &[
            "business",
            "startup",
            "startups",
            "market",
            "stock",
            "stocks",
            "economy",
            "finance",
            "investment",
            "funding",
            "revenue",
            "ipo",
            "crypto",
            "bitcoin",
            "اقتصاد",
            "الاقتصاد",
            "الشركات",
            "استثمار",
            "تمويل",
            "أسهم",
            "عملات رقمية",
        ],
        palette: Palette::RoyalGold,
        gradient: GradientKind::Diagonal,
        template: TemplateKind::SplitHero,
        badge_en: "BUSINESS",
        badge_ar: "أعمال",
        emoji: "📈",
    },
    TopicBucket {
        name: "mobile",
        keywords: &[
            "iphone",
            "android",
            "smartphone",
            "mobile",
            "ios",
            "samsung",
            "app store",
            "هاتف",
            "الهواتف",
            "جوال",
            "أندرويد",
            "آيفون",
        ],
        palette: Palette::SunsetGlow,
        gradient: GradientKind::Vertical,
        template: TemplateKind::HeroCard,
        badge_en: "MOBILE",
        badge_ar: "هواتف",
        emoji: "📱",
    },
    TopicBucket {
        name: "science",
        keywords: &[
            "science",
            "space",
            "nasa",
            "physics",
            "research",
            "quantum",
            "climate",
            "biology",
            "العلوم",
            "علوم",
            "الفضاء",
            "فيزياء",
            "أبحاث",
            "المناخ",
            "كمومي",
        ],
        palette: Palette::WarmEmber,
        gradient: GradientKind::Radial,
        template: TemplateKind::MinimalBold,
        badge_en: "SCIENCE",
        badge_ar: "علوم",
        emoji: "🔬",
    },
];

/// The ordered bucket table.
pub fn buckets() -> &'static [TopicBucket] {
    &BUCKETS
}

/// Look up a bucket by name.
pub fn bucket_named(name: &str) -> Option<&'static TopicBucket> {
    BUCKETS.iter().find(|b| b.name == name)
}

/// Split already-lowercased text into alphanumeric tokens.
fn tokens(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_token_keyword(kw: &str) -> bool {
    kw.is_ascii() && !kw.contains(' ')
}

/// Count keywords of `bucket` present in already-lowercased `lower`.
///
/// Single ASCII words match whole tokens only ("ai" must not hit "said"); everything else
/// matches as a substring.
pub fn keyword_hits(lower: &str, bucket: &TopicBucket) -> usize {
    let toks = tokens(lower);
    bucket
        .keywords
        .iter()
        .filter(|kw| {
            if is_token_keyword(kw) {
                toks.iter().any(|t| t == *kw)
            } else {
                lower.contains(*kw)
            }
        })
        .count()
}

/// Map headline text to a [`TopicProfile`]. Deterministic; never panics.
pub fn classify(title: &str, hook: Option<&str>, language: Language) -> TopicProfile {
    let mut text = String::with_capacity(title.len() + 1 + hook.map_or(0, str::len));
    text.push_str(title);
    if let Some(h) = hook {
        text.push(' ');
        text.push_str(h);
    }
    let lower = text.to_lowercase();

    for bucket in &BUCKETS {
        if keyword_hits(&lower, bucket) > 0 {
            tracing::debug!(bucket = bucket.name, "topic bucket matched");
            return bucket.profile(language);
        }
    }
    TopicProfile::generic()
}

/// Classify, then apply explicit overrides.
pub fn classify_with(
    title: &str,
    hook: Option<&str>,
    language: Language,
    overrides: &TopicOverrides,
) -> TopicProfile {
    classify(title, hook, language).with_overrides(overrides)
}

/// Prefix the title with the profile's emoji unless it already starts with an emoji.
pub fn auto_emoji_title(title: &str, profile: &TopicProfile) -> String {
    let trimmed = title.trim_start();
    match profile.badge_emoji {
        Some(emoji) if !trimmed.is_empty() && !starts_with_emoji(trimmed) => {
            format!("{emoji} {trimmed}")
        }
        _ => title.to_string(),
    }
}
