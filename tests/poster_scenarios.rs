use ogposter::background::gradient::{ease, gradient_ratio, interpolate};
use ogposter::{
    AiBackground, BackgroundTier, CanvasSize, FontResolver, GradientKind, ImageFetcher, Language,
    Palette, PosterEngine, PosterRequest, StyleConfig, StyleOverrides, TemplateKind, classify,
};

const ARABIC_TITLE: &str = "أهم أخبار الذكاء الاصطناعي اليوم";
const ARABIC_HOOK: &str = "ملخص سريع";

fn engine() -> PosterEngine {
    PosterEngine::builder()
        .fonts(FontResolver::builtin_only())
        .seed(42)
        .build()
}

#[test]
fn arabic_ai_headline_renders_full_size() {
    let profile = classify(ARABIC_TITLE, Some(ARABIC_HOOK), Language::Ar);
    assert_eq!(profile.bucket, Some("ai"));

    let poster = engine().generate(&PosterRequest::new(ARABIC_TITLE).hook(ARABIC_HOOK));
    assert_eq!((poster.width(), poster.height()), (1200, 630));
    assert_eq!(poster.profile.bucket, Some("ai"));
}

#[test]
fn classifier_is_deterministic() {
    for (title, hook) in [
        (ARABIC_TITLE, Some(ARABIC_HOOK)),
        ("Kubernetes 1.31 released", None),
        ("", None),
        ("🔥🔥🔥", Some("")),
    ] {
        let a = classify(title, hook, Language::En);
        let b = classify(title, hook, Language::En);
        assert_eq!(a, b);
    }
}

#[test]
fn png_decodes_to_canvas_dimensions() {
    let e = PosterEngine::builder()
        .size(CanvasSize::new(640, 336).unwrap())
        .fonts(FontResolver::builtin_only())
        .seed(1)
        .build();
    let poster = e.generate(&PosterRequest::new("Dimensions check").hook("sub"));
    let png = poster.to_png().unwrap();
    let back = image::load_from_memory(&png).unwrap();
    assert_eq!((back.width(), back.height()), (640, 336));
}

#[test]
fn out_of_range_overlay_is_clamped() {
    let overrides = StyleOverrides::from_json_str(r#"{"overlay_opacity": 5.0}"#).unwrap();
    assert_eq!(StyleConfig::resolve(Some(&overrides)).overlay_opacity, 1.0);

    let e = PosterEngine::builder()
        .size(CanvasSize::new(320, 168).unwrap())
        .fonts(FontResolver::builtin_only())
        .style(overrides)
        .build();
    assert_eq!(e.style().overlay_opacity, 1.0);
    let poster = e.generate(&PosterRequest::new("Overlay").seed(9));
    assert_eq!(poster.width(), 320);
}

struct Unreachable;

impl ImageFetcher for Unreachable {
    fn fetch(&self, _prompt: &str, _size: CanvasSize, _seed: u64) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("network unreachable")
    }
}

#[test]
fn failing_background_fetch_falls_back_to_gradient() {
    let e = PosterEngine::builder()
        .fonts(FontResolver::builtin_only())
        .ai(AiBackground::new(Unreachable))
        .seed(7)
        .build();
    let poster = e.generate(&PosterRequest::new(ARABIC_TITLE).hook(ARABIC_HOOK));
    assert_eq!(poster.tier, BackgroundTier::Procedural);
    assert_eq!((poster.width(), poster.height()), (1200, 630));
}

#[test]
fn gradient_endpoints_hit_first_and_last_stop() {
    let stops = Palette::SunsetGlow.stops();
    let (w, h) = (1200.0, 630.0);
    for kind in [
        GradientKind::Diagonal,
        GradientKind::Horizontal,
        GradientKind::Vertical,
    ] {
        let start = interpolate(&stops, ease(gradient_ratio(kind, 0.0, 0.0, w, h)));
        let end = interpolate(&stops, ease(gradient_ratio(kind, w, h, w, h)));
        assert_eq!(start, stops[0], "{kind:?}");
        assert_eq!(end, stops[2], "{kind:?}");
    }
    let center = interpolate(
        &stops,
        ease(gradient_ratio(GradientKind::Radial, w / 2.0, h / 2.0, w, h)),
    );
    let corner = interpolate(
        &stops,
        ease(gradient_ratio(GradientKind::Radial, 0.0, 0.0, w, h)),
    );
    assert_eq!(center, stops[0]);
    assert_eq!(corner, stops[2]);
}

#[test]
fn identical_seeds_reproduce_pixels() {
    let req = PosterRequest::new("Same seed, same poster")
        .hook("deterministic")
        .seed(123);
    let a = engine().generate(&req);
    let b = engine().generate(&req);
    assert_eq!(a.image.as_raw(), b.image.as_raw());

    let c = engine().generate(&req.clone().seed(124));
    assert_ne!(a.image.as_raw(), c.image.as_raw());
}

#[test]
fn explicit_template_and_palette_win() {
    let req = PosterRequest::new("Ransomware hits hospitals")
        .template(TemplateKind::MinimalBold)
        .palette(Palette::ForestMist);
    let poster = engine().generate(&req);
    assert_eq!(poster.profile.bucket, Some("security"));
    assert_eq!(poster.template, TemplateKind::MinimalBold);
    assert_eq!(poster.profile.palette, Palette::ForestMist);
}

#[test]
fn variants_are_clamped() {
    let e = PosterEngine::builder()
        .size(CanvasSize::new(240, 126).unwrap())
        .fonts(FontResolver::builtin_only())
        .seed(5)
        .build();
    let req = PosterRequest::new("Top 5 cloud tips");
    assert_eq!(e.generate_variants(&req, 0).len(), 1);
    assert_eq!(e.generate_variants(&req, 3).len(), 3);
    assert_eq!(e.generate_variants(&req, 50).len(), 5);
}
