use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ogposter", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a poster (or a set of variants) to PNG.
    Render(RenderArgs),
    /// Print how many variants a headline would get.
    Hint(HintArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Headline text.
    #[arg(long)]
    title: String,

    /// Optional subtitle.
    #[arg(long)]
    hook: Option<String>,

    /// Layout override (hero-card, split-hero, minimal-bold).
    #[arg(long, value_enum)]
    template: Option<ogposter::TemplateKind>,

    /// Palette override (e.g. cosmic_night).
    #[arg(long, value_enum)]
    palette: Option<ogposter::Palette>,

    /// Gradient override (diagonal, horizontal, vertical, radial).
    #[arg(long, value_enum)]
    gradient: Option<ogposter::GradientKind>,

    /// Style overrides JSON.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Pre-fetched background image.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Seed for deterministic output.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of variants; files get a `-N` suffix when more than one.
    #[arg(long, default_value_t = 1)]
    variants: usize,

    /// Glyph painter.
    #[arg(long, value_enum, default_value_t = PainterChoice::Auto)]
    painter: PainterChoice,

    /// Fetch an AI background before falling back to local/procedural.
    #[arg(long)]
    ai: bool,

    /// Upload to ImgBB (keys from IMGBB_API_KEYS / IMGBB_API_KEY).
    #[arg(long)]
    upload: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct HintArgs {
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    summary: String,

    /// The post already has an image.
    #[arg(long)]
    has_image: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PainterChoice {
    Auto,
    Combined,
    Segmented,
}

impl From<PainterChoice> for ogposter::PainterKind {
    fn from(c: PainterChoice) -> Self {
        match c {
            PainterChoice::Auto => ogposter::PainterKind::Auto,
            PainterChoice::Combined => ogposter::PainterKind::Combined,
            PainterChoice::Segmented => ogposter::PainterKind::Segmented,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Hint(args) => {
            let n = ogposter::variant_count_hint(&args.title, &args.summary, args.has_image);
            println!("{n}");
            Ok(())
        }
    }
}

fn build_engine(args: &RenderArgs) -> anyhow::Result<ogposter::PosterEngine> {
    let mut builder = ogposter::PosterEngine::builder().painter(args.painter.into());

    if let Some(path) = &args.style {
        builder = builder.style(ogposter::StyleOverrides::from_json_file(path)?);
    }
    if let Some(local) = ogposter::LocalBackgrounds::from_env() {
        builder = builder.local(local);
    }
    if args.ai {
        #[cfg(feature = "net")]
        {
            builder = builder.ai(ogposter::AiBackground::new(
                ogposter::PollinationsFetcher::new()?,
            ));
        }
        #[cfg(not(feature = "net"))]
        anyhow::bail!("--ai needs the `net` feature");
    }

    Ok(builder.build())
}

#[cfg(feature = "net")]
fn build_host(args: &RenderArgs) -> anyhow::Result<Option<Box<dyn ogposter::ImageHost>>> {
    if !args.upload {
        return Ok(None);
    }
    let keys = ogposter::KeyRing::from_env();
    anyhow::ensure!(
        !keys.is_empty(),
        "--upload needs IMGBB_API_KEYS or IMGBB_API_KEY"
    );
    Ok(Some(Box::new(ogposter::ImgbbHost::new(keys)?)))
}

#[cfg(not(feature = "net"))]
fn build_host(args: &RenderArgs) -> anyhow::Result<Option<Box<dyn ogposter::ImageHost>>> {
    anyhow::ensure!(!args.upload, "--upload needs the `net` feature");
    Ok(None)
}

fn variant_path(out: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return out.to_path_buf();
    }
    let stem = out.file_stem().and_then(|s| s.to_str()).unwrap_or("poster");
    let ext = out.extension().and_then(|s| s.to_str()).unwrap_or("png");
    out.with_file_name(format!("{stem}-{}.{ext}", index + 1))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let engine = build_engine(&args)?;
    let host = build_host(&args)?;

    let mut request = ogposter::PosterRequest::new(args.title.clone());
    request.hook = args.hook.clone();
    request.palette = args.palette;
    request.gradient = args.gradient;
    request.template = args.template;
    request.seed = args.seed;
    if let Some(path) = &args.background {
        let img = image::open(path)
            .with_context(|| format!("open background '{}'", path.display()))?;
        request.background = Some(img);
    }

    let posters = if args.variants > 1 {
        engine.generate_variants(&request, args.variants)
    } else {
        vec![engine.generate(&request)]
    };

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let total = posters.len();
    for (i, poster) in posters.iter().enumerate() {
        let path = variant_path(&args.out, i, total);
        poster.save_png(&path)?;
        eprintln!(
            "wrote {} ({:?}, {:?} background)",
            path.display(),
            poster.template,
            poster.tier
        );
        if let Some(host) = &host {
            match ogposter::publish(poster, host.as_ref()) {
                Some(url) => println!("{url}"),
                None => eprintln!("upload failed for {}", path.display()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_paths_get_suffixes() {
        let out = Path::new("out/poster.png");
        assert_eq!(variant_path(out, 0, 1), PathBuf::from("out/poster.png"));
        assert_eq!(variant_path(out, 1, 3), PathBuf::from("out/poster-2.png"));
    }

    #[test]
    fn cli_parses_render() {
        let cli = Cli::try_parse_from([
            "ogposter",
            "render",
            "--title",
            "Hello",
            "--template",
            "split-hero",
            "--palette",
            "cosmic_night",
            "--out",
            "x.png",
        ])
        .unwrap();
        let Command::Render(args) = cli.cmd else {
            panic!("expected render");
        };
        assert_eq!(args.template, Some(ogposter::TemplateKind::SplitHero));
        assert_eq!(args.palette, Some(ogposter::Palette::CosmicNight));
        assert_eq!(args.variants, 1);
    }
}
