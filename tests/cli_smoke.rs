use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_ogposter")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "ogposter.exe"
            } else {
                "ogposter"
            });
            p
        })
}

#[test]
fn cli_render_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let style_path = dir.join("style.json");
    std::fs::write(&style_path, r#"{"text_align": "right", "watermark_text": "ogposter"}"#)
        .unwrap();
    let out_path = dir.join("poster.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .env("POSTER_BACKGROUNDS_ENABLED", "0")
        .args(["render", "--title", "مرحبا بالعالم 🚀", "--hook", "CLI smoke test"])
        .args(["--template", "split-hero", "--seed", "3", "--style"])
        .arg(&style_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap();
    assert_eq!((img.width(), img.height()), (1200, 630));
}

#[test]
fn cli_hint_prints_count() {
    let out = std::process::Command::new(exe())
        .args(["hint", "--title", "Short news"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "1");
}
