use kurbo::{BezPath, Point};
use rand::Rng;

use crate::foundation::core::Rgb8;
use crate::foundation::error::PosterResult;
use crate::raster::Canvas;
use crate::raster::shapes::{bezpath_to_cpu, circle, line};

/// Counts and sizes for procedural decorations.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrnamentConfig {
    pub num_circles: u32,
    pub num_dots: u32,
    pub num_lines: u32,
    pub corner_size: f64,
    pub corner_inset: f64,
    pub corner_width: f64,
    pub corner_alpha: u8,
}

impl Default for OrnamentConfig {
    fn default() -> Self {
        Self {
            num_circles: 8,
            num_dots: 50,
            num_lines: 6,
            corner_size: 80.0,
            corner_inset: 20.0,
            corner_width: 3.0,
            corner_alpha: 30,
        }
    }
}

fn paint(ctx: &mut vello_cpu::RenderContext, path: &BezPath, rgba: [u8; 4]) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
    ctx.fill_path(&bezpath_to_cpu(path));
}

/// Scatter circles, star dots, corner lines and corner brackets over the canvas.
///
/// All placement comes from `rng`, so a seeded generator reproduces the same pattern.
pub fn draw_ornaments<R: Rng + ?Sized>(
    canvas: &mut Canvas,
    accent: Rgb8,
    cfg: &OrnamentConfig,
    rng: &mut R,
) -> PosterResult<()> {
    let w = canvas.width() as i64;
    let h = canvas.height() as i64;

    let mut shapes: Vec<(BezPath, [u8; 4])> = Vec::new();

    for _ in 0..cfg.num_circles {
        let (x, y) = if rng.gen_bool(0.5) {
            let x = if rng.gen_bool(0.5) {
                rng.gen_range(0..=w / 4)
            } else {
                rng.gen_range(3 * w / 4..=w)
            };
            let y = if rng.gen_bool(0.5) {
                rng.gen_range(0..=h / 3)
            } else {
                rng.gen_range(2 * h / 3..=h)
            };
            (x, y)
        } else {
            (rng.gen_range(0..=w), rng.gen_range(0..=h))
        };
        let radius = rng.gen_range(20..=120);
        let alpha = rng.gen_range(10..=40u8);
        shapes.push((
            circle(Point::new(x as f64, y as f64), f64::from(radius)),
            accent.with_alpha(alpha),
        ));
    }

    for _ in 0..cfg.num_dots {
        let x = rng.gen_range(0..=w);
        let y = rng.gen_range(0..=h);
        let r = rng.gen_range(1..=4);
        let alpha = rng.gen_range(30..=100u8);
        shapes.push((
            circle(Point::new(x as f64, y as f64), f64::from(r)),
            Rgb8::WHITE.with_alpha(alpha),
        ));
    }

    for i in 0..cfg.num_lines {
        let (sx, sy) = if i % 2 == 0 {
            (rng.gen_range(-50..=w / 4), rng.gen_range(-50..=h / 4))
        } else {
            (
                rng.gen_range(3 * w / 4..=w + 50),
                rng.gen_range(3 * h / 4..=h + 50),
            )
        };
        let length = f64::from(rng.gen_range(100..=300));
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let start = Point::new(sx as f64, sy as f64);
        let end = start + kurbo::Vec2::new(length * angle.cos(), length * angle.sin());
        let alpha = rng.gen_range(15..=35u8);
        let width = f64::from(rng.gen_range(1..=3));
        shapes.push((line(start, end, width), accent.with_alpha(alpha)));
    }

    let (wf, hf) = (w as f64, h as f64);
    let c = accent.with_alpha(cfg.corner_alpha);
    let (k, s, lw) = (cfg.corner_inset, cfg.corner_size, cfg.corner_width);
    for (cx, cy, dx, dy) in [
        (k, k, 1.0, 1.0),
        (wf - k, k, -1.0, 1.0),
        (k, hf - k, 1.0, -1.0),
        (wf - k, hf - k, -1.0, -1.0),
    ] {
        let corner = Point::new(cx, cy);
        shapes.push((line(corner, Point::new(cx, cy + dy * s), lw), c));
        shapes.push((line(corner, Point::new(cx + dx * s, cy), lw), c));
    }

    canvas.draw(|ctx| {
        for (path, rgba) in &shapes {
            paint(ctx, path, *rgba);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::CanvasSize;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn render(seed: u64) -> Vec<u8> {
        let mut c = Canvas::new(CanvasSize::new(240, 126).unwrap()).unwrap();
        c.clear(Rgb8::new(15, 23, 42));
        let mut rng = StdRng::seed_from_u64(seed);
        draw_ornaments(
            &mut c,
            Rgb8::new(139, 92, 246),
            &OrnamentConfig::default(),
            &mut rng,
        )
        .unwrap();
        c.data().to_vec()
    }

    #[test]
    fn same_seed_same_pattern() {
        assert_eq!(render(7), render(7));
    }

    #[test]
    fn ornaments_keep_canvas_opaque() {
        let data = render(3);
        assert!(data.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn corner_bracket_is_drawn() {
        let mut c = Canvas::new(CanvasSize::new(240, 126).unwrap()).unwrap();
        c.clear(Rgb8::BLACK);
        let cfg = OrnamentConfig {
            num_circles: 0,
            num_dots: 0,
            num_lines: 0,
            corner_alpha: 255,
            ..OrnamentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        draw_ornaments(&mut c, Rgb8::WHITE, &cfg, &mut rng).unwrap();
        // Inside the top-left horizontal arm.
        assert_eq!(c.pixel(50, 20), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(120, 63), Some([0, 0, 0, 255]));
    }
}
