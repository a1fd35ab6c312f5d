use kurbo::{Point, Rect};

use crate::compose::{CONTENT_PADDING, Composer, Rule, StackSpec};
use crate::foundation::error::PosterResult;
use crate::raster::Canvas;
use crate::raster::shapes::{bezpath_to_cpu, circle, ring, rounded_rect};

pub const HERO_INSET_X: f64 = 70.0;
pub const HERO_INSET_Y: f64 = 55.0;
pub const HERO_RADIUS: f64 = 28.0;

pub const SPLIT_INSET: f64 = 40.0;
pub const SPLIT_PANEL_FRACTION: f64 = 0.6;
const SPLIT_CIRCLE_ALPHA: u8 = 70;
const SPLIT_RING_ALPHA: u8 = 120;

pub const MINIMAL_TITLE_SCALE: f32 = 1.1;
pub const MINIMAL_BADGE_AT: (f64, f64) = (40.0, 40.0);
const MINIMAL_INSET: f64 = 40.0;

fn canvas_rect(canvas: &Canvas) -> Rect {
    canvas.size().rect()
}

/// Panel minus padding; collapses to the panel center when too small.
fn content_bounds(panel: Rect) -> Rect {
    let inner = panel.inset(-CONTENT_PADDING);
    if inner.width() <= 0.0 || inner.height() <= 0.0 {
        let c = panel.center();
        return Rect::new(c.x, c.y, c.x, c.y);
    }
    inner
}

fn fill_panel(canvas: &mut Canvas, panel: Rect, radius: f64, alpha: u8) -> PosterResult<()> {
    if alpha == 0 || panel.width() <= 0.0 || panel.height() <= 0.0 {
        return Ok(());
    }
    canvas.draw(|ctx| {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, alpha));
        ctx.fill_path(&bezpath_to_cpu(&rounded_rect(panel, radius)));
    })
}

/// Centered rounded card with the badge at its top-left.
pub fn hero_card(
    canvas: &mut Canvas,
    composer: &mut Composer<'_, '_>,
    title: &str,
    hook: Option<&str>,
) -> PosterResult<()> {
    let panel = canvas_rect(canvas).inset((-HERO_INSET_X, -HERO_INSET_Y));
    fill_panel(canvas, panel, HERO_RADIUS, composer.style.card_opacity)?;

    let bounds = content_bounds(panel);
    let stack = composer.layout(
        title,
        hook,
        &StackSpec {
            bounds,
            title_scale: 1.0,
            rule: Rule::DIVIDER,
            badge_in_stack: true,
        },
    );
    composer.paint_stack(canvas, &stack, Some((bounds.x0, bounds.y0)))
}

/// Left text panel, decorative accent circle on the right.
pub fn split_hero(
    canvas: &mut Canvas,
    composer: &mut Composer<'_, '_>,
    title: &str,
    hook: Option<&str>,
) -> PosterResult<()> {
    let full = canvas_rect(canvas);
    let split_x = full.width() * SPLIT_PANEL_FRACTION;
    let panel = Rect::new(SPLIT_INSET, SPLIT_INSET, split_x, full.y1 - SPLIT_INSET);
    fill_panel(canvas, panel, HERO_RADIUS, composer.style.card_opacity)?;

    let accent = composer.profile.accent();
    let radius = full.height() * 0.3;
    let center = Point::new(split_x + (full.x1 - split_x) / 2.0, full.height() / 2.0);
    canvas.draw(|ctx| {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            accent.r,
            accent.g,
            accent.b,
            SPLIT_CIRCLE_ALPHA,
        ));
        ctx.fill_path(&bezpath_to_cpu(&circle(center, radius)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            accent.r,
            accent.g,
            accent.b,
            SPLIT_RING_ALPHA,
        ));
        ctx.fill_path(&bezpath_to_cpu(&ring(center, radius + 18.0, radius + 12.0)));
    })?;

    let bounds = content_bounds(panel);
    let stack = composer.layout(
        title,
        hook,
        &StackSpec {
            bounds,
            title_scale: 1.0,
            rule: Rule::DIVIDER,
            badge_in_stack: true,
        },
    );
    composer.paint_stack(canvas, &stack, Some((bounds.x0, bounds.y0)))
}

/// No panel: large title, accent underline, hook below, badge pinned top-left.
pub fn minimal_bold(
    canvas: &mut Canvas,
    composer: &mut Composer<'_, '_>,
    title: &str,
    hook: Option<&str>,
) -> PosterResult<()> {
    let full = canvas_rect(canvas);
    let bounds = content_bounds(full.inset(-MINIMAL_INSET));
    let mut stack = composer.layout(
        title,
        hook,
        &StackSpec {
            bounds,
            title_scale: MINIMAL_TITLE_SCALE,
            rule: Rule::UNDERLINE,
            badge_in_stack: false,
        },
    );
    // The pinned badge must not overlap the text.
    if let Some(b) = &stack.badge {
        let below = MINIMAL_BADGE_AT.1 + b.height + 12.0;
        stack.area.y0 = stack.area.y0.max(below).min(stack.area.y1);
    }
    composer.paint_stack(canvas, &stack, Some(MINIMAL_BADGE_AT))
}
