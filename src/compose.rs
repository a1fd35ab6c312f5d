//! Template composition: panel, badge, text stack and watermark over a finished background.

pub mod badge;
pub mod templates;
pub mod watermark;

use kurbo::Rect;

use crate::foundation::core::Rgb8;
use crate::foundation::error::PosterResult;
use crate::raster::Canvas;
use crate::raster::shapes::rect_to_cpu;
use crate::style::{StyleConfig, TextAlign};
use crate::text::{FontBook, FontRole, GlyphPainter, TextBlock, TextEffects, align_x};
use crate::topic::{TemplateKind, TopicProfile};

pub use badge::Badge;

/// Space between a panel edge and its content.
pub const CONTENT_PADDING: f64 = 48.0;
pub const TITLE_LINE_HEIGHT: f32 = 1.18;
pub const HOOK_LINE_HEIGHT: f32 = 1.25;
const BADGE_GAP: f64 = 20.0;

/// Everything a template needs for one render.
pub struct Composer<'a, 'r> {
    pub style: &'a StyleConfig,
    pub profile: &'a TopicProfile,
    pub fonts: FontBook<'r>,
    pub painter: Box<dyn GlyphPainter>,
}

impl std::fmt::Debug for Composer<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Accent bar drawn between the title and the hook.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub width: f64,
    pub thickness: f64,
    /// Space above and below the bar.
    pub gap: f64,
    /// Draw even without a hook.
    pub always: bool,
}

impl Rule {
    pub const DIVIDER: Rule = Rule {
        width: 120.0,
        thickness: 3.0,
        gap: 18.0,
        always: false,
    };

    pub const UNDERLINE: Rule = Rule {
        width: 160.0,
        thickness: 6.0,
        gap: 20.0,
        always: true,
    };
}

/// How a template wants its text stack laid out.
#[derive(Clone, Copy, Debug)]
pub struct StackSpec {
    pub bounds: Rect,
    pub title_scale: f32,
    pub rule: Rule,
    /// Put the badge at the top of `bounds`.
    pub badge_in_stack: bool,
}

/// The measured text stack of a poster.
#[derive(Clone, Debug)]
pub struct TextStack {
    pub badge: Option<Badge>,
    pub title: TextBlock,
    pub hook: Option<TextBlock>,
    pub rule: Option<Rule>,
    /// Area the title/rule/hook stack is centered in.
    pub area: Rect,
}

impl TextStack {
    fn rule_height(&self) -> f64 {
        self.rule.map(|r| 2.0 * r.gap + r.thickness).unwrap_or(0.0)
    }

    /// Height of title + rule + hook.
    pub fn height(&self) -> f64 {
        f64::from(self.title.height())
            + self.rule_height()
            + self.hook.as_ref().map(|h| f64::from(h.height())).unwrap_or(0.0)
    }

    /// Top of the centered stack; never above the area.
    pub fn top(&self) -> f64 {
        let free = self.area.height() - self.height();
        self.area.y0 + (free / 2.0).max(0.0)
    }
}

impl Composer<'_, '_> {
    /// Fit and measure the title, hook and badge for `spec`.
    pub fn layout(&mut self, title: &str, hook: Option<&str>, spec: &StackSpec) -> TextStack {
        let style = self.style;
        let width = (spec.bounds.width() as f32).max(1.0);
        let mut area = spec.bounds;

        let badge = Badge::measure(self.profile, &mut self.fonts, self.painter.as_mut());
        if spec.badge_in_stack
            && let Some(b) = &badge
        {
            area.y0 = (area.y0 + b.height + BADGE_GAP).min(area.y1);
        }

        let title = TextBlock::fit(
            title,
            FontRole::Title,
            width,
            style.max_title_lines,
            style.title_font_size as f32 * spec.title_scale,
            style.min_title_font_size as f32,
            TITLE_LINE_HEIGHT,
            &mut self.fonts,
            self.painter.as_mut(),
        );

        let hook = hook
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(|h| {
                TextBlock::fit(
                    h,
                    FontRole::Hook,
                    width,
                    style.max_hook_lines,
                    style.hook_font_size as f32,
                    style.min_hook_font_size as f32,
                    HOOK_LINE_HEIGHT,
                    &mut self.fonts,
                    self.painter.as_mut(),
                )
            })
            .filter(|b| !b.is_empty());

        let rule = (hook.is_some() || spec.rule.always).then_some(spec.rule);

        TextStack {
            badge,
            title,
            hook,
            rule,
            area,
        }
    }

    /// Paint the stack (and the badge when `badge_at` is set) in one layer.
    pub fn paint_stack(
        &mut self,
        canvas: &mut Canvas,
        stack: &TextStack,
        badge_at: Option<(f64, f64)>,
    ) -> PosterResult<()> {
        let style = self.style;
        let accent = self.profile.accent();
        let effects = TextEffects::from_style(style);
        let painter = self.painter.as_mut();
        let (left, right) = (stack.area.x0, stack.area.x1);

        canvas.draw(|ctx| {
            if let (Some(badge), Some((x, y))) = (&stack.badge, badge_at) {
                badge.paint(ctx, painter, x, y, accent);
            }

            let mut y = stack.top();
            stack.title.paint(
                ctx,
                painter,
                left,
                right,
                y,
                style.text_align,
                Rgb8::WHITE.with_alpha(255),
                &effects,
            );
            y += f64::from(stack.title.height());

            if let Some(rule) = stack.rule {
                let x = rule_x(style.text_align, left, right, rule.width);
                let bar = Rect::new(x, y + rule.gap, x + rule.width, y + rule.gap + rule.thickness);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    accent.r, accent.g, accent.b, 255,
                ));
                ctx.fill_rect(&rect_to_cpu(bar));
                y += 2.0 * rule.gap + rule.thickness;
            }

            if let Some(hook) = &stack.hook {
                hook.paint(
                    ctx,
                    painter,
                    left,
                    right,
                    y,
                    style.text_align,
                    accent.with_alpha(255),
                    &effects,
                );
            }
        })
    }
}

fn rule_x(align: TextAlign, left: f64, right: f64, width: f64) -> f64 {
    align_x(align, left, right, width.min(right - left))
}

/// Draw `template` with its text over `canvas`, then the watermark.
pub fn compose(
    canvas: &mut Canvas,
    composer: &mut Composer<'_, '_>,
    template: TemplateKind,
    title: &str,
    hook: Option<&str>,
) -> PosterResult<()> {
    match template {
        TemplateKind::HeroCard => templates::hero_card(canvas, composer, title, hook)?,
        TemplateKind::SplitHero => templates::split_hero(canvas, composer, title, hook)?,
        TemplateKind::MinimalBold => templates::minimal_bold(canvas, composer, title, hook)?,
    }
    watermark::draw_watermark(canvas, composer)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::foundation::core::CanvasSize;
    use crate::text::{FontFace, FontResolver, SegmentedPainter};

    pub fn resolver() -> FontResolver {
        FontResolver::builtin_only()
    }

    pub fn composer<'a, 'r>(
        style: &'a StyleConfig,
        profile: &'a TopicProfile,
        resolver: &'r FontResolver,
    ) -> Composer<'a, 'r> {
        Composer {
            style,
            profile,
            fonts: FontBook::new(resolver),
            painter: Box::new(SegmentedPainter::new(FontFace::Builtin)),
        }
    }

    pub fn black_canvas() -> Canvas {
        let mut c = Canvas::new(CanvasSize::default()).unwrap();
        c.clear(Rgb8::BLACK);
        c
    }
}
