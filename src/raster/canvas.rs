use image::{RgbaImage, imageops::FilterType};

use crate::foundation::core::{CanvasSize, Rgb8, Rgba8Premul};
use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::alpha_u8;
use crate::raster::{blur, composite};

/// Premultiplied RGBA8 drawing surface owned by one render.
///
/// Vector drawing goes through [`Canvas::draw`]: each call rasterizes into a fresh
/// transparent `vello_cpu` pixmap, which is then composited over the canvas.
pub struct Canvas {
    size: CanvasSize,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas").field("size", &self.size).finish()
    }
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(size: CanvasSize) -> PosterResult<Self> {
        let (w, h) = size_u16(size)?;
        Ok(Self {
            size,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Premultiplied pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (y as usize * self.size.width as usize + x as usize) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Overwrite every pixel with an opaque color.
    pub fn clear(&mut self, color: Rgb8) {
        let px = Rgba8Premul::from_straight_rgba(color.r, color.g, color.b, 255).to_array();
        for d in self.data_mut().chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Composite a uniform `color` at `opacity` over the whole canvas.
    pub fn fill_overlay(&mut self, color: Rgb8, opacity: f32) {
        let a = alpha_u8(opacity);
        if a == 0 {
            return;
        }
        let src = Rgba8Premul::from_straight_rgba(color.r, color.g, color.b, a).to_array();
        composite::solid_over_in_place(self.data_mut(), src);
    }

    /// Rasterize vector content with `f` and composite it over the canvas.
    pub fn draw<F>(&mut self, f: F) -> PosterResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext),
    {
        self.draw_with_opacity(1.0, f)
    }

    /// Like [`Canvas::draw`], compositing the whole layer at `opacity`.
    pub fn draw_with_opacity<F>(&mut self, opacity: f32, f: F) -> PosterResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext),
    {
        let (w, h) = size_u16(self.size)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        f(&mut ctx);
        ctx.flush();

        let mut layer = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut layer);
        composite::over_in_place(self.data_mut(), layer.data_as_u8_slice(), opacity)
    }

    /// Replace the canvas content with `image`, scaled to cover and center-cropped.
    pub fn fill_cover(&mut self, image: &image::DynamicImage) -> PosterResult<()> {
        let covered = cover_resize(image, self.size.width, self.size.height)?;
        self.replace_from_rgba(&covered)
    }

    /// Replace the canvas content with a straight-alpha image of identical size.
    pub fn replace_from_rgba(&mut self, img: &RgbaImage) -> PosterResult<()> {
        if img.width() != self.size.width || img.height() != self.size.height {
            return Err(PosterError::render(format!(
                "image {}x{} does not match canvas {}x{}",
                img.width(),
                img.height(),
                self.size.width,
                self.size.height
            )));
        }
        for (d, s) in self.data_mut().chunks_exact_mut(4).zip(img.as_raw().chunks_exact(4)) {
            d.copy_from_slice(&Rgba8Premul::from_straight_rgba(s[0], s[1], s[2], s[3]).to_array());
        }
        Ok(())
    }

    /// Gaussian-soften the whole canvas; `strength == 0` is a no-op.
    pub fn blur(&mut self, strength: u32) -> PosterResult<()> {
        let (w, h) = (self.size.width, self.size.height);
        blur::soften(self.data_mut(), w, h, strength)
    }
}

fn size_u16(size: CanvasSize) -> PosterResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| PosterError::validation("canvas width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| PosterError::validation("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(PosterError::validation("canvas width/height must be > 0"));
    }
    Ok((w, h))
}

/// Scale `image` by `max(W/w, H/h)` with Lanczos3, then center-crop to exactly `W×H`.
pub fn cover_resize(
    image: &image::DynamicImage,
    width: u32,
    height: u32,
) -> PosterResult<RgbaImage> {
    let (iw, ih) = (image.width(), image.height());
    if iw == 0 || ih == 0 {
        return Err(PosterError::decode("background image has zero size"));
    }
    if width == 0 || height == 0 {
        return Err(PosterError::validation("cover target must be non-empty"));
    }

    let scale = f64::max(
        f64::from(width) / f64::from(iw),
        f64::from(height) / f64::from(ih),
    );
    let sw = ((f64::from(iw) * scale).ceil() as u32).max(width);
    let sh = ((f64::from(ih) * scale).ceil() as u32).max(height);

    let scaled = image.resize_exact(sw, sh, FilterType::Lanczos3).to_rgba8();
    let x = (sw - width) / 2;
    let y = (sh - height) / 2;
    Ok(image::imageops::crop_imm(&scaled, x, y, width, height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CanvasSize {
        CanvasSize::new(16, 8).unwrap()
    }

    #[test]
    fn new_canvas_is_transparent() {
        let c = Canvas::new(small()).unwrap();
        assert!(c.data().iter().all(|&b| b == 0));
        assert_eq!(c.data().len(), 16 * 8 * 4);
    }

    #[test]
    fn overlay_darkens_opaque_canvas() {
        let mut c = Canvas::new(small()).unwrap();
        c.clear(Rgb8::WHITE);
        c.fill_overlay(Rgb8::BLACK, 1.0);
        assert_eq!(c.pixel(3, 3), Some([0, 0, 0, 255]));

        c.clear(Rgb8::WHITE);
        c.fill_overlay(Rgb8::BLACK, 0.0);
        assert_eq!(c.pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn draw_fills_inside_rect_only() {
        let mut c = Canvas::new(small()).unwrap();
        c.clear(Rgb8::BLACK);
        c.draw(|ctx| {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 0, 0, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 8.0, 8.0));
        })
        .unwrap();
        assert_eq!(c.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(c.pixel(12, 2), Some([0, 0, 0, 255]));
    }

    #[test]
    fn cover_resize_hits_exact_size() {
        let wide = image::DynamicImage::new_rgb8(400, 100);
        let tall = image::DynamicImage::new_rgb8(90, 500);
        for img in [wide, tall] {
            let out = cover_resize(&img, 120, 63).unwrap();
            assert_eq!(out.dimensions(), (120, 63));
        }
    }

    #[test]
    fn replace_rejects_wrong_size() {
        let mut c = Canvas::new(small()).unwrap();
        assert!(c.replace_from_rgba(&RgbaImage::new(4, 4)).is_err());
    }
}
