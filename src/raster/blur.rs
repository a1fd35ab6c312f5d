//! Backdrop softening for local photos.
//!
//! Three running-sum box passes per axis approximate a gaussian of `sigma = strength`.
//! The buffer is premultiplied RGBA8, so channels average independently.

use crate::foundation::error::{PosterError, PosterResult};

const PASSES: usize = 3;

/// One axis of the image: `len` samples `step` bytes apart, repeated for `lines` lines
/// starting `line_step` bytes apart.
#[derive(Clone, Copy)]
struct Axis {
    len: usize,
    step: usize,
    lines: usize,
    line_step: usize,
}

impl Axis {
    fn rows(width: usize, height: usize) -> Self {
        Self {
            len: width,
            step: 4,
            lines: height,
            line_step: width * 4,
        }
    }

    fn columns(width: usize, height: usize) -> Self {
        Self {
            len: height,
            step: width * 4,
            lines: width,
            line_step: 4,
        }
    }
}

/// Box half-widths whose successive passes add up to roughly `sigma²` of variance.
fn box_radii(sigma: f32) -> [usize; PASSES] {
    let n = PASSES as f32;
    let var12 = 12.0 * sigma * sigma;
    let ideal = (var12 / n + 1.0).sqrt();
    let mut small = ideal.floor() as usize;
    if small % 2 == 0 {
        small = small.saturating_sub(1);
    }
    let small = small.max(1);
    let s = small as f32;
    let small_count = ((var12 - n * s * s - 4.0 * n * s - 3.0 * n) / (-4.0 * s - 4.0))
        .round()
        .clamp(0.0, n) as usize;

    let mut radii = [0; PASSES];
    for (i, r) in radii.iter_mut().enumerate() {
        let size = if i < small_count { small } else { small + 2 };
        *r = size / 2;
    }
    radii
}

/// Sliding-window mean along `axis` with edge samples repeated.
fn box_pass(src: &[u8], dst: &mut [u8], axis: Axis, radius: usize) {
    let window = (2 * radius + 1) as u32;
    let last = axis.len - 1;
    for line in 0..axis.lines {
        let base = line * axis.line_step;
        let at = |i: usize| base + i.min(last) * axis.step;

        let mut sum = [0u32; 4];
        for k in 0..window as usize {
            let i = at(k.saturating_sub(radius));
            for (c, s) in sum.iter_mut().enumerate() {
                *s += u32::from(src[i + c]);
            }
        }

        for i in 0..axis.len {
            let o = at(i);
            for (c, s) in sum.iter().enumerate() {
                dst[o + c] = ((s + window / 2) / window) as u8;
            }
            let leaving = at(i.saturating_sub(radius));
            let entering = at(i + radius + 1);
            for (c, s) in sum.iter_mut().enumerate() {
                *s = *s + u32::from(src[entering + c]) - u32::from(src[leaving + c]);
            }
        }
    }
}

/// Soften `data` (premultiplied RGBA8, `width * height * 4` bytes) in place.
///
/// `strength` is the gaussian sigma in pixels; `0` leaves the buffer untouched.
pub fn soften(data: &mut [u8], width: u32, height: u32, strength: u32) -> PosterResult<()> {
    let (w, h) = (width as usize, height as usize);
    if w.checked_mul(h).and_then(|n| n.checked_mul(4)) != Some(data.len()) {
        return Err(PosterError::render(format!(
            "soften: buffer of {} bytes does not match {width}x{height}",
            data.len()
        )));
    }
    if strength == 0 || w == 0 || h == 0 {
        return Ok(());
    }

    let mut tmp = vec![0u8; data.len()];
    for radius in box_radii(strength as f32) {
        if radius == 0 {
            continue;
        }
        box_pass(data, &mut tmp, Axis::rows(w, h), radius);
        box_pass(&tmp, data, Axis::columns(w, h), radius);
    }
    Ok(())
}
