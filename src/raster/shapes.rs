//! Geometry builders in `kurbo` space plus conversion into the `vello_cpu` kurbo version.

use kurbo::{Affine, BezPath, Circle, PathEl, Point, Rect, RoundedRect, Shape, Vec2};

const TOLERANCE: f64 = 0.1;

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Rounded rectangle outline, radius clamped to half the shorter side.
pub fn rounded_rect(rect: Rect, radius: f64) -> BezPath {
    let r = radius.max(0.0).min(rect.width().min(rect.height()) / 2.0);
    RoundedRect::from_rect(rect, r).to_path(TOLERANCE)
}

/// Filled disc.
pub fn circle(center: Point, radius: f64) -> BezPath {
    Circle::new(center, radius.max(0.0)).to_path(TOLERANCE)
}

fn polygon(path: &mut BezPath, pts: impl Iterator<Item = Point>) {
    let mut first = true;
    for p in pts {
        if first {
            path.move_to(p);
            first = false;
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
}

/// Annulus between `inner` and `outer` radii as two opposite-winding polygons, so a
/// non-zero fill leaves the middle empty.
pub fn ring(center: Point, outer: f64, inner: f64) -> BezPath {
    let outer = outer.max(0.0);
    let inner = inner.clamp(0.0, outer);
    let segments = ((outer * 0.5).ceil() as usize).clamp(32, 256);
    let at = |r: f64, i: usize| {
        let t = std::f64::consts::TAU * (i as f64) / (segments as f64);
        center + Vec2::new(t.cos() * r, t.sin() * r)
    };

    let mut path = BezPath::new();
    polygon(&mut path, (0..segments).map(|i| at(outer, i)));
    if inner > 0.0 {
        polygon(&mut path, (0..segments).rev().map(|i| at(inner, i)));
    }
    path
}

/// Rectangular frame of `width` pixels whose outer edge is `rect`.
pub fn frame(rect: Rect, width: f64) -> BezPath {
    let w = width.max(0.0).min(rect.width().min(rect.height()) / 2.0);
    let inner = rect.inset(-w);

    let mut path = BezPath::new();
    polygon(
        &mut path,
        [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ]
        .into_iter(),
    );
    if w > 0.0 && inner.width() > 0.0 && inner.height() > 0.0 {
        polygon(
            &mut path,
            [
                Point::new(inner.x0, inner.y0),
                Point::new(inner.x0, inner.y1),
                Point::new(inner.x1, inner.y1),
                Point::new(inner.x1, inner.y0),
            ]
            .into_iter(),
        );
    }
    path
}

/// Butt-capped line segment of the given width as a quad.
pub fn line(p0: Point, p1: Point, width: f64) -> BezPath {
    let d = p1 - p0;
    let len = d.hypot();
    let mut path = BezPath::new();
    if len <= f64::EPSILON || width <= 0.0 {
        return path;
    }
    let n = Vec2::new(-d.y, d.x) * (width / 2.0 / len);
    polygon(&mut path, [p0 + n, p1 + n, p1 - n, p0 - n].into_iter());
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_has_hole() {
        let f = frame(Rect::new(0.0, 0.0, 100.0, 50.0), 4.0);
        assert!(f.contains(Point::new(2.0, 25.0)));
        assert!(!f.contains(Point::new(50.0, 25.0)));
    }

    #[test]
    fn ring_has_hole() {
        let r = ring(Point::new(50.0, 50.0), 40.0, 30.0);
        assert!(r.contains(Point::new(85.0, 50.0)));
        assert!(!r.contains(Point::new(50.0, 50.0)));
    }

    #[test]
    fn line_is_width_wide() {
        let l = line(Point::new(0.0, 10.0), Point::new(100.0, 10.0), 4.0);
        let bb = l.bounding_box();
        assert!((bb.height() - 4.0).abs() < 1e-9);
        assert!((bb.width() - 100.0).abs() < 1e-9);
        assert!(line(Point::ORIGIN, Point::ORIGIN, 3.0).elements().is_empty());
    }

    #[test]
    fn conversion_keeps_elements() {
        let p = rounded_rect(Rect::new(0.0, 0.0, 40.0, 20.0), 100.0);
        assert_eq!(bezpath_to_cpu(&p).elements().len(), p.elements().len());
    }
}
