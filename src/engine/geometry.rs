use kurbo::Shape as _;

use crate::document::model::{EllipseShape, PathShape, RectShape};
use crate::document::property::ShapePath;
use crate::foundation::core::{BezPath, Point, Rect};

const TOLERANCE: f64 = 0.1;

pub(crate) fn rect_path(rc: &RectShape, t: f64) -> BezPath {
    let p = rc.p.sample(t);
    let s = rc.s.sample(t);
    let (cx, cy) = (coord(&p, 0), coord(&p, 1));
    let (w, h) = (coord(&s, 0).abs(), coord(&s, 1).abs());
    let rect = Rect::from_center_size(Point::new(cx, cy), (w, h));
    let radius = rc.r.as_ref().map(|r| r.sample(t)).unwrap_or(0.0);
    if radius > 0.0 {
        let radius = radius.min(w.min(h) / 2.0);
        rect.to_rounded_rect(radius).to_path(TOLERANCE)
    } else {
        rect.to_path(TOLERANCE)
    }
}

pub(crate) fn ellipse_path(el: &EllipseShape, t: f64) -> BezPath {
    let p = el.p.sample(t);
    let s = el.s.sample(t);
    let ellipse = kurbo::Ellipse::new(
        Point::new(coord(&p, 0), coord(&p, 1)),
        (coord(&s, 0).abs() / 2.0, coord(&s, 1).abs() / 2.0),
        0.0,
    );
    ellipse.to_path(TOLERANCE)
}

pub(crate) fn shape_path(sh: &PathShape, t: f64) -> BezPath {
    bezier_from_shape(&sh.ks.sample(t))
}

/// Convert vertex/tangent outlines into a cubic path.
pub(crate) fn bezier_from_shape(shape: &ShapePath) -> BezPath {
    let mut path = BezPath::new();
    let n = shape.vertices.len();
    if n == 0 {
        return path;
    }
    let v = &shape.vertices;
    path.move_to(Point::new(v[0][0], v[0][1]));

    let segments = if shape.closed { n } else { n - 1 };
    for i in 0..segments {
        let j = (i + 1) % n;
        let out_t = shape.out_tangents[i];
        let in_t = shape.in_tangents[j];
        path.curve_to(
            Point::new(v[i][0] + out_t[0], v[i][1] + out_t[1]),
            Point::new(v[j][0] + in_t[0], v[j][1] + in_t[1]),
            Point::new(v[j][0], v[j][1]),
        );
    }
    if shape.closed {
        path.close_path();
    }
    path
}

fn coord(v: &[f64], i: usize) -> f64 {
    v.get(i).copied().unwrap_or(0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/geometry.rs"]
mod tests;
