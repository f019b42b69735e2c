/// Cubic Bezier basis with fixed endpoints `0` and `1`.
#[inline]
fn cubic_unit(p1: f64, p2: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

/// Evaluate a CSS-style cubic-bezier easing curve `(x1, y1, x2, y2)` at progress `t`.
///
/// The x curve is inverted by bisection; control x values are clamped to `[0, 1]` so the curve
/// stays monotonic.
pub(crate) fn bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);
    if x1 == y1 && x2 == y2 {
        return t;
    }

    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..32 {
        let x = cubic_unit(x1, x2, mid);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_unit(y1, y2, mid)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
