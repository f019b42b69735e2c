use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::foundation::math::bezier_ease;

/// Value types that can be carried by an animated Lottie property.
pub(crate) trait PropertyValue: Sized + Clone {
    /// Decode one value from JSON (keyframe `s`/`e` or a static `k`).
    fn from_json(v: &Value) -> Option<Self>;
    /// Interpolate from `a` to `b` with normalized factor `t`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl PropertyValue for f64 {
    fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_f64(),
            Value::Array(items) => items.first().and_then(Value::as_f64),
            _ => None,
        }
    }

    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl PropertyValue for Vec<f64> {
    fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_f64().map(|x| vec![x]),
            Value::Array(items) => items.iter().map(Value::as_f64).collect(),
            _ => None,
        }
    }

    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x + (y - x) * t)
            .collect()
    }
}

/// Bezier outline as stored in Lottie path shapes: vertices plus tangents relative to them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePath {
    /// Whether the outline is closed.
    pub closed: bool,
    /// Anchor points.
    pub vertices: Vec<[f64; 2]>,
    /// Incoming tangents, relative to each vertex.
    pub in_tangents: Vec<[f64; 2]>,
    /// Outgoing tangents, relative to each vertex.
    pub out_tangents: Vec<[f64; 2]>,
}

impl PropertyValue for ShapePath {
    fn from_json(v: &Value) -> Option<Self> {
        // Keyframed shapes wrap the value in a one-element array.
        let obj = match v {
            Value::Array(items) => items.first()?,
            other => other,
        };
        let points = |key: &str| -> Option<Vec<[f64; 2]>> {
            match obj.get(key) {
                None => Some(Vec::new()),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|p| {
                        let x = p.get(0)?.as_f64()?;
                        let y = p.get(1)?.as_f64()?;
                        Some([x, y])
                    })
                    .collect(),
                Some(_) => None,
            }
        };
        let vertices = points("v")?;
        let mut in_tangents = points("i")?;
        let mut out_tangents = points("o")?;
        in_tangents.resize(vertices.len(), [0.0, 0.0]);
        out_tangents.resize(vertices.len(), [0.0, 0.0]);
        Some(Self {
            closed: obj.get("c").and_then(Value::as_bool).unwrap_or(false),
            vertices,
            in_tangents,
            out_tangents,
        })
    }

    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if a.vertices.len() != b.vertices.len() {
            return if t < 1.0 { a.clone() } else { b.clone() };
        }
        let mix = |xs: &[[f64; 2]], ys: &[[f64; 2]]| -> Vec<[f64; 2]> {
            xs.iter()
                .zip(ys)
                .map(|(p, q)| [p[0] + (q[0] - p[0]) * t, p[1] + (q[1] - p[1]) * t])
                .collect()
        };
        Self {
            closed: a.closed,
            vertices: mix(&a.vertices, &b.vertices),
            in_tangents: mix(&a.in_tangents, &b.in_tangents),
            out_tangents: mix(&a.out_tangents, &b.out_tangents),
        }
    }
}

/// One keyframe; the easing handles describe the segment towards the next keyframe.
#[derive(Clone, Debug)]
pub(crate) struct Keyframe<T> {
    pub(crate) time: f64,
    pub(crate) start: T,
    pub(crate) end: Option<T>,
    pub(crate) ease_out: [f64; 2],
    pub(crate) ease_in: [f64; 2],
    pub(crate) hold: bool,
}

/// Static or keyframed property (`{"a": 0|1, "k": ...}`).
#[derive(Clone, Debug)]
pub(crate) enum Property<T> {
    Static(T),
    Animated(Vec<Keyframe<T>>),
}

impl<T: PropertyValue> Property<T> {
    pub(crate) fn from_json(v: &Value) -> Result<Self, String> {
        let k = match v {
            Value::Object(map) => map
                .get("k")
                .ok_or_else(|| "animated property is missing 'k'".to_string())?,
            // Bare values are accepted for hand-written documents.
            other => other,
        };
        let flagged = v.get("a").and_then(Value::as_i64) == Some(1);
        let looks_keyframed = matches!(k, Value::Array(items)
            if items.first().is_some_and(|f| f.is_object() && f.get("t").is_some()));

        if flagged || looks_keyframed {
            let Value::Array(items) = k else {
                return Err("keyframed property 'k' must be an array".to_string());
            };
            return Self::parse_keyframes(items);
        }
        T::from_json(k)
            .map(Self::Static)
            .ok_or_else(|| format!("unsupported property value: {k}"))
    }

    fn parse_keyframes(items: &[Value]) -> Result<Self, String> {
        let mut keys: Vec<Keyframe<T>> = Vec::with_capacity(items.len());
        for item in items {
            let time = item
                .get("t")
                .and_then(Value::as_f64)
                .ok_or_else(|| "keyframe is missing 't'".to_string())?;
            let start = match item.get("s").and_then(T::from_json) {
                Some(s) => s,
                // Legacy end markers carry only `t`; reuse the previous segment's end value.
                None => match keys.last() {
                    Some(prev) => prev.end.clone().unwrap_or_else(|| prev.start.clone()),
                    None => return Err("first keyframe is missing 's'".to_string()),
                },
            };
            keys.push(Keyframe {
                time,
                start,
                end: item.get("e").and_then(T::from_json),
                ease_out: handle(item.get("o"), [0.0, 0.0]),
                ease_in: handle(item.get("i"), [1.0, 1.0]),
                hold: item.get("h").and_then(Value::as_i64) == Some(1),
            });
        }
        if keys.is_empty() {
            return Err("keyframed property has no keyframes".to_string());
        }
        if !keys.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err("keyframes must be sorted by time".to_string());
        }
        Ok(Self::Animated(keys))
    }

    /// Sample the property at `frame` (layer-local time).
    pub(crate) fn sample(&self, frame: f64) -> T {
        let keys = match self {
            Self::Static(v) => return v.clone(),
            Self::Animated(keys) => keys,
        };
        let first = &keys[0];
        if frame <= first.time || keys.len() == 1 {
            return first.start.clone();
        }
        let i = keys.partition_point(|k| k.time <= frame) - 1;
        let k0 = &keys[i];
        let Some(k1) = keys.get(i + 1) else {
            return k0.end.clone().unwrap_or_else(|| k0.start.clone());
        };
        if k0.hold {
            return k0.start.clone();
        }
        let end = k0.end.as_ref().unwrap_or(&k1.start);
        let span = k1.time - k0.time;
        if span <= 0.0 {
            return end.clone();
        }
        let p = (frame - k0.time) / span;
        let eased = bezier_ease(p, k0.ease_out[0], k0.ease_out[1], k0.ease_in[0], k0.ease_in[1]);
        T::lerp(&k0.start, end, eased)
    }
}

impl<'de, T: PropertyValue> Deserialize<'de> for Property<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        Self::from_json(&v).map_err(serde::de::Error::custom)
    }
}

/// Read an easing handle `{x, y}` where either component may be a number or per-axis array.
fn handle(v: Option<&Value>, default: [f64; 2]) -> [f64; 2] {
    let Some(v) = v else { return default };
    let comp = |key: &str, d: f64| -> f64 {
        match v.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(d),
            Some(Value::Array(items)) => items.first().and_then(Value::as_f64).unwrap_or(d),
            _ => d,
        }
    };
    [comp("x", default[0]), comp("y", default[1])]
}

#[cfg(test)]
#[path = "../../tests/unit/document/property.rs"]
mod tests;
