use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::document::property::{Property, ShapePath};
use crate::foundation::core::{Affine, Vec2};

/// Root of a parsed Lottie document (the subset the engine evaluates).
#[derive(Clone, Debug, Deserialize)]
pub struct LottieModel {
    /// Bodymovin version string, if present.
    #[serde(default, rename = "v")]
    pub version: Option<String>,
    /// Document name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Declared frame rate.
    pub fr: f64,
    /// In-point (first frame).
    #[serde(default)]
    pub ip: f64,
    /// Out-point (exclusive end frame).
    pub op: f64,
    /// Document width in document units.
    #[serde(default = "default_size")]
    pub w: f64,
    /// Document height in document units.
    #[serde(default = "default_size")]
    pub h: f64,
    /// Top-level layers; index 0 is the top-most layer.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Image and precomposition assets.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Font table referenced by text layers.
    #[serde(default)]
    pub fonts: Option<FontList>,
}

fn default_size() -> f64 {
    500.0
}

fn default_out_point() -> f64 {
    f64::INFINITY
}

fn default_stretch() -> f64 {
    1.0
}

/// Layer kinds understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum LayerKind {
    /// `ty: 0`, references a precomposition asset.
    Precomp,
    /// `ty: 1`, a solid color rectangle.
    Solid,
    /// `ty: 2`, references an image asset.
    Image,
    /// `ty: 3`, transform-only parent.
    Null,
    /// `ty: 4`, vector shapes.
    Shape,
    /// `ty: 5`, text.
    Text,
    /// Anything else (audio, camera, data layers).
    Other(u8),
}

impl From<u8> for LayerKind {
    fn from(ty: u8) -> Self {
        match ty {
            0 => Self::Precomp,
            1 => Self::Solid,
            2 => Self::Image,
            3 => Self::Null,
            4 => Self::Shape,
            5 => Self::Text,
            other => Self::Other(other),
        }
    }
}

/// One layer of a composition.
#[derive(Clone, Debug, Deserialize)]
pub struct Layer {
    /// Raw layer type.
    pub ty: u8,
    /// Layer name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Layer id used as an element id by web players.
    #[serde(default)]
    pub ln: Option<String>,
    /// Layer index, referenced by `parent`.
    #[serde(default)]
    pub ind: Option<i64>,
    /// Index of the parent layer.
    #[serde(default)]
    pub parent: Option<i64>,
    /// First visible frame.
    #[serde(default)]
    pub ip: f64,
    /// Exclusive last visible frame.
    #[serde(default = "default_out_point")]
    pub op: f64,
    /// Start time offset.
    #[serde(default)]
    pub st: f64,
    /// Time stretch.
    #[serde(default = "default_stretch")]
    pub sr: f64,
    /// Hidden flag.
    #[serde(default)]
    pub hd: bool,
    /// Layer transform.
    #[serde(default)]
    pub ks: Transform,
    /// Asset reference for precomp and image layers.
    #[serde(default, rename = "refId")]
    pub ref_id: Option<String>,
    /// Shape items for shape layers.
    #[serde(default)]
    pub shapes: Vec<Shape>,
    /// Solid color (`#rrggbb`).
    #[serde(default)]
    pub sc: Option<String>,
    /// Solid width.
    #[serde(default)]
    pub sw: Option<f64>,
    /// Solid height.
    #[serde(default)]
    pub sh: Option<f64>,
    /// Text data for text layers.
    #[serde(default)]
    pub t: Option<TextData>,
}

impl Layer {
    /// Decoded layer kind.
    pub fn kind(&self) -> LayerKind {
        LayerKind::from(self.ty)
    }

    /// Convert a composition frame to this layer's local time.
    pub fn local_time(&self, frame: f64) -> f64 {
        let sr = if self.sr.abs() < f64::EPSILON {
            1.0
        } else {
            self.sr
        };
        (frame - self.st) / sr
    }

    /// Return `true` when the layer is visible at composition frame `frame`.
    pub fn is_visible_at(&self, frame: f64) -> bool {
        !self.hd && frame >= self.ip && frame < self.op
    }
}

/// Transform shared by layers (`ks`) and shape groups (`tr`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub(crate) a: Option<Property<Vec<f64>>>,
    #[serde(default)]
    pub(crate) p: Option<Position>,
    #[serde(default)]
    pub(crate) s: Option<Property<Vec<f64>>>,
    #[serde(default, alias = "rz")]
    pub(crate) r: Option<Property<f64>>,
    #[serde(default)]
    pub(crate) o: Option<Property<f64>>,
}

impl Transform {
    /// Matrix `T(p) * R(r) * S(s) * T(-a)` at local time `t`.
    pub fn affine(&self, t: f64) -> Affine {
        let anchor = self.a.as_ref().map(|p| vec2(&p.sample(t), 0.0));
        let pos = self.p.as_ref().map(|p| p.sample(t));
        let scale = self
            .s
            .as_ref()
            .map(|p| vec2(&p.sample(t), 100.0) / 100.0)
            .unwrap_or(Vec2::new(1.0, 1.0));
        let rot = self.r.as_ref().map(|p| p.sample(t)).unwrap_or(0.0);

        Affine::translate(pos.unwrap_or(Vec2::ZERO))
            * Affine::rotate(rot.to_radians())
            * Affine::scale_non_uniform(scale.x, scale.y)
            * Affine::translate(-anchor.unwrap_or(Vec2::ZERO))
    }

    /// Opacity in `[0, 1]` at local time `t`.
    pub fn opacity(&self, t: f64) -> f64 {
        self.o
            .as_ref()
            .map(|p| p.sample(t) / 100.0)
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }
}

fn vec2(v: &[f64], default: f64) -> Vec2 {
    Vec2::new(
        v.first().copied().unwrap_or(default),
        v.get(1).copied().unwrap_or(default),
    )
}

/// Position is either a single 2D property or split into separate `x`/`y` properties.
#[derive(Clone, Debug)]
pub(crate) enum Position {
    Unified(Property<Vec<f64>>),
    Split { x: Property<f64>, y: Property<f64> },
}

impl Position {
    fn sample(&self, t: f64) -> Vec2 {
        match self {
            Self::Unified(p) => vec2(&p.sample(t), 0.0),
            Self::Split { x, y } => Vec2::new(x.sample(t), y.sample(t)),
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        let split = v.get("s").and_then(Value::as_bool).unwrap_or(false);
        if split {
            let axis = |key: &str| -> Result<Property<f64>, D::Error> {
                let raw = v
                    .get(key)
                    .ok_or_else(|| serde::de::Error::custom(format!("split position missing '{key}'")))?;
                Property::from_json(raw).map_err(serde::de::Error::custom)
            };
            return Ok(Self::Split {
                x: axis("x")?,
                y: axis("y")?,
            });
        }
        Property::from_json(&v)
            .map(Self::Unified)
            .map_err(serde::de::Error::custom)
    }
}

/// Shape items of a shape layer or group, tagged by `ty`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "ty")]
pub enum Shape {
    /// `gr`: nested group.
    #[serde(rename = "gr")]
    Group(GroupShape),
    /// `rc`: rectangle.
    #[serde(rename = "rc")]
    Rect(RectShape),
    /// `el`: ellipse.
    #[serde(rename = "el")]
    Ellipse(EllipseShape),
    /// `sh`: free-form bezier path.
    #[serde(rename = "sh")]
    Path(PathShape),
    /// `fl`: solid fill.
    #[serde(rename = "fl")]
    Fill(FillShape),
    /// `st`: solid stroke.
    #[serde(rename = "st")]
    Stroke(StrokeShape),
    /// `tr`: group transform.
    #[serde(rename = "tr")]
    Transform(Transform),
    /// Modifiers, gradients and anything else the engine does not evaluate.
    #[serde(other)]
    Unsupported,
}

/// `gr` item.
#[derive(Clone, Debug, Deserialize)]
pub struct GroupShape {
    /// Group name.
    #[serde(default)]
    pub nm: Option<String>,
    /// Hidden flag.
    #[serde(default)]
    pub hd: bool,
    /// Items; index 0 is top-most.
    #[serde(default)]
    pub it: Vec<Shape>,
}

/// `rc` item.
#[derive(Clone, Debug, Deserialize)]
pub struct RectShape {
    #[serde(default)]
    pub(crate) hd: bool,
    pub(crate) p: Property<Vec<f64>>,
    pub(crate) s: Property<Vec<f64>>,
    #[serde(default)]
    pub(crate) r: Option<Property<f64>>,
}

/// `el` item.
#[derive(Clone, Debug, Deserialize)]
pub struct EllipseShape {
    #[serde(default)]
    pub(crate) hd: bool,
    pub(crate) p: Property<Vec<f64>>,
    pub(crate) s: Property<Vec<f64>>,
}

/// `sh` item.
#[derive(Clone, Debug, Deserialize)]
pub struct PathShape {
    #[serde(default)]
    pub(crate) hd: bool,
    pub(crate) ks: Property<ShapePath>,
}

/// `fl` item.
#[derive(Clone, Debug, Deserialize)]
pub struct FillShape {
    #[serde(default)]
    pub(crate) hd: bool,
    pub(crate) c: Property<Vec<f64>>,
    #[serde(default)]
    pub(crate) o: Option<Property<f64>>,
    /// Fill rule: 1 nonzero, 2 even-odd.
    #[serde(default)]
    pub(crate) r: Option<u8>,
}

/// `st` item.
#[derive(Clone, Debug, Deserialize)]
pub struct StrokeShape {
    #[serde(default)]
    pub(crate) hd: bool,
    pub(crate) c: Property<Vec<f64>>,
    #[serde(default)]
    pub(crate) o: Option<Property<f64>>,
    pub(crate) w: Property<f64>,
    /// Line cap: 1 butt, 2 round, 3 square.
    #[serde(default)]
    pub(crate) lc: Option<u8>,
    /// Line join: 1 miter, 2 round, 3 bevel.
    #[serde(default)]
    pub(crate) lj: Option<u8>,
    #[serde(default)]
    pub(crate) ml: Option<f64>,
}

/// Image or precomposition asset.
#[derive(Clone, Debug, Deserialize)]
pub struct Asset {
    /// Asset id; numeric ids are normalized to their string form.
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Image width.
    #[serde(default)]
    pub w: Option<f64>,
    /// Image height.
    #[serde(default)]
    pub h: Option<f64>,
    /// Image directory.
    #[serde(default)]
    pub u: Option<String>,
    /// Image file name or data URI.
    #[serde(default)]
    pub p: Option<String>,
    /// `1` when `p` holds embedded data.
    #[serde(default)]
    pub e: Option<u8>,
    /// Layers of a precomposition asset.
    #[serde(default)]
    pub layers: Option<Vec<Layer>>,
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "asset id must be a string or number, got {other}"
        ))),
    }
}

/// Text layer payload (`t`).
#[derive(Clone, Debug, Deserialize)]
pub struct TextData {
    /// Keyframed text documents.
    pub d: TextDocumentProperty,
}

/// Hold-keyframed text documents (`t.d`).
#[derive(Clone, Debug, Deserialize)]
pub struct TextDocumentProperty {
    /// Text document keyframes.
    #[serde(default)]
    pub k: Vec<TextKeyframe>,
}

impl TextDocumentProperty {
    /// Document active at local time `t` (text documents always hold).
    pub fn at(&self, t: f64) -> Option<&TextDocument> {
        let n = self.k.partition_point(|k| k.t <= t);
        self.k.get(n.saturating_sub(1)).map(|k| &k.s)
    }
}

/// One text document keyframe.
#[derive(Clone, Debug, Deserialize)]
pub struct TextKeyframe {
    /// Keyframe time.
    #[serde(default)]
    pub t: f64,
    /// Document value.
    pub s: TextDocument,
}

fn default_font_size() -> f64 {
    14.0
}

/// Text document (`t.d.k[].s`).
#[derive(Clone, Debug, Deserialize)]
pub struct TextDocument {
    /// Text content; `\r` separates lines.
    #[serde(default)]
    pub t: String,
    /// Font size.
    #[serde(default = "default_font_size")]
    pub s: f64,
    /// Font name, resolved through the document font table.
    #[serde(default)]
    pub f: String,
    /// Fill color in unit components.
    #[serde(default)]
    pub fc: Vec<f64>,
    /// Justification: 0 left, 1 right, 2 center.
    #[serde(default)]
    pub j: u8,
    /// Line height.
    #[serde(default)]
    pub lh: Option<f64>,
}

/// Document font table.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FontList {
    /// Declared fonts.
    #[serde(default)]
    pub list: Vec<FontDef>,
}

/// One font declaration.
#[derive(Clone, Debug, Deserialize)]
pub struct FontDef {
    /// Name referenced by text documents.
    #[serde(rename = "fName")]
    pub name: String,
    /// Font family.
    #[serde(default, rename = "fFamily")]
    pub family: Option<String>,
    /// Font style (e.g. `Bold`).
    #[serde(default, rename = "fStyle")]
    pub style: Option<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
