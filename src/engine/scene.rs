use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::document::model::{Asset, FillShape, Layer, LayerKind, LottieModel, Shape, StrokeShape};
use crate::engine::geometry;
use crate::foundation::core::{Affine, BezPath, FrameIndex, Rect, Rgba8};

const MAX_PRECOMP_DEPTH: usize = 16;
const MAX_PARENT_DEPTH: usize = 64;
const FALLBACK_FONT_FAMILY: &str = "sans-serif";

/// Backend-agnostic description of one evaluated frame.
///
/// `items` are in paint order (first item is painted first, i.e. bottom-most). Coordinates are in
/// document units; backends scale `width`/`height` onto their canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameScene {
    /// Document width.
    pub width: f64,
    /// Document height.
    pub height: f64,
    /// Playback frame this scene was evaluated at.
    pub frame: FrameIndex,
    /// Draw items, bottom-most first.
    pub items: Vec<DrawItem>,
}

/// One paint operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawItem {
    /// A filled or stroked vector path.
    Path {
        /// Geometry in item space.
        path: BezPath,
        /// Item-to-document transform.
        transform: Affine,
        /// How to paint the geometry.
        paint: Paint,
        /// Accumulated layer/group opacity.
        opacity: f64,
    },
    /// A bitmap placed at the item origin.
    Image {
        /// Where the bitmap comes from.
        source: ImageSource,
        /// Declared asset size; `None` uses the decoded size.
        size: Option<(f64, f64)>,
        /// Item-to-document transform.
        transform: Affine,
        /// Accumulated layer opacity.
        opacity: f64,
    },
    /// A text layer.
    Text(TextRun),
}

/// Solid paint for a path.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Fill with a color.
    Fill {
        /// Fill color, paint opacity folded into alpha.
        color: Rgba8,
        /// Winding rule.
        rule: FillRule,
    },
    /// Stroke with a color.
    Stroke(StrokeStyle),
}

/// Winding rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    /// Non-zero winding.
    NonZero,
    /// Even-odd.
    EvenOdd,
}

/// Stroke parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color, paint opacity folded into alpha.
    pub color: Rgba8,
    /// Line width.
    pub width: f64,
    /// Line cap.
    pub cap: LineCap,
    /// Line join.
    pub join: LineJoin,
    /// Miter limit.
    pub miter_limit: f64,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// Bitmap reference resolved from an image asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// File on disk.
    File(PathBuf),
    /// Embedded `data:` URI.
    DataUri(String),
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Left aligned.
    Start,
    /// Centered.
    Middle,
    /// Right aligned.
    End,
}

impl TextAlign {
    /// SVG `text-anchor` value.
    pub fn svg_anchor(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Evaluated text layer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Lines of text; the first baseline sits at the item origin.
    pub lines: Vec<String>,
    /// Font family name.
    pub font_family: String,
    /// Font size in document units.
    pub font_size: f64,
    /// Baseline-to-baseline distance.
    pub line_height: f64,
    /// Fill color.
    pub color: Rgba8,
    /// Anchor.
    pub align: TextAlign,
    /// Item-to-document transform.
    pub transform: Affine,
    /// Accumulated layer opacity.
    pub opacity: f64,
}

/// Inputs shared by the whole evaluation of one frame.
pub(crate) struct SceneContext<'a> {
    pub(crate) model: &'a LottieModel,
    pub(crate) base_dir: Option<&'a Path>,
    pub(crate) font_override: Option<&'a str>,
}

impl SceneContext<'_> {
    /// Evaluate the root composition at document frame `doc_frame`.
    pub(crate) fn evaluate(&self, frame: FrameIndex, doc_frame: f64) -> FrameScene {
        let assets: HashMap<&str, &Asset> =
            self.model.assets.iter().map(|a| (a.id.as_str(), a)).collect();
        let mut items = Vec::new();
        self.composition(
            &self.model.layers,
            &assets,
            doc_frame,
            Affine::IDENTITY,
            1.0,
            0,
            &mut items,
        );
        FrameScene {
            width: self.model.w,
            height: self.model.h,
            frame,
            items,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn composition(
        &self,
        layers: &[Layer],
        assets: &HashMap<&str, &Asset>,
        frame: f64,
        base: Affine,
        base_opacity: f64,
        depth: usize,
        out: &mut Vec<DrawItem>,
    ) {
        // Layer 0 is top-most, so paint from the end of the list.
        for layer in layers.iter().rev() {
            if !layer.is_visible_at(frame) {
                continue;
            }
            let t = layer.local_time(frame);
            let transform = base * world_transform(layer, layers, frame, 0);
            let opacity = base_opacity * layer.ks.opacity(t);
            if opacity <= 0.0 {
                continue;
            }

            match layer.kind() {
                LayerKind::Shape => {
                    emit_group(&layer.shapes, t, transform, opacity, &[], out);
                }
                LayerKind::Solid => {
                    let color = layer
                        .sc
                        .as_deref()
                        .and_then(|sc| Rgba8::from_hex(sc).ok())
                        .unwrap_or(Rgba8::new(0, 0, 0, 255));
                    let rect = Rect::new(0.0, 0.0, layer.sw.unwrap_or(0.0), layer.sh.unwrap_or(0.0));
                    if rect.area() > 0.0 {
                        out.push(DrawItem::Path {
                            path: kurbo::Shape::to_path(&rect, 0.1),
                            transform,
                            paint: Paint::Fill {
                                color,
                                rule: FillRule::NonZero,
                            },
                            opacity,
                        });
                    }
                }
                LayerKind::Image => {
                    let Some(asset) = layer.ref_id.as_deref().and_then(|id| assets.get(id)) else {
                        continue;
                    };
                    if let Some(source) = image_source(asset, self.base_dir) {
                        out.push(DrawItem::Image {
                            source,
                            size: asset.w.zip(asset.h),
                            transform,
                            opacity,
                        });
                    }
                }
                LayerKind::Precomp => {
                    if depth >= MAX_PRECOMP_DEPTH {
                        tracing::warn!(layer = ?layer.nm, "precomposition nesting too deep");
                        continue;
                    }
                    let nested = layer
                        .ref_id
                        .as_deref()
                        .and_then(|id| assets.get(id))
                        .and_then(|a| a.layers.as_deref());
                    if let Some(nested) = nested {
                        self.composition(nested, assets, t, transform, opacity, depth + 1, out);
                    }
                }
                LayerKind::Text => {
                    if let Some(run) = self.text_run(layer, t, transform, opacity) {
                        out.push(DrawItem::Text(run));
                    }
                }
                LayerKind::Null | LayerKind::Other(_) => {}
            }
        }
    }

    fn text_run(&self, layer: &Layer, t: f64, transform: Affine, opacity: f64) -> Option<TextRun> {
        let doc = layer.t.as_ref()?.d.at(t)?;
        if doc.t.is_empty() {
            return None;
        }
        let lines = doc
            .t
            .split(['\r', '\n', '\u{3}'])
            .map(str::to_owned)
            .collect();
        let font_family = match self.font_override {
            Some(family) => family.to_owned(),
            None => self.resolve_family(&doc.f),
        };
        Some(TextRun {
            lines,
            font_family,
            font_size: doc.s,
            line_height: doc.lh.unwrap_or(doc.s * 1.2),
            color: Rgba8::from_unit_components(&doc.fc),
            align: match doc.j {
                1 => TextAlign::End,
                2 => TextAlign::Middle,
                _ => TextAlign::Start,
            },
            transform,
            opacity,
        })
    }

    fn resolve_family(&self, font_name: &str) -> String {
        let declared = self
            .model
            .fonts
            .as_ref()
            .and_then(|f| f.list.iter().find(|d| d.name == font_name))
            .and_then(|d| d.family.clone());
        match declared {
            Some(family) => family,
            None if !font_name.is_empty() => font_name.to_owned(),
            None => FALLBACK_FONT_FAMILY.to_owned(),
        }
    }
}

/// Layer transform including its parent chain. Parents are evaluated at their own local time.
fn world_transform(layer: &Layer, siblings: &[Layer], frame: f64, depth: usize) -> Affine {
    let local = layer.ks.affine(layer.local_time(frame));
    let parent = layer
        .parent
        .and_then(|pid| siblings.iter().find(|l| l.ind == Some(pid)));
    match parent {
        Some(p) if depth < MAX_PARENT_DEPTH && !std::ptr::eq(p, layer) => {
            world_transform(p, siblings, frame, depth + 1) * local
        }
        _ => local,
    }
}

pub(crate) fn image_source(asset: &Asset, base_dir: Option<&Path>) -> Option<ImageSource> {
    let p = asset.p.as_deref().filter(|p| !p.is_empty())?;
    if asset.e == Some(1) || p.starts_with("data:") {
        return Some(ImageSource::DataUri(p.to_owned()));
    }
    let joined = Path::new(asset.u.as_deref().unwrap_or("")).join(p);
    if joined.is_absolute() {
        return Some(ImageSource::File(joined));
    }
    Some(ImageSource::File(match base_dir {
        Some(dir) => dir.join(joined),
        None => joined,
    }))
}

fn resolve_fill(fl: &FillShape, t: f64) -> Paint {
    let o = fl.o.as_ref().map(|o| o.sample(t) / 100.0).unwrap_or(1.0);
    Paint::Fill {
        color: Rgba8::from_unit_components(&fl.c.sample(t)).with_opacity(o),
        rule: if fl.r == Some(2) {
            FillRule::EvenOdd
        } else {
            FillRule::NonZero
        },
    }
}

fn resolve_stroke(st: &StrokeShape, t: f64) -> Paint {
    let o = st.o.as_ref().map(|o| o.sample(t) / 100.0).unwrap_or(1.0);
    Paint::Stroke(StrokeStyle {
        color: Rgba8::from_unit_components(&st.c.sample(t)).with_opacity(o),
        width: st.w.sample(t).max(0.0),
        cap: match st.lc {
            Some(2) => LineCap::Round,
            Some(3) => LineCap::Square,
            _ => LineCap::Butt,
        },
        join: match st.lj {
            Some(2) => LineJoin::Round,
            Some(3) => LineJoin::Bevel,
            _ => LineJoin::Miter,
        },
        miter_limit: st.ml.unwrap_or(4.0),
    })
}

/// Emit a shape list (layer root or `gr` contents).
///
/// A style applies to the geometry listed before it in the same group. Styles listed after a
/// nested group apply to that group's geometry too and arrive here as `inherited`, which paints
/// beneath this group's own styles.
fn emit_group(
    items: &[Shape],
    t: f64,
    parent: Affine,
    parent_opacity: f64,
    inherited: &[Paint],
    out: &mut Vec<DrawItem>,
) {
    let group_tr = items.iter().find_map(|s| match s {
        Shape::Transform(tr) => Some(tr),
        _ => None,
    });
    let (transform, opacity) = match group_tr {
        Some(tr) => (parent * tr.affine(t), parent_opacity * tr.opacity(t)),
        None => (parent, parent_opacity),
    };
    if opacity <= 0.0 {
        return;
    }

    let geometry: Vec<Option<BezPath>> = items.iter().map(|s| direct_geometry(s, t)).collect();
    let merged_before = |end: usize| -> BezPath {
        let mut path = BezPath::new();
        for g in geometry[..end].iter().flatten() {
            path.extend(g.iter());
        }
        path
    };

    if !inherited.is_empty() {
        let all = merged_before(items.len());
        for paint in inherited {
            push_path(out, &all, transform, paint, opacity);
        }
    }

    for (i, item) in items.iter().enumerate().rev() {
        match item {
            Shape::Fill(fl) if !fl.hd => {
                push_path(out, &merged_before(i), transform, &resolve_fill(fl, t), opacity);
            }
            Shape::Stroke(st) if !st.hd => {
                push_path(out, &merged_before(i), transform, &resolve_stroke(st, t), opacity);
            }
            Shape::Group(g) if !g.hd => {
                let mut styles: Vec<Paint> = inherited.to_vec();
                styles.extend(trailing_styles(&items[i + 1..], t));
                emit_group(&g.it, t, transform, opacity, &styles, out);
            }
            _ => {}
        }
    }
}

/// Styles following a nested group, bottom-most (last listed) first.
fn trailing_styles(items: &[Shape], t: f64) -> Vec<Paint> {
    items
        .iter()
        .rev()
        .filter_map(|s| match s {
            Shape::Fill(fl) if !fl.hd => Some(resolve_fill(fl, t)),
            Shape::Stroke(st) if !st.hd => Some(resolve_stroke(st, t)),
            _ => None,
        })
        .collect()
}

fn direct_geometry(shape: &Shape, t: f64) -> Option<BezPath> {
    match shape {
        Shape::Rect(rc) if !rc.hd => Some(geometry::rect_path(rc, t)),
        Shape::Ellipse(el) if !el.hd => Some(geometry::ellipse_path(el, t)),
        Shape::Path(sh) if !sh.hd => Some(geometry::shape_path(sh, t)),
        _ => None,
    }
}

fn push_path(out: &mut Vec<DrawItem>, path: &BezPath, transform: Affine, paint: &Paint, opacity: f64) {
    if path.elements().is_empty() {
        return;
    }
    if let Paint::Stroke(s) = paint
        && s.width <= 0.0
    {
        return;
    }
    out.push(DrawItem::Path {
        path: path.clone(),
        transform,
        paint: paint.clone(),
        opacity,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scene.rs"]
mod tests;
