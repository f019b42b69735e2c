use std::path::Path;

use crate::document::loader::AnimationDocument;
use crate::engine::animation::LottieAnimation;
use crate::engine::scene::{
    DrawItem, FillRule, FrameScene, ImageSource, LineCap, LineJoin, Paint, TextRun,
};
use crate::foundation::core::{Affine, Canvas, FrameIndex};
use crate::foundation::error::{LottieError, LottieResult};
use crate::render::backend::{
    BackendKind, BackendOpts, MarkupFrame, RenderBackend, RenderedFrame, already_initialized,
};
use crate::render::dom::{Element, MarkupEnvironment, WindowInfo};
use crate::render::fonts::FontRegistry;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Renders frames by rebuilding an SVG tree inside an instance-owned [`MarkupEnvironment`] and
/// serializing it.
pub struct MarkupBackend {
    opts: BackendOpts,
    env: Option<MarkupEnvironment>,
    animation: Option<LottieAnimation>,
    initialized: bool,
}

impl MarkupBackend {
    /// Uninitialized backend.
    pub fn new(opts: BackendOpts) -> Self {
        Self {
            opts,
            env: None,
            animation: None,
            initialized: false,
        }
    }

    /// The instance environment, once ready.
    pub fn environment(&self) -> Option<&MarkupEnvironment> {
        self.env.as_ref()
    }
}

impl RenderBackend for MarkupBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Markup
    }

    #[tracing::instrument(skip(self, document), fields(width = canvas.width, height = canvas.height))]
    fn initialize(&mut self, document: &AnimationDocument, canvas: Canvas) -> LottieResult<()> {
        if self.initialized {
            return Err(already_initialized(self.kind()));
        }
        self.initialized = true;
        let fonts = FontRegistry::new(self.opts.system_fonts);
        self.env = Some(MarkupEnvironment::new(canvas, fonts));
        self.animation = Some(LottieAnimation::new(document));
        tracing::debug!("markup backend ready");
        Ok(())
    }

    fn render_frame(&mut self, frame: FrameIndex) -> LottieResult<RenderedFrame> {
        let (Some(animation), Some(env)) = (self.animation.as_mut(), self.env.as_mut()) else {
            return Err(LottieError::not_ready(
                "render_frame called before the markup backend is ready",
            ));
        };
        let scene = animation.scene_at(frame);

        let window = env.window();
        let container = env.document_mut();
        container.clear_children();
        container.append(scene_svg(&scene, window));

        Ok(RenderedFrame::Markup(MarkupFrame {
            markup: env.document().inner_html()?,
            width: window.inner_width,
            height: window.inner_height,
            fonts: env.fonts().database(),
        }))
    }

    fn set_font(&mut self, path: &Path) -> LottieResult<String> {
        let (Some(env), Some(animation)) = (self.env.as_mut(), self.animation.as_mut()) else {
            return Err(LottieError::not_ready(
                "set_font called before the markup backend is ready",
            ));
        };
        let family = env.fonts_mut().load_file(path)?;
        animation.set_font_family(Some(family.clone()));
        Ok(family)
    }

    fn dispose(&mut self) {
        if self.env.take().is_some() {
            tracing::debug!("markup backend disposed");
        }
        self.animation = None;
        self.initialized = true;
    }

    fn animation(&self) -> Option<&LottieAnimation> {
        self.animation.as_ref()
    }

    fn animation_mut(&mut self) -> Option<&mut LottieAnimation> {
        self.animation.as_mut()
    }
}

/// Root `<svg>` for a scene: document units in the `viewBox`, stretched over the viewport.
pub(crate) fn scene_svg(scene: &FrameScene, window: WindowInfo) -> Element {
    let mut svg = svg_root(window.inner_width, window.inner_height, scene.width, scene.height);
    for item in &scene.items {
        svg.append(item_element(item));
    }
    svg
}

pub(crate) fn svg_root(width: u32, height: u32, view_w: f64, view_h: f64) -> Element {
    Element::new("svg")
        .attr("xmlns", SVG_NS)
        .attr("xmlns:xlink", XLINK_NS)
        .attr("width", width)
        .attr("height", height)
        .attr("viewBox", format!("0 0 {} {}", num(view_w), num(view_h)))
        .attr("preserveAspectRatio", "none")
}

fn item_element(item: &DrawItem) -> Element {
    match item {
        DrawItem::Path {
            path,
            transform,
            paint,
            opacity,
        } => {
            let mut el = Element::new("path")
                .attr("d", path.to_svg())
                .attr("transform", matrix(*transform));
            match paint {
                Paint::Fill { color, rule } => {
                    el.set_attr("fill", color.css_rgb());
                    if color.a < 255 {
                        el.set_attr("fill-opacity", num(f64::from(color.a) / 255.0));
                    }
                    if *rule == FillRule::EvenOdd {
                        el.set_attr("fill-rule", "evenodd");
                    }
                }
                Paint::Stroke(s) => {
                    el.set_attr("fill", "none");
                    el.set_attr("stroke", s.color.css_rgb());
                    if s.color.a < 255 {
                        el.set_attr("stroke-opacity", num(f64::from(s.color.a) / 255.0));
                    }
                    el.set_attr("stroke-width", num(s.width));
                    el.set_attr(
                        "stroke-linecap",
                        match s.cap {
                            LineCap::Butt => "butt",
                            LineCap::Round => "round",
                            LineCap::Square => "square",
                        },
                    );
                    el.set_attr(
                        "stroke-linejoin",
                        match s.join {
                            LineJoin::Miter => "miter",
                            LineJoin::Round => "round",
                            LineJoin::Bevel => "bevel",
                        },
                    );
                    el.set_attr("stroke-miterlimit", num(s.miter_limit));
                }
            }
            with_opacity(el, *opacity)
        }
        DrawItem::Image {
            source,
            size,
            transform,
            opacity,
        } => {
            let href = match source {
                ImageSource::File(path) => path.to_string_lossy().into_owned(),
                ImageSource::DataUri(uri) => uri.clone(),
            };
            let mut el = Element::new("image")
                .attr("xlink:href", href)
                .attr("preserveAspectRatio", "none")
                .attr("transform", matrix(*transform));
            if let Some((w, h)) = size {
                el.set_attr("width", num(*w));
                el.set_attr("height", num(*h));
            }
            with_opacity(el, *opacity)
        }
        DrawItem::Text(run) => text_element(run, run.transform),
    }
}

/// `<text>` for a run, positioned by `transform`.
pub(crate) fn text_element(run: &TextRun, transform: Affine) -> Element {
    let mut el = Element::new("text")
        .attr("transform", matrix(transform))
        .attr("font-family", &run.font_family)
        .attr("font-size", num(run.font_size))
        .attr("fill", run.color.css_rgb())
        .attr("text-anchor", run.align.svg_anchor())
        .attr("xml:space", "preserve");
    if run.color.a < 255 {
        el.set_attr("fill-opacity", num(f64::from(run.color.a) / 255.0));
    }
    for (i, line) in run.lines.iter().enumerate() {
        el.append(
            Element::new("tspan")
                .attr("x", 0)
                .attr("y", num(i as f64 * run.line_height))
                .text(line.as_str()),
        );
    }
    with_opacity(el, run.opacity)
}

fn with_opacity(mut el: Element, opacity: f64) -> Element {
    if opacity < 1.0 {
        el.set_attr("opacity", num(opacity));
    }
    el
}

fn matrix(a: Affine) -> String {
    let [a, b, c, d, e, f] = a.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        num(a),
        num(b),
        num(c),
        num(d),
        num(e),
        num(f)
    )
}

/// Compact decimal form (4 fractional digits, no trailing zeros).
fn num(v: f64) -> String {
    let r = (v * 10_000.0).round() / 10_000.0;
    if r == 0.0 { "0".to_string() } else { r.to_string() }
}

#[cfg(test)]
#[path = "../../tests/unit/render/markup.rs"]
mod tests;
