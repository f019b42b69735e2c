use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::document::loader::AnimationDocument;
use crate::engine::animation::LottieAnimation;
use crate::engine::scene::{DrawItem, FillRule, ImageSource, LineCap, LineJoin, Paint, TextRun};
use crate::foundation::core::{Affine, BezPath, Canvas, FrameIndex, Rgba8};
use crate::foundation::error::{LottieError, LottieResult};
use crate::render::backend::{
    BackendKind, BackendOpts, FrameRGBA, RenderBackend, RenderedFrame, already_initialized,
};
use crate::render::decode::load_image;
use crate::render::fonts::FontRegistry;
use crate::render::markup::{svg_root, text_element};
use crate::render::svg_raster::{parse_svg, rasterize_svg_to_premul_rgba8};

const TEXT_CACHE_CAPACITY: usize = 64;

/// Renders frames into an instance-owned `vello_cpu` pixmap.
pub struct RasterBackend {
    opts: BackendOpts,
    animation: Option<LottieAnimation>,
    surface: Option<RasterSurface>,
    paints: PaintCache,
    initialized: bool,
}

struct RasterSurface {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

/// Decoded images and pre-rasterized text, keyed by what produced them.
struct PaintCache {
    fonts: Option<FontRegistry>,
    images: HashMap<ImageSource, Option<vello_cpu::Image>>,
    texts: HashMap<String, vello_cpu::Image>,
}

impl RasterBackend {
    /// Uninitialized backend.
    pub fn new(opts: BackendOpts) -> Self {
        Self {
            opts,
            animation: None,
            surface: None,
            paints: PaintCache {
                fonts: None,
                images: HashMap::new(),
                texts: HashMap::new(),
            },
            initialized: false,
        }
    }
}

impl RenderBackend for RasterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    #[tracing::instrument(skip(self, document), fields(width = canvas.width, height = canvas.height))]
    fn initialize(&mut self, document: &AnimationDocument, canvas: Canvas) -> LottieResult<()> {
        if self.initialized {
            return Err(already_initialized(self.kind()));
        }
        self.initialized = true;
        let (w, h) = (canvas.width_u16(), canvas.height_u16());
        self.surface = Some(RasterSurface {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        });
        self.paints.fonts = Some(FontRegistry::new(self.opts.system_fonts));
        self.animation = Some(LottieAnimation::new(document));
        tracing::debug!("raster backend ready");
        Ok(())
    }

    fn render_frame(&mut self, frame: FrameIndex) -> LottieResult<RenderedFrame> {
        let (Some(animation), Some(surface)) = (self.animation.as_mut(), self.surface.as_mut())
        else {
            return Err(LottieError::not_ready(
                "render_frame called before the raster backend is ready",
            ));
        };
        let scene = animation.scene_at(frame);
        let canvas = surface.canvas;
        let base = Affine::scale_non_uniform(
            f64::from(canvas.width) / scene.width,
            f64::from(canvas.height) / scene.height,
        );

        let ctx = &mut surface.ctx;
        ctx.reset();
        if let Some([r, g, b, a]) = self.opts.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(canvas.width),
                f64::from(canvas.height),
            ));
        }
        for item in &scene.items {
            self.paints.draw_item(ctx, item, base, canvas)?;
        }
        ctx.flush();

        surface.pixmap.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut surface.pixmap);
        Ok(RenderedFrame::Raster(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: surface.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }))
    }

    fn set_font(&mut self, path: &Path) -> LottieResult<String> {
        let (Some(fonts), Some(animation)) = (self.paints.fonts.as_mut(), self.animation.as_mut())
        else {
            return Err(LottieError::not_ready(
                "set_font called before the raster backend is ready",
            ));
        };
        let family = fonts.load_file(path)?;
        animation.set_font_family(Some(family.clone()));
        self.paints.texts.clear();
        Ok(family)
    }

    fn dispose(&mut self) {
        if self.surface.take().is_some() {
            tracing::debug!("raster backend disposed");
        }
        self.animation = None;
        self.paints.fonts = None;
        self.paints.images.clear();
        self.paints.texts.clear();
        self.initialized = true;
    }

    fn animation(&self) -> Option<&LottieAnimation> {
        self.animation.as_ref()
    }

    fn animation_mut(&mut self) -> Option<&mut LottieAnimation> {
        self.animation.as_mut()
    }
}

impl PaintCache {
    fn draw_item(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        item: &DrawItem,
        base: Affine,
        canvas: Canvas,
    ) -> LottieResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match item {
            DrawItem::Path {
                path,
                transform,
                paint,
                opacity,
            } => {
                ctx.set_transform(affine_to_cpu(base * *transform));
                let (color, fill_path, rule) = match paint {
                    Paint::Fill { color, rule } => (*color, bezpath_to_cpu(path), *rule),
                    Paint::Stroke(s) => {
                        let style = kurbo::Stroke::new(s.width)
                            .with_caps(match s.cap {
                                LineCap::Butt => kurbo::Cap::Butt,
                                LineCap::Round => kurbo::Cap::Round,
                                LineCap::Square => kurbo::Cap::Square,
                            })
                            .with_join(match s.join {
                                LineJoin::Miter => kurbo::Join::Miter,
                                LineJoin::Round => kurbo::Join::Round,
                                LineJoin::Bevel => kurbo::Join::Bevel,
                            })
                            .with_miter_limit(s.miter_limit);
                        let outline =
                            kurbo::stroke(path.iter(), &style, &kurbo::StrokeOpts::default(), 0.1);
                        (s.color, bezpath_to_cpu(&outline), FillRule::NonZero)
                    }
                };
                ctx.set_fill_rule(match rule {
                    FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
                    FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
                });
                ctx.set_paint(color_to_cpu(color));
                with_opacity(ctx, *opacity, |ctx| ctx.fill_path(&fill_path));
                Ok(())
            }
            DrawItem::Image {
                source,
                size,
                transform,
                opacity,
            } => {
                let Some(image) = self.image_paint_for(source) else {
                    return Ok(());
                };
                let (iw, ih) = image_paint_size(&image);
                let fit = match size {
                    Some((w, h)) if iw > 0.0 && ih > 0.0 => {
                        Affine::scale_non_uniform(w / iw, h / ih)
                    }
                    _ => Affine::IDENTITY,
                };
                ctx.set_transform(affine_to_cpu(base * *transform * fit));
                ctx.set_paint(image);
                with_opacity(ctx, *opacity, |ctx| {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
                });
                Ok(())
            }
            DrawItem::Text(run) => {
                let image = self.text_paint_for(run, base, canvas)?;
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(image);
                with_opacity(ctx, run.opacity, |ctx| {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(canvas.width),
                        f64::from(canvas.height),
                    ));
                });
                Ok(())
            }
        }
    }

    /// Decoded image paint; undecodable sources are logged once and then skipped.
    fn image_paint_for(&mut self, source: &ImageSource) -> Option<vello_cpu::Image> {
        if let Some(cached) = self.images.get(source) {
            return cached.clone();
        }
        let paint = match load_image(source).and_then(|img| {
            pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)
        }) {
            Ok(pixmap) => Some(vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            }),
            Err(err) => {
                tracing::warn!(?source, %err, "skipping undecodable image asset");
                None
            }
        };
        self.images.insert(source.clone(), paint.clone());
        paint
    }

    /// Text is shaped by rasterizing a one-element SVG over the whole canvas.
    fn text_paint_for(
        &mut self,
        run: &TextRun,
        base: Affine,
        canvas: Canvas,
    ) -> LottieResult<vello_cpu::Image> {
        let opaque = TextRun {
            opacity: 1.0,
            ..run.clone()
        };
        let svg = svg_root(
            canvas.width,
            canvas.height,
            f64::from(canvas.width),
            f64::from(canvas.height),
        )
        .child(text_element(&opaque, base * run.transform))
        .outer_html()?;
        if let Some(paint) = self.texts.get(&svg) {
            return Ok(paint.clone());
        }

        let fonts = self
            .fonts
            .as_ref()
            .ok_or_else(|| LottieError::not_ready("raster backend fonts are not loaded"))?;
        let tree = parse_svg(svg.as_bytes(), fonts.database())?;
        let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, canvas.width, canvas.height)?;
        let pixmap = pixmap_from_premul_bytes(&rgba8_premul, canvas.width, canvas.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        if self.texts.len() >= TEXT_CACHE_CAPACITY {
            self.texts.clear();
        }
        self.texts.insert(svg, paint.clone());
        Ok(paint)
    }
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f64,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    let opacity = opacity.clamp(0.0, 1.0) as f32;
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    draw(ctx);
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_paint_size(image: &vello_cpu::Image) -> (f64, f64) {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => (f64::from(p.width()), f64::from(p.height())),
        vello_cpu::ImageSource::OpaqueId(_) => (0.0, 0.0),
    }
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> LottieResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| LottieError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| LottieError::validation("pixmap height exceeds u16"))?;
    if bytes.len() != width as usize * height as usize * 4 {
        return Err(LottieError::validation("pixmap byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in bytes.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
