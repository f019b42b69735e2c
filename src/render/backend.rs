use std::path::Path;
use std::sync::Arc;

use crate::document::loader::{AnimationDocument, DocumentTiming};
use crate::engine::animation::{ElementInfo, LottieAnimation};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{LottieError, LottieResult};

/// Raster frame, RGBA8 row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

/// Serialized vector markup for one frame, plus what is needed to rasterize it.
#[derive(Clone, Debug)]
pub struct MarkupFrame {
    /// SVG document text.
    pub markup: String,
    /// Target raster width.
    pub width: u32,
    /// Target raster height.
    pub height: u32,
    /// Font database the markup's text must be resolved against.
    pub fonts: Arc<usvg::fontdb::Database>,
}

/// Output of [`RenderBackend::render_frame`]; consumed by the texture bridge.
#[derive(Clone, Debug)]
pub enum RenderedFrame {
    /// Vector markup that still needs rasterizing.
    Markup(MarkupFrame),
    /// Pixels read straight from a surface.
    Raster(FrameRGBA),
}

impl RenderedFrame {
    /// Target size in pixels.
    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Markup(m) => (m.width, m.height),
            Self::Raster(f) => (f.width, f.height),
        }
    }
}

/// Backend variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Emulated document environment, serializes SVG markup per frame.
    Markup,
    /// Offscreen pixel surface.
    #[default]
    Raster,
}

/// When a backend wants its component subscribed to the host frame clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockPolicy {
    /// As soon as the backend is ready.
    OnReady,
    /// Only once `start()` is called.
    OnStart,
}

/// Settings shared by backend constructors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendOpts {
    /// Seed the per-instance font database with system fonts.
    pub system_fonts: bool,
    /// Straight RGBA color each raster frame starts from; transparent when `None`.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for BackendOpts {
    fn default() -> Self {
        Self {
            system_fonts: true,
            clear_rgba: None,
        }
    }
}

/// Capability interface every render backend implements.
///
/// A backend is constructed cheaply, initialized exactly once (possibly on a worker thread, hence
/// `Send`), rendered many times and disposed. Mutation and query operations forward to the
/// managed [`LottieAnimation`] and fail with [`LottieError::NotReady`] before initialization.
pub trait RenderBackend: Send {
    /// Which variant this is.
    fn kind(&self) -> BackendKind;

    /// Parse-side setup: build the animation object and rendering resources for `canvas`.
    /// A second call fails.
    fn initialize(&mut self, document: &AnimationDocument, canvas: Canvas) -> LottieResult<()>;

    /// Seek to `frame` and render it. Rendering the same frame twice yields equivalent output.
    fn render_frame(&mut self, frame: FrameIndex) -> LottieResult<RenderedFrame>;

    /// Load a font file into the instance font database and make it the text default.
    /// Returns the loaded family name.
    fn set_font(&mut self, path: &Path) -> LottieResult<String>;

    /// Release every backend-owned resource. Idempotent.
    fn dispose(&mut self);

    /// Managed animation object, once ready.
    fn animation(&self) -> Option<&LottieAnimation>;

    /// Mutable managed animation object, once ready.
    fn animation_mut(&mut self) -> Option<&mut LottieAnimation>;

    /// Whether [`RenderBackend::initialize`] has succeeded and the backend is not disposed.
    fn is_ready(&self) -> bool {
        self.animation().is_some()
    }

    /// Document timing, once ready.
    fn timing(&self) -> Option<DocumentTiming> {
        self.animation().map(LottieAnimation::timing)
    }

    /// When the owning component should subscribe to the frame clock.
    fn clock_policy(&self) -> ClockPolicy {
        match self.kind() {
            BackendKind::Markup => ClockPolicy::OnReady,
            BackendKind::Raster => ClockPolicy::OnStart,
        }
    }

    /// See [`LottieAnimation::replace_asset`].
    fn replace_asset(&mut self, id: &str, path: &Path, absolute: bool) -> LottieResult<()> {
        ready_mut(self)?.replace_asset(id, path, absolute)
    }

    /// See [`LottieAnimation::replace_text`].
    fn replace_text(&mut self, target: &str, text: &str) -> LottieResult<usize> {
        Ok(ready_mut(self)?.replace_text(target, text))
    }

    /// See [`LottieAnimation::find_elements`].
    fn find_elements(&self, key: &str) -> LottieResult<Vec<ElementInfo>> {
        self.animation()
            .map(|a| a.find_elements(key))
            .ok_or_else(|| LottieError::not_ready("find_elements called before the backend is ready"))
    }
}

fn ready_mut<B: RenderBackend + ?Sized>(backend: &mut B) -> LottieResult<&mut LottieAnimation> {
    backend
        .animation_mut()
        .ok_or_else(|| LottieError::not_ready("backend is not initialized"))
}

pub(crate) fn already_initialized(kind: BackendKind) -> LottieError {
    LottieError::backend_init(format!(
        "{kind:?} backend was already initialized or disposed; create a new component instead"
    ))
}

/// Construct an uninitialized backend.
pub fn create_backend(kind: BackendKind, opts: &BackendOpts) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Markup => Box::new(crate::render::markup::MarkupBackend::new(opts.clone())),
        BackendKind::Raster => Box::new(crate::render::raster::RasterBackend::new(opts.clone())),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
