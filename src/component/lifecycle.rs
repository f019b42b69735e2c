use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::clock::frame_clock::{FrameClock, SubscriptionId};
use crate::clock::mapper::{FrameCursor, FrameMapper, FramePolicy};
use crate::component::config::{AnimationConfig, RasterizerKind};
use crate::component::init::{InitOutcome, InitTask};
use crate::document::loader::DocumentTiming;
use crate::engine::animation::{ElementInfo, LottieAnimation};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{LottieError, LottieResult};
use crate::render::backend::{BackendKind, ClockPolicy, RenderBackend, create_backend};
use crate::texture::bridge::TextureBridge;
use crate::texture::node::DisplayNode;

/// Lifecycle states. `Failed` and `Stopped` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentState {
    /// Built, initialization not started.
    Constructed,
    /// Document load and backend initialization in flight.
    Loading,
    /// Backend ready, not playing.
    Ready,
    /// Driven by the frame clock.
    Playing,
    /// Destroyed.
    Stopped,
    /// Initialization failed.
    Failed,
}

/// Outcome of initialization, reported once.
#[derive(Debug)]
pub enum ComponentEvent {
    /// The backend is ready.
    Ready,
    /// Loading or backend initialization failed; the component will never tick.
    Failed(LottieError),
}

/// Per-component tick counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks observed while ready.
    pub ticks: u64,
    /// Ticks that published a texture.
    pub rendered: u64,
    /// Ticks whose frame was already on the node.
    pub skipped: u64,
    /// Ticks whose render or publish failed.
    pub failed: u64,
}

struct Inner {
    state: ComponentState,
    canvas: Canvas,
    looping: bool,
    policy: FramePolicy,
    kind: BackendKind,
    clock: FrameClock,
    node: DisplayNode,
    bridge: TextureBridge,
    init: Option<InitTask>,
    backend: Option<Box<dyn RenderBackend>>,
    mapper: Option<FrameMapper>,
    cursor: FrameCursor,
    subscription: Option<SubscriptionId>,
    init_watch: Option<SubscriptionId>,
    unreported: Option<ComponentEvent>,
    start_requested: bool,
    pending_fonts: Vec<PathBuf>,
    last_published: Option<(FrameIndex, u64)>,
    stats: TickStats,
}

/// A Lottie animation bound to a frame clock and a display node.
///
/// Construction validates the options and starts initialization on a worker thread. Completion is
/// picked up on the next frame-clock tick; [`AnimationComponent::poll`] and
/// [`AnimationComponent::wait_ready`] pick it up sooner and report the outcome once. Once ready,
/// each clock tick maps the clock time to a frame, renders it and publishes it onto the node.
/// Markup backends tick as soon as they are ready; raster backends once
/// [`AnimationComponent::start`] is called.
pub struct AnimationComponent {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for AnimationComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("AnimationComponent")
                .field("state", &inner.state)
                .field("backend", &inner.kind)
                .field("canvas", &inner.canvas)
                .finish(),
            Err(_) => f.write_str("AnimationComponent { <busy> }"),
        }
    }
}

impl AnimationComponent {
    /// Build a component with the backend named in `config`.
    pub fn new(config: AnimationConfig, clock: &FrameClock, node: &DisplayNode) -> LottieResult<Self> {
        let backend = create_backend(config.backend, &config.backend_opts());
        Self::with_backend(config, backend, clock, node)
    }

    /// Build a component around a caller-provided, uninitialized backend.
    ///
    /// Fails before any asynchronous work starts if the options name no document or an invalid
    /// size.
    #[tracing::instrument(skip_all, fields(backend = ?backend.kind()))]
    pub fn with_backend(
        config: AnimationConfig,
        backend: Box<dyn RenderBackend>,
        clock: &FrameClock,
        node: &DisplayNode,
    ) -> LottieResult<Self> {
        let canvas = config.validate()?;
        let source = config.document_source()?;
        let bridge = match config.rasterizer {
            RasterizerKind::FileRoundTrip => TextureBridge::file_round_trip(config.resolved_temp_dir()),
            RasterizerKind::InMemory => TextureBridge::in_memory(),
        };

        let mut inner = Inner {
            state: ComponentState::Constructed,
            canvas,
            looping: config.looping,
            policy: config.frame_policy,
            kind: backend.kind(),
            clock: clock.clone(),
            node: node.clone(),
            bridge,
            init: None,
            backend: None,
            mapper: None,
            cursor: FrameCursor::new(),
            subscription: None,
            init_watch: None,
            unreported: None,
            start_requested: false,
            pending_fonts: Vec::new(),
            last_published: None,
            stats: TickStats::default(),
        };
        inner.init = Some(InitTask::spawn(source, canvas, backend)?);
        inner.state = ComponentState::Loading;
        tracing::debug!("component loading");
        let inner = Rc::new(RefCell::new(inner));
        Inner::watch_init(&inner);
        Ok(Self { inner })
    }

    /// Observe initialization without blocking. Returns the outcome the first time it is seen,
    /// including an outcome the frame clock already applied.
    pub fn poll(&self) -> Option<ComponentEvent> {
        let weak = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();
        if let Some(event) = inner.unreported.take() {
            return Some(event);
        }
        if inner.state != ComponentState::Loading {
            return None;
        }
        let outcome = inner.init.as_ref()?.try_take()?;
        Some(inner.complete_init(outcome, &weak))
    }

    /// Block up to `timeout` for initialization. Same reporting rules as
    /// [`AnimationComponent::poll`].
    pub fn wait_ready(&self, timeout: Duration) -> Option<ComponentEvent> {
        let weak = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();
        if let Some(event) = inner.unreported.take() {
            return Some(event);
        }
        if inner.state != ComponentState::Loading {
            return None;
        }
        let outcome = inner.init.as_ref()?.wait_take(timeout)?;
        Some(inner.complete_init(outcome, &weak))
    }

    /// Begin playback. While loading, the request is remembered and honoured at readiness.
    pub fn start(&self) -> LottieResult<()> {
        let weak = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            ComponentState::Constructed | ComponentState::Loading => {
                inner.start_requested = true;
                Ok(())
            }
            ComponentState::Ready => {
                inner.begin_playing(&weak);
                Ok(())
            }
            ComponentState::Playing => Ok(()),
            ComponentState::Stopped => Err(LottieError::validation("start called after destroy")),
            ComponentState::Failed => Err(LottieError::validation(
                "start called on a component whose initialization failed",
            )),
        }
    }

    /// Unsubscribe from the clock, abandon pending initialization, dispose the backend and drop
    /// every reference. Idempotent.
    pub fn destroy(&self) {
        self.inner.borrow_mut().teardown();
    }

    /// Point image asset `id` at `path`. See [`LottieAnimation::replace_asset`].
    pub fn replace_asset(&self, id: &str, path: impl AsRef<Path>, absolute: bool) -> LottieResult<()> {
        self.with_ready_backend("replace_asset", |b| {
            b.replace_asset(id, path.as_ref(), absolute)
        })
    }

    /// Replace text in text layers. See [`LottieAnimation::replace_text`].
    pub fn replace_text(&self, target: &str, text: &str) -> LottieResult<usize> {
        self.with_ready_backend("replace_text", |b| b.replace_text(target, text))
    }

    /// Layers whose name or element id equals `key`.
    pub fn find_elements(&self, key: &str) -> LottieResult<Vec<ElementInfo>> {
        self.with_ready_backend("find_elements", |b| b.find_elements(key))
    }

    /// Scoped access to the managed animation object.
    pub fn with_api<R>(&self, f: impl FnOnce(&mut LottieAnimation) -> R) -> LottieResult<R> {
        self.with_ready_backend("with_api", |b| {
            b.animation_mut()
                .map(f)
                .ok_or_else(|| LottieError::not_ready("backend has no animation"))
        })
    }

    /// Load a font and use it for text. Queued while loading (returns `None`), applied
    /// immediately once ready (returns the family name).
    pub fn set_font(&self, path: impl AsRef<Path>) -> LottieResult<Option<String>> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        match (inner.state, inner.backend.as_mut()) {
            (ComponentState::Constructed | ComponentState::Loading, _) => {
                inner.pending_fonts.push(path.as_ref().to_path_buf());
                Ok(None)
            }
            (ComponentState::Ready | ComponentState::Playing, Some(backend)) => {
                backend.set_font(path.as_ref()).map(Some)
            }
            (state, _) => Err(LottieError::not_ready(format!(
                "set_font on a component in state {state:?}"
            ))),
        }
    }

    /// Current state.
    pub fn state(&self) -> ComponentState {
        self.inner.borrow().state
    }

    /// Frame computed on the latest tick.
    pub fn current_frame(&self) -> FrameIndex {
        self.inner.borrow().cursor.current_frame()
    }

    /// Tick counters.
    pub fn stats(&self) -> TickStats {
        self.inner.borrow().stats
    }

    /// Backend variant.
    pub fn backend_kind(&self) -> BackendKind {
        self.inner.borrow().kind
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.inner.borrow().canvas
    }

    /// Whether a frame-clock subscription is installed.
    pub fn is_subscribed(&self) -> bool {
        self.inner.borrow().subscription.is_some()
    }

    /// Document timing, once ready.
    pub fn timing(&self) -> Option<DocumentTiming> {
        self.inner.borrow().backend.as_ref().and_then(|b| b.timing())
    }

    fn with_ready_backend<R>(
        &self,
        op: &str,
        f: impl FnOnce(&mut dyn RenderBackend) -> LottieResult<R>,
    ) -> LottieResult<R> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        match (inner.state, inner.backend.as_mut()) {
            (ComponentState::Ready | ComponentState::Playing, Some(backend)) => f(backend.as_mut()),
            (state, _) => Err(LottieError::not_ready(format!(
                "{op} requires a ready component (state: {state:?})"
            ))),
        }
    }
}

impl Inner {
    /// While loading, every clock tick checks whether the worker has finished, so a host that
    /// only drives the clock still sees the component become ready.
    fn watch_init(this: &Rc<RefCell<Inner>>) {
        let weak = Rc::downgrade(this);
        let mut inner = this.borrow_mut();
        let id = inner.clock.add_frame_callback(move |_now, _delta| {
            let Some(component) = weak.upgrade() else {
                return;
            };
            let Ok(mut inner) = component.try_borrow_mut() else {
                return;
            };
            if inner.state != ComponentState::Loading {
                return;
            }
            if let Some(outcome) = inner.init.as_ref().and_then(InitTask::try_take) {
                let event = inner.complete_init(outcome, &weak);
                inner.unreported = Some(event);
            }
        });
        inner.init_watch = Some(id);
    }

    fn complete_init(&mut self, outcome: InitOutcome, weak: &Weak<RefCell<Inner>>) -> ComponentEvent {
        self.init = None;
        if let Some(id) = self.init_watch.take() {
            self.clock.remove_frame_callback(id);
        }
        let backend = outcome.and_then(|backend| match backend.timing() {
            Some(timing) => Ok((backend, timing)),
            None => Err(LottieError::backend_init("backend reported ready without a document")),
        });
        let (mut backend, timing) = match backend {
            Ok(ready) => ready,
            Err(e) => {
                tracing::warn!(error = %e, "component initialization failed");
                self.state = ComponentState::Failed;
                self.start_requested = false;
                self.pending_fonts.clear();
                return ComponentEvent::Failed(e);
            }
        };

        for path in std::mem::take(&mut self.pending_fonts) {
            if let Err(e) = backend.set_font(&path) {
                tracing::warn!(path = %path.display(), error = %e, "queued font could not be loaded");
            }
        }
        let subscribe_now = backend.clock_policy() == ClockPolicy::OnReady;
        self.mapper = Some(FrameMapper::from_timing(&timing, self.looping, self.policy));
        self.backend = Some(backend);
        self.state = ComponentState::Ready;
        tracing::debug!(total_frames = timing.total_frames, "component ready");

        if subscribe_now {
            self.subscribe(weak);
        }
        if std::mem::take(&mut self.start_requested) {
            self.begin_playing(weak);
        }
        ComponentEvent::Ready
    }

    fn begin_playing(&mut self, weak: &Weak<RefCell<Inner>>) {
        self.state = ComponentState::Playing;
        self.node.set_display_size(self.canvas.width, self.canvas.height);
        self.subscribe(weak);
        tracing::debug!("component playing");
    }

    fn subscribe(&mut self, weak: &Weak<RefCell<Inner>>) {
        if self.subscription.is_some() {
            return;
        }
        let weak = weak.clone();
        let id = self.clock.add_frame_callback(move |now, _delta| {
            let Some(component) = weak.upgrade() else {
                return;
            };
            let Ok(mut inner) = component.try_borrow_mut() else {
                tracing::trace!("component busy, tick dropped");
                return;
            };
            inner.on_tick(now);
        });
        self.subscription = Some(id);
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn on_tick(&mut self, now: f64) {
        if !matches!(self.state, ComponentState::Ready | ComponentState::Playing) {
            return;
        }
        let (Some(backend), Some(mapper)) = (self.backend.as_mut(), self.mapper.as_ref()) else {
            return;
        };
        self.stats.ticks += 1;
        let frame = self.cursor.advance(mapper, now);
        let revision = backend.animation().map_or(0, LottieAnimation::revision);
        if self.last_published == Some((frame, revision)) {
            self.stats.skipped += 1;
            return;
        }

        match backend
            .render_frame(frame)
            .and_then(|rendered| self.bridge.publish(rendered, &self.node))
        {
            Ok(()) => {
                self.last_published = Some((frame, revision));
                self.stats.rendered += 1;
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::warn!(frame = frame.0, error = %e, "frame not published");
            }
        }
    }

    fn teardown(&mut self) {
        if self.state == ComponentState::Stopped {
            return;
        }
        for id in [self.subscription.take(), self.init_watch.take()]
            .into_iter()
            .flatten()
        {
            self.clock.remove_frame_callback(id);
        }
        if let Some(init) = self.init.take() {
            init.cancel();
        }
        if let Some(mut backend) = self.backend.take() {
            backend.dispose();
        }
        self.mapper = None;
        self.start_requested = false;
        self.pending_fonts.clear();
        self.unreported = None;
        self.last_published = None;
        self.state = ComponentState::Stopped;
        tracing::debug!("component stopped");
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/lifecycle.rs"]
mod tests;
