use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::document::loader::{DocumentSource, load_document};
use crate::foundation::core::Canvas;
use crate::foundation::error::{LottieError, LottieResult};
use crate::render::backend::RenderBackend;

pub(crate) type InitOutcome = LottieResult<Box<dyn RenderBackend>>;

enum InitState {
    Pending,
    Finished(InitOutcome),
    Taken,
    Cancelled,
}

struct InitShared {
    state: Mutex<InitState>,
    ready: Condvar,
    cancelled: AtomicBool,
}

impl InitShared {
    fn lock(&self) -> MutexGuard<'_, InitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Document loading plus backend initialization, running on a worker thread.
///
/// The outcome is parked in a shared slot until the owner takes it. Cancelling marks the slot so
/// a late completion disposes its backend instead of handing it over.
pub(crate) struct InitTask {
    shared: Arc<InitShared>,
}

impl InitTask {
    pub(crate) fn spawn(
        source: DocumentSource,
        canvas: Canvas,
        backend: Box<dyn RenderBackend>,
    ) -> LottieResult<Self> {
        let shared = Arc::new(InitShared {
            state: Mutex::new(InitState::Pending),
            ready: Condvar::new(),
            cancelled: AtomicBool::new(false),
        });
        let worker = Arc::clone(&shared);
        std::thread::Builder::new()
            .name("wavyte-lottie-init".to_string())
            .spawn(move || run(&worker, &source, canvas, backend))
            .map_err(|e| LottieError::backend_init(format!("spawn init worker: {e}")))?;
        Ok(Self { shared })
    }

    /// Take the outcome if the worker has finished.
    pub(crate) fn try_take(&self) -> Option<InitOutcome> {
        take_finished(&mut self.shared.lock())
    }

    /// Block up to `timeout` for the worker, then take the outcome if there is one.
    pub(crate) fn wait_take(&self, timeout: Duration) -> Option<InitOutcome> {
        let guard = self.shared.lock();
        let (mut guard, _) = self
            .shared
            .ready
            .wait_timeout_while(guard, timeout, |s| matches!(s, InitState::Pending))
            .unwrap_or_else(PoisonError::into_inner);
        take_finished(&mut guard)
    }

    /// Abandon the task. A backend that already finished is disposed here; one still
    /// initializing is disposed by the worker when it completes.
    pub(crate) fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::Release);
        let previous = std::mem::replace(&mut *self.shared.lock(), InitState::Cancelled);
        match previous {
            InitState::Finished(Ok(mut backend)) => backend.dispose(),
            InitState::Taken => *self.shared.lock() = InitState::Taken,
            InitState::Pending | InitState::Finished(Err(_)) | InitState::Cancelled => {}
        }
        tracing::debug!("init task cancelled");
    }
}

fn take_finished(state: &mut InitState) -> Option<InitOutcome> {
    if !matches!(state, InitState::Finished(_)) {
        return None;
    }
    match std::mem::replace(state, InitState::Taken) {
        InitState::Finished(outcome) => Some(outcome),
        _ => None,
    }
}

#[tracing::instrument(skip_all, fields(width = canvas.width, height = canvas.height))]
fn run(
    shared: &InitShared,
    source: &DocumentSource,
    canvas: Canvas,
    mut backend: Box<dyn RenderBackend>,
) {
    let outcome = load_document(source).and_then(|document| {
        if shared.cancelled.load(Ordering::Acquire) {
            return Err(LottieError::backend_init("initialization cancelled"));
        }
        backend.initialize(&document, canvas).map_err(|e| match e {
            LottieError::BackendInitFailed(_) => e,
            other => LottieError::backend_init(other.to_string()),
        })
    });

    let mut state = shared.lock();
    if matches!(*state, InitState::Cancelled) {
        drop(state);
        backend.dispose();
        tracing::debug!("discarded backend of a cancelled component");
        return;
    }
    *state = match outcome {
        Ok(()) => InitState::Finished(Ok(backend)),
        Err(e) => {
            backend.dispose();
            InitState::Finished(Err(e))
        }
    };
    shared.ready.notify_all();
}

#[cfg(test)]
#[path = "../../tests/unit/component/init.rs"]
mod tests;
