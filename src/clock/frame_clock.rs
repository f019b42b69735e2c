use std::cell::RefCell;
use std::rc::Rc;

/// Handle returned by [`FrameClock::add_frame_callback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type FrameCallback = Rc<RefCell<dyn FnMut(f64, f64)>>;

#[derive(Default)]
struct ClockState {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, FrameCallback)>,
    last_time: Option<f64>,
}

/// The host compositor's master time source.
///
/// Cloning yields another handle to the same clock. Ticks are delivered sequentially, in
/// subscription order, on the thread that calls [`FrameClock::tick`]. Callbacks may subscribe or
/// unsubscribe (themselves included) while a tick is being delivered; a callback removed mid-tick
/// is not invoked for the remainder of that tick.
#[derive(Clone, Default)]
pub struct FrameClock {
    state: Rc<RefCell<ClockState>>,
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameClock")
            .field("subscribers", &state.subscribers.len())
            .field("last_time", &state.last_time)
            .finish()
    }
}

impl FrameClock {
    /// New clock with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback(absolute_time_secs, delta_secs)`.
    pub fn add_frame_callback(&self, callback: impl FnMut(f64, f64) + 'static) -> SubscriptionId {
        let callback: FrameCallback = Rc::new(RefCell::new(callback));
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscribers.push((id, callback));
        id
    }

    /// Unregister a callback. Returns `false` if it was not subscribed.
    pub fn remove_frame_callback(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sid, _)| *sid != id);
        state.subscribers.len() != before
    }

    /// Whether `id` is currently subscribed.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.state
            .borrow()
            .subscribers
            .iter()
            .any(|(sid, _)| *sid == id)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Deliver one tick at absolute time `now_secs`. The delta is `0` on the first tick.
    pub fn tick(&self, now_secs: f64) {
        let (delta, snapshot) = {
            let mut state = self.state.borrow_mut();
            let delta = state.last_time.map_or(0.0, |last| now_secs - last);
            state.last_time = Some(now_secs);
            (delta, state.subscribers.clone())
        };

        for (id, callback) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            // A callback that ticks its own clock re-enters here; skip it instead of panicking.
            let Ok(mut callback) = callback.try_borrow_mut() else {
                continue;
            };
            (&mut *callback)(now_secs, delta);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/frame_clock.rs"]
mod tests;
