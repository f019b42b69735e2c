use crate::document::loader::DocumentTiming;
use crate::foundation::core::{FrameIndex, FrameRate};

/// How compositor ticks advance the animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePolicy {
    /// `frame = floor((now - origin) * frame_rate)`, independent of tick cadence.
    #[default]
    TimeDriven,
    /// One frame per observed tick, independent of wall time.
    TickDriven,
}

/// Maps elapsed compositor time onto a playback frame index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMapper {
    frame_rate: FrameRate,
    total_frames: u64,
    looping: bool,
    policy: FramePolicy,
}

impl FrameMapper {
    /// Mapper for an animation of `total_frames` frames (at least one is assumed).
    pub fn new(frame_rate: FrameRate, total_frames: u64, looping: bool, policy: FramePolicy) -> Self {
        Self {
            frame_rate,
            total_frames: total_frames.max(1),
            looping,
            policy,
        }
    }

    /// Mapper for a loaded document.
    pub fn from_timing(timing: &DocumentTiming, looping: bool, policy: FramePolicy) -> Self {
        Self::new(timing.frame_rate, timing.total_frames, looping, policy)
    }

    /// Active policy.
    pub fn policy(&self) -> FramePolicy {
        self.policy
    }

    /// Number of frames the mapper clamps or wraps to.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Whether frames wrap instead of freezing on the last one.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Time-driven frame for `now`, both in seconds on the same clock.
    pub fn compute_frame(&self, origin_secs: f64, now_secs: f64) -> FrameIndex {
        self.fit(self.frame_rate.frames_between_floor(origin_secs, now_secs))
    }

    /// Fold an unbounded frame count into `[0, total_frames)`: wrap when looping, otherwise
    /// freeze on the last frame.
    pub fn fit(&self, raw: u64) -> FrameIndex {
        if self.looping {
            FrameIndex(raw % self.total_frames)
        } else {
            FrameIndex(raw.min(self.total_frames - 1))
        }
    }
}

/// Per-component playback position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameCursor {
    origin_time: Option<f64>,
    current_frame: FrameIndex,
    ticks: u64,
    high_water: u64,
}

impl FrameCursor {
    /// Cursor that has not seen a tick yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the first tick observed, once one has been.
    pub fn origin_time(&self) -> Option<f64> {
        self.origin_time
    }

    /// Frame computed by the most recent [`FrameCursor::advance`].
    pub fn current_frame(&self) -> FrameIndex {
        self.current_frame
    }

    /// Ticks observed since the origin.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Observe a tick at `now_secs` and return the target frame.
    ///
    /// The first call fixes the origin. The unbounded frame count never decreases, even if the
    /// clock goes backwards.
    pub fn advance(&mut self, mapper: &FrameMapper, now_secs: f64) -> FrameIndex {
        let origin = *self.origin_time.get_or_insert(now_secs);
        let raw = match mapper.policy() {
            FramePolicy::TimeDriven => mapper.frame_rate.frames_between_floor(origin, now_secs),
            FramePolicy::TickDriven => self.ticks,
        };
        self.ticks += 1;
        self.high_water = self.high_water.max(raw);
        self.current_frame = mapper.fit(self.high_water);
        self.current_frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/mapper.rs"]
mod tests;
