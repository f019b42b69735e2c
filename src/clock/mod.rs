//! Host frame clock and the elapsed-time to frame-index mapping.

/// Per-tick callback registry.
pub mod frame_clock;
/// Frame index computation.
pub mod mapper;
