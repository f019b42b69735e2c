//! Animation document loading and the parsed Lottie model.
//!
//! Documents are resolved from inline JSON or a file path, validated for the handful of fields
//! playback depends on (`fr`, `op`, `layers`) and parsed into an immutable [`loader::AnimationDocument`].

/// Document sources and the loader entry point.
pub mod loader;
/// Typed Lottie subset consumed by the animation engine.
pub mod model;
pub(crate) mod property;
