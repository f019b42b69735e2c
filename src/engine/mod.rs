//! The managed animation object both render backends drive.
//!
//! [`animation::LottieAnimation`] owns a private copy of the document graph (so mutations never touch the
//! loaded [`crate::AnimationDocument`]), tracks the playback position and evaluates the graph into
//! a backend-agnostic [`scene::FrameScene`].

/// Managed animation object: seek, mutation and query operations.
pub mod animation;
pub(crate) mod geometry;
/// Evaluated per-frame draw list.
pub mod scene;
