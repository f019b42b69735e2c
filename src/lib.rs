//! Wavyte Lottie drives Lottie animations in lockstep with a host compositor's frame clock.
//!
//! An [`AnimationComponent`] loads a document on a worker thread, renders each clock tick through
//! one of two interchangeable backends and publishes the result as a texture on a
//! [`DisplayNode`]:
//!
//! - the markup backend rebuilds an SVG tree in an instance-owned document environment and
//!   serializes it; the texture bridge rasterizes that markup (through a transient file or in
//!   memory)
//! - the raster backend paints straight into an offscreen `vello_cpu` surface
//!
//! Frame indices come from a [`FrameMapper`], either time-driven (`floor(elapsed * fps)`) or one
//! frame per tick, clamped to the last frame or wrapped when looping.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Host frame clock and frame mapping.
pub mod clock;
/// Animation component lifecycle.
pub mod component;
/// Document loading and the Lottie model.
pub mod document;
/// Managed animation object and scene evaluation.
pub mod engine;
/// Render backends.
pub mod render;
/// Textures, display nodes and the texture bridge.
pub mod texture;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, FrameIndex, FrameRate, Point, Rect, Rgba8, Vec2,
};
pub use crate::foundation::error::{LottieError, LottieResult};

pub use crate::clock::frame_clock::{FrameClock, SubscriptionId};
pub use crate::clock::mapper::{FrameCursor, FrameMapper, FramePolicy};
pub use crate::component::config::{AnimationConfig, RasterizerKind};
pub use crate::component::lifecycle::{
    AnimationComponent, ComponentEvent, ComponentState, TickStats,
};
pub use crate::document::loader::{
    AnimationDocument, DocumentSource, DocumentTiming, load_document,
};
pub use crate::engine::animation::{ElementInfo, LottieAnimation};
pub use crate::engine::scene::FrameScene;
pub use crate::render::backend::{
    BackendKind, BackendOpts, ClockPolicy, FrameRGBA, MarkupFrame, RenderBackend, RenderedFrame,
    create_backend,
};
pub use crate::texture::bridge::TextureBridge;
pub use crate::texture::node::{DisplayNode, Texture};
pub use crate::texture::rasterize::{FileRoundTripRasterizer, InMemoryRasterizer, MarkupRasterizer};
