//! Render backends: turn a document plus a frame index into a rendered frame.

/// Backend contract and factory.
pub mod backend;
pub(crate) mod decode;
/// Per-instance emulated document environment for the markup backend.
pub mod dom;
/// Per-instance font database.
pub mod fonts;
/// Vector-markup backend.
pub mod markup;
/// Raster-surface backend.
pub mod raster;
pub(crate) mod svg_raster;
