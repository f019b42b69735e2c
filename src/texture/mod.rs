//! Compositor-facing texture slot and the adapters that fill it from rendered frames.

/// Publishing rendered frames onto display nodes.
pub mod bridge;
/// Texture and display-node types.
pub mod node;
/// Markup-to-pixels conversion.
pub mod rasterize;
