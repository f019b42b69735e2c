use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::error::LottieResult;
use crate::render::backend::RenderedFrame;
use crate::texture::node::{DisplayNode, Texture};
use crate::texture::rasterize::{FileRoundTripRasterizer, InMemoryRasterizer, MarkupRasterizer};

/// Converts rendered frames into textures and swaps them onto a display node.
pub struct TextureBridge {
    rasterizer: Box<dyn MarkupRasterizer>,
}

impl std::fmt::Debug for TextureBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureBridge").finish_non_exhaustive()
    }
}

impl TextureBridge {
    /// Bridge using a custom markup rasterizer.
    pub fn new(rasterizer: Box<dyn MarkupRasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Bridge that round-trips markup through transient files in `dir`.
    pub fn file_round_trip(dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileRoundTripRasterizer::new(dir)))
    }

    /// Bridge that rasterizes markup in memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryRasterizer))
    }

    /// Convert `frame` and assign it to `node`.
    ///
    /// On error the node keeps its previous texture.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn publish(&self, frame: RenderedFrame, node: &DisplayNode) -> LottieResult<()> {
        let texture = match frame {
            RenderedFrame::Raster(pixels) => Texture::from_frame(pixels)?,
            RenderedFrame::Markup(markup) => self.rasterizer.rasterize(&markup)?,
        };
        node.replace_texture(Arc::new(texture));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/bridge.rs"]
mod tests;
