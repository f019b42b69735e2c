use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::foundation::error::{LottieError, LottieResult};
use crate::render::backend::MarkupFrame;
use crate::render::svg_raster::{parse_svg, rasterize_svg_to_premul_rgba8};
use crate::texture::node::Texture;

/// Turns serialized markup into pixels.
pub trait MarkupRasterizer {
    /// Rasterize `frame` at its target size.
    fn rasterize(&self, frame: &MarkupFrame) -> LottieResult<Texture>;
}

/// Writes each frame to a uniquely named transient file, decodes it back and deletes it.
///
/// The file is removed on every path, decode failures included.
#[derive(Clone, Debug)]
pub struct FileRoundTripRasterizer {
    dir: PathBuf,
}

impl FileRoundTripRasterizer {
    /// Place transient artifacts in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Artifact directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MarkupRasterizer for FileRoundTripRasterizer {
    fn rasterize(&self, frame: &MarkupFrame) -> LottieResult<Texture> {
        let mut artifact = tempfile::Builder::new()
            .prefix("wavyte-lottie-")
            .suffix(".svg")
            .tempfile_in(&self.dir)
            .map_err(|e| {
                LottieError::transient_io(format!(
                    "create artifact in '{}': {e}",
                    self.dir.display()
                ))
            })?;

        let decoded = artifact
            .write_all(frame.markup.as_bytes())
            .and_then(|()| artifact.flush())
            .and_then(|()| std::fs::read(artifact.path()))
            .map_err(|e| LottieError::transient_io(format!("markup artifact round trip: {e}")))
            .and_then(|bytes| decode_svg_texture(&bytes, frame));

        let path = artifact.path().to_path_buf();
        let removed = artifact.close();
        match (decoded, removed) {
            (Err(e), Err(io)) => {
                tracing::warn!(path = %path.display(), error = %io, "failed to remove markup artifact");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(_), Err(io)) => Err(LottieError::transient_io(format!(
                "remove '{}': {io}",
                path.display()
            ))),
            (Ok(texture), Ok(())) => Ok(texture),
        }
    }
}

/// Parses and rasterizes the markup without touching the filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct InMemoryRasterizer;

impl MarkupRasterizer for InMemoryRasterizer {
    fn rasterize(&self, frame: &MarkupFrame) -> LottieResult<Texture> {
        decode_svg_texture(frame.markup.as_bytes(), frame)
    }
}

fn decode_svg_texture(bytes: &[u8], frame: &MarkupFrame) -> LottieResult<Texture> {
    let tree = parse_svg(bytes, frame.fonts.clone())
        .map_err(|e| LottieError::texture_decode(format!("{e:#}")))?;
    let data = rasterize_svg_to_premul_rgba8(&tree, frame.width, frame.height)
        .map_err(|e| LottieError::texture_decode(format!("{e:#}")))?;
    Ok(Texture {
        width: frame.width,
        height: frame.height,
        data,
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/texture/rasterize.rs"]
mod tests;
