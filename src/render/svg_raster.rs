use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{LottieError, LottieResult};

/// Parse SVG markup against a per-instance font database.
pub(crate) fn parse_svg(
    bytes: &[u8],
    fontdb: Arc<usvg::fontdb::Database>,
) -> LottieResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize `tree` stretched onto a `width`x`height` pixmap. Output is premultiplied RGBA8.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> LottieResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LottieError::validation(format!("failed to allocate {width}x{height} pixmap")))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg_raster.rs"]
mod tests;
