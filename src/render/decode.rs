use anyhow::Context;
use base64::Engine as _;

use crate::engine::scene::ImageSource;
use crate::foundation::error::{LottieError, LottieResult};

/// Decoded bitmap, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub(crate) struct DecodedImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba8_premul: Vec<u8>,
}

pub(crate) fn load_image(source: &ImageSource) -> LottieResult<DecodedImage> {
    let bytes = match source {
        ImageSource::File(path) => std::fs::read(path)
            .with_context(|| format!("read image asset '{}'", path.display()))?,
        ImageSource::DataUri(uri) => decode_data_uri(uri)?,
    };
    decode_image(&bytes)
}

pub(crate) fn decode_image(bytes: &[u8]) -> LottieResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Ok(DecodedImage {
        width,
        height,
        rgba8_premul,
    })
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URI. A bare base64 string is accepted too.
pub(crate) fn decode_data_uri(uri: &str) -> LottieResult<Vec<u8>> {
    let payload = match uri.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| LottieError::malformed("data uri has no payload"))?;
            if !meta.ends_with(";base64") {
                return Err(LottieError::malformed("only base64 data uris are supported"));
            }
            data
        }
        None => uri,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| LottieError::malformed(format!("invalid base64 image payload: {e}")))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/decode.rs"]
mod tests;
