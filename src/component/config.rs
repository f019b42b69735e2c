use std::path::PathBuf;

use serde_json::Value;

use crate::clock::mapper::FramePolicy;
use crate::document::loader::DocumentSource;
use crate::foundation::core::Canvas;
use crate::foundation::error::{LottieError, LottieResult};
use crate::render::backend::{BackendKind, BackendOpts};

/// Environment variable consulted for the transient artifact directory.
pub const TMPDIR_ENV: &str = "WAVYTE_LOTTIE_TMPDIR";

/// How markup frames are turned into pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerKind {
    /// Write a transient file, decode it, delete it.
    #[default]
    FileRoundTrip,
    /// Decode straight from memory.
    InMemory,
}

/// Options an [`AnimationComponent`](crate::component::lifecycle::AnimationComponent) is
/// constructed from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Inline document. Takes precedence over `file`.
    pub data: Option<Value>,
    /// Document path.
    #[serde(alias = "filepath")]
    pub file: Option<PathBuf>,
    /// Wrap to frame 0 after the last frame instead of freezing.
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Render backend.
    pub backend: BackendKind,
    /// Frame advancement policy.
    pub frame_policy: FramePolicy,
    /// Seed per-instance font databases with system fonts.
    pub system_fonts: bool,
    /// Markup rasterization strategy.
    pub rasterizer: RasterizerKind,
    /// Directory for transient markup artifacts.
    pub temp_dir: Option<PathBuf>,
    /// Straight RGBA background for raster frames.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            data: None,
            file: None,
            looping: false,
            width: 500,
            height: 500,
            backend: BackendKind::default(),
            frame_policy: FramePolicy::default(),
            system_fonts: true,
            rasterizer: RasterizerKind::default(),
            temp_dir: None,
            clear_rgba: None,
        }
    }
}

impl AnimationConfig {
    /// Parse options from JSON text.
    pub fn from_json(text: &str) -> LottieResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| LottieError::validation(format!("invalid animation options: {e}")))
    }

    /// Use an inline document.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Load the document from `path`.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Enable or disable looping.
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the output size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Choose the render backend.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Choose the frame advancement policy.
    pub fn with_frame_policy(mut self, policy: FramePolicy) -> Self {
        self.frame_policy = policy;
        self
    }

    /// Enable or disable system fonts.
    pub fn with_system_fonts(mut self, enabled: bool) -> Self {
        self.system_fonts = enabled;
        self
    }

    /// Choose the markup rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: RasterizerKind) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Put transient artifacts in `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Background color for raster frames.
    pub fn with_clear_rgba(mut self, rgba: Option<[u8; 4]>) -> Self {
        self.clear_rgba = rgba;
        self
    }

    /// Check the options and return the output canvas.
    pub fn validate(&self) -> LottieResult<Canvas> {
        let canvas = Canvas::new(self.width, self.height)?;
        self.document_source()?;
        Ok(canvas)
    }

    /// Where the document comes from. Fails when neither `data` nor `file` is set.
    pub fn document_source(&self) -> LottieResult<DocumentSource> {
        match (&self.data, &self.file) {
            (Some(data), _) if !data.is_null() => Ok(DocumentSource::Inline(data.clone())),
            (_, Some(path)) => Ok(DocumentSource::File(path.clone())),
            _ => Err(LottieError::malformed(
                "no animation document: set either `data` or `file`",
            )),
        }
    }

    /// Directory for transient artifacts: `temp_dir`, then `WAVYTE_LOTTIE_TMPDIR`, then the OS
    /// temp dir.
    pub fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .or_else(|| {
                std::env::var_os(TMPDIR_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Options handed to the backend constructor.
    pub fn backend_opts(&self) -> BackendOpts {
        BackendOpts {
            system_fonts: self.system_fonts,
            clear_rgba: self.clear_rgba,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/config.rs"]
mod tests;
