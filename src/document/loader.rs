use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::document::model::LottieModel;
use crate::foundation::core::{FrameIndex, FrameRate};
use crate::foundation::error::{LottieError, LottieResult};

/// Where an animation document comes from.
#[derive(Clone, Debug)]
pub enum DocumentSource {
    /// Already-parsed JSON (a JSON string value is parsed once more).
    Inline(Value),
    /// Path to a JSON file.
    File(PathBuf),
}

/// Playback-relevant timing and size of a document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DocumentTiming {
    /// Declared frame rate.
    pub frame_rate: FrameRate,
    /// In-point (document frame shown at playback frame 0).
    pub in_point: f64,
    /// Out-point (exclusive).
    pub out_point: f64,
    /// Number of playback frames, `ceil(op - ip)`.
    pub total_frames: u64,
    /// Document width in document units.
    pub width: f64,
    /// Document height in document units.
    pub height: f64,
}

impl DocumentTiming {
    /// Map a 0-based playback frame to a document frame.
    pub fn document_frame(&self, frame: FrameIndex) -> f64 {
        self.in_point + frame.0 as f64
    }

    /// Last valid playback frame.
    pub fn last_frame(&self) -> FrameIndex {
        FrameIndex(self.total_frames.saturating_sub(1))
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.total_frames as f64 * self.frame_rate.frame_duration_secs()
    }
}

/// A parsed, validated animation document. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct AnimationDocument {
    model: Arc<LottieModel>,
    timing: DocumentTiming,
    base_dir: Option<PathBuf>,
}

impl AnimationDocument {
    /// Validate and parse a JSON value. `base_dir` resolves relative asset paths.
    pub fn from_value(value: &Value, base_dir: Option<PathBuf>) -> LottieResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| LottieError::malformed("document root must be a JSON object"))?;

        let fr = obj
            .get("fr")
            .and_then(Value::as_f64)
            .ok_or_else(|| LottieError::malformed("missing numeric frame rate 'fr'"))?;
        let frame_rate =
            FrameRate::new(fr).map_err(|e| LottieError::malformed(format!("invalid 'fr': {e}")))?;
        if obj.get("op").and_then(Value::as_f64).is_none() {
            return Err(LottieError::malformed("missing numeric out-point 'op'"));
        }
        if !obj.get("layers").is_some_and(Value::is_array) {
            return Err(LottieError::malformed(
                "missing animation graph: 'layers' must be an array",
            ));
        }

        let model: LottieModel = serde_json::from_value(value.clone())
            .map_err(|e| LottieError::malformed(format!("invalid lottie structure: {e}")))?;

        let span = model.op - model.ip;
        if !span.is_finite() || span <= 0.0 {
            return Err(LottieError::malformed(format!(
                "out-point {} must be greater than in-point {}",
                model.op, model.ip
            )));
        }
        if !(model.w > 0.0 && model.h > 0.0) {
            return Err(LottieError::malformed("document size must be positive"));
        }

        let timing = DocumentTiming {
            frame_rate,
            in_point: model.ip,
            out_point: model.op,
            total_frames: (span.ceil() as u64).max(1),
            width: model.w,
            height: model.h,
        };
        Ok(Self {
            model: Arc::new(model),
            timing,
            base_dir,
        })
    }

    /// Parsed model.
    pub fn model(&self) -> &LottieModel {
        &self.model
    }

    /// Timing/size summary.
    pub fn timing(&self) -> DocumentTiming {
        self.timing
    }

    /// Directory relative asset paths are resolved against, if known.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

/// Resolve a document from `source`. Never caches across calls.
#[tracing::instrument(skip(source))]
pub fn load_document(source: &DocumentSource) -> LottieResult<AnimationDocument> {
    match source {
        DocumentSource::Inline(Value::String(text)) => {
            let value: Value = serde_json::from_str(text)
                .map_err(|e| LottieError::malformed(format!("inline document is not JSON: {e}")))?;
            AnimationDocument::from_value(&value, None)
        }
        DocumentSource::Inline(value) => AnimationDocument::from_value(value, None),
        DocumentSource::File(path) => {
            let bytes = std::fs::read(path).map_err(|e| LottieError::not_found(path, e))?;
            let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
                LottieError::malformed(format!("'{}' is not JSON: {e}", path.display()))
            })?;
            let base_dir = path.parent().map(Path::to_path_buf);
            let doc = AnimationDocument::from_value(&value, base_dir)?;
            tracing::debug!(
                path = %path.display(),
                total_frames = doc.timing.total_frames,
                "loaded animation document"
            );
            Ok(doc)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/loader.rs"]
mod tests;
