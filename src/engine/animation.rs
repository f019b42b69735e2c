use std::path::{Path, PathBuf};

use crate::document::loader::{AnimationDocument, DocumentTiming};
use crate::document::model::{Layer, LayerKind, LottieModel};
use crate::engine::scene::{FrameScene, SceneContext};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LottieError, LottieResult};

/// A layer matched by [`LottieAnimation::find_elements`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ElementInfo {
    /// Precomposition asset id owning the layer, `None` for the root composition.
    pub composition: Option<String>,
    /// Position of the layer in its composition (0 is top-most).
    pub layer_index: usize,
    /// Layer name.
    pub name: Option<String>,
    /// Layer element id (`ln`).
    pub element_id: Option<String>,
    /// Layer kind.
    pub kind: LayerKind,
}

/// The managed animation object: a private, mutable copy of the document graph plus a playback
/// position.
#[derive(Clone, Debug)]
pub struct LottieAnimation {
    model: LottieModel,
    timing: DocumentTiming,
    base_dir: Option<PathBuf>,
    current: FrameIndex,
    font_family: Option<String>,
    revision: u64,
}

impl LottieAnimation {
    /// Create an animation positioned at frame 0.
    pub fn new(document: &AnimationDocument) -> Self {
        Self {
            model: document.model().clone(),
            timing: document.timing(),
            base_dir: document.base_dir().map(Path::to_path_buf),
            current: FrameIndex(0),
            font_family: None,
            revision: 0,
        }
    }

    /// Timing/size summary of the underlying document.
    pub fn timing(&self) -> DocumentTiming {
        self.timing
    }

    /// Current graph (reflects mutations).
    pub fn model(&self) -> &LottieModel {
        &self.model
    }

    /// Counter bumped by every mutation; renderers use it to invalidate cached frames.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Move the playback position, clamping to the last frame. Returns the effective frame.
    pub fn seek(&mut self, frame: FrameIndex) -> FrameIndex {
        self.current = frame.min(self.timing.last_frame());
        self.current
    }

    /// Current playback position.
    pub fn current_frame(&self) -> FrameIndex {
        self.current
    }

    /// Evaluate the graph at the current position.
    pub fn scene(&self) -> FrameScene {
        let ctx = SceneContext {
            model: &self.model,
            base_dir: self.base_dir.as_deref(),
            font_override: self.font_family.as_deref(),
        };
        ctx.evaluate(self.current, self.timing.document_frame(self.current))
    }

    /// Seek to `frame` and evaluate.
    pub fn scene_at(&mut self, frame: FrameIndex) -> FrameScene {
        self.seek(frame);
        self.scene()
    }

    /// Point image asset `id` at a new file.
    ///
    /// With `absolute` the path is stored verbatim; otherwise it is resolved against the
    /// document's directory.
    pub fn replace_asset(
        &mut self,
        id: &str,
        path: impl AsRef<Path>,
        absolute: bool,
    ) -> LottieResult<()> {
        let path = path.as_ref();
        let resolved = match (&self.base_dir, absolute) {
            (Some(dir), false) => dir.join(path),
            _ => path.to_path_buf(),
        };
        let asset = self
            .model
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| LottieError::validation(format!("unknown asset id '{id}'")))?;
        if asset.layers.is_some() {
            return Err(LottieError::validation(format!(
                "asset '{id}' is a precomposition, not an image"
            )));
        }
        asset.u = Some(String::new());
        asset.p = Some(resolved.to_string_lossy().into_owned());
        asset.e = Some(0);
        self.revision += 1;
        tracing::debug!(id, path = %resolved.display(), "replaced asset");
        Ok(())
    }

    /// Replace text in text layers.
    ///
    /// Every text document whose text equals `target` is replaced, as are all documents of text
    /// layers named `target`. Returns the number of documents changed.
    pub fn replace_text(&mut self, target: &str, text: &str) -> usize {
        let mut replaced = 0;
        for layer in self.layers_mut() {
            if layer.kind() != LayerKind::Text {
                continue;
            }
            let named = layer.nm.as_deref() == Some(target);
            let Some(data) = layer.t.as_mut() else {
                continue;
            };
            for kf in &mut data.d.k {
                if named || kf.s.t == target {
                    kf.s.t = text.to_owned();
                    replaced += 1;
                }
            }
        }
        if replaced > 0 {
            self.revision += 1;
        }
        replaced
    }

    /// Every layer, in any composition, whose name or element id equals `key`.
    pub fn find_elements(&self, key: &str) -> Vec<ElementInfo> {
        let nested = self
            .model
            .assets
            .iter()
            .filter_map(|a| a.layers.as_deref().map(|l| (Some(a.id.as_str()), l)));
        let compositions = std::iter::once((None, self.model.layers.as_slice())).chain(nested);

        let mut found = Vec::new();
        for (comp, layers) in compositions {
            for (layer_index, layer) in layers.iter().enumerate() {
                if layer.nm.as_deref() == Some(key) || layer.ln.as_deref() == Some(key) {
                    found.push(ElementInfo {
                        composition: comp.map(str::to_owned),
                        layer_index,
                        name: layer.nm.clone(),
                        element_id: layer.ln.clone(),
                        kind: layer.kind(),
                    });
                }
            }
        }
        found
    }

    /// Use `family` for every text layer (`None` restores the document's fonts).
    pub fn set_font_family(&mut self, family: Option<String>) {
        self.font_family = family;
        self.revision += 1;
    }

    /// Font family override, if any.
    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    /// Names of the root composition's layers, top-most first.
    pub fn layer_names(&self) -> Vec<String> {
        self.model
            .layers
            .iter()
            .enumerate()
            .map(|(i, l)| l.nm.clone().unwrap_or_else(|| format!("layer {i}")))
            .collect()
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        let nested = self
            .model
            .assets
            .iter_mut()
            .filter_map(|a| a.layers.as_mut())
            .flatten();
        self.model.layers.iter_mut().chain(nested)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/animation.rs"]
mod tests;
