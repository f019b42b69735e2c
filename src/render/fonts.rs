use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{LottieError, LottieResult};

/// Font database owned by one backend instance.
///
/// Cloning shares the database until the next [`FontRegistry::load_file`], which copies on write
/// so frames already handed out keep the faces they were rendered with.
#[derive(Clone, Debug)]
pub struct FontRegistry {
    db: Arc<usvg::fontdb::Database>,
}

impl FontRegistry {
    /// Create a registry, optionally seeded with the system fonts.
    pub fn new(system_fonts: bool) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if system_fonts {
            db.load_system_fonts();
        }
        Self { db: Arc::new(db) }
    }

    /// Load a font file and return the family name of its first face.
    pub fn load_file(&mut self, path: &Path) -> LottieResult<String> {
        let data = std::fs::read(path).map_err(|e| {
            LottieError::validation(format!("cannot read font '{}': {e}", path.display()))
        })?;
        let db = Arc::make_mut(&mut self.db);
        let ids = db.load_font_source(usvg::fontdb::Source::Binary(Arc::new(data)));
        let family = ids
            .first()
            .and_then(|id| db.face(*id))
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| {
                LottieError::validation(format!("'{}' contains no usable font faces", path.display()))
            })?;
        tracing::debug!(path = %path.display(), family, "loaded font");
        Ok(family)
    }

    /// Number of faces available.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Shared handle to the database.
    pub fn database(&self) -> Arc<usvg::fontdb::Database> {
        self.db.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
