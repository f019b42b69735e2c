use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type LottieResult<T> = Result<T, LottieError>;

/// Top-level error taxonomy for loading, rendering and publishing animation frames.
#[derive(thiserror::Error, Debug)]
pub enum LottieError {
    /// The animation document file could not be read.
    #[error("document not found: '{}': {reason}", path.display())]
    DocumentNotFound {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying IO failure.
        reason: String,
    },

    /// The animation document could not be parsed or lacks required fields.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A render backend failed to come up.
    #[error("backend init failed: {0}")]
    BackendInitFailed(String),

    /// An operation that needs a ready backend was invoked too early (or after teardown).
    #[error("not ready: {0}")]
    NotReady(String),

    /// A rendered frame could not be decoded into a texture.
    #[error("texture decode failed: {0}")]
    TextureDecodeFailed(String),

    /// Writing, reading or deleting a transient markup artifact failed.
    #[error("transient artifact io error: {0}")]
    TransientArtifactIo(String),

    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LottieError {
    /// Build a [`LottieError::DocumentNotFound`] value.
    pub fn not_found(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::DocumentNotFound {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`LottieError::MalformedDocument`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// Build a [`LottieError::BackendInitFailed`] value.
    pub fn backend_init(msg: impl Into<String>) -> Self {
        Self::BackendInitFailed(msg.into())
    }

    /// Build a [`LottieError::NotReady`] value.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`LottieError::TextureDecodeFailed`] value.
    pub fn texture_decode(msg: impl Into<String>) -> Self {
        Self::TextureDecodeFailed(msg.into())
    }

    /// Build a [`LottieError::TransientArtifactIo`] value.
    pub fn transient_io(msg: impl Into<String>) -> Self {
        Self::TransientArtifactIo(msg.into())
    }

    /// Build a [`LottieError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for errors produced because a backend was not ready.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
