//! Error taxonomy for the scene pipeline.
//!
//! Only [`FetchError`] and [`SceneError`] ever reach the lifecycle.
//! [`AssetLoadError`] is consumed inside the icon path and degrades a single
//! entity to "no logo".

use thiserror::Error;

/// Failure reported by the upstream entity source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source could not be reached or read.
    #[error("failed to fetch market data: {0}")]
    Transport(String),
    /// The payload was not a JSON array of entity records.
    #[error("malformed market data: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A record parsed but violates the entity invariants.
    #[error("invalid entity record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Failure while fetching or decoding a single icon.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("icon read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("icon request failed: {0}")]
    Http(String),
    #[error("icon decode failed: {0}")]
    Decode(String),
    #[error("unsupported icon reference: {0}")]
    UnsupportedScheme(String),
}

/// Failure inside the render backend.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("render backend error: {0}")]
    Backend(String),
}
