//! Error taxonomy surfaced by every public core operation.

/// An overlay that matched an ambiguous lookup: `(overlay_hash, comment)`.
pub type OverlayListing = (String, String);

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("source does not parse: {0}")]
    InvalidSource(String),

    #[error("top level is not imports + exactly one function definition: {0}")]
    UnsupportedUnit(String),

    #[error("language tag invalid (3-256 chars, [a-z0-9-]): {0:?}")]
    InvalidLanguageTag(String),

    #[error("hash is not 64-hex-lowercase: {0:?}")]
    InvalidHash(String),

    #[error("locator is malformed: {0:?}")]
    InvalidLocator(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("ambiguous overlay: {} candidates", .0.len())]
    AmbiguousOverlay(Vec<OverlayListing>),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("integrity failure: {0}")]
    IntegrityFailure(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
