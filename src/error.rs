use thiserror::Error;

/// All errors the core can surface to a caller.
///
/// The taxonomy mirrors how failures are handled, not where they occur:
/// user-correctable (`DuplicateName`, `EmptyName`, `NoActiveProject`),
/// stale-state (`NotFound`), recoverable overlay conditions
/// (`ExtractionFailed`, `ExtractionTimeout`) and generic persistence
/// failures.
#[derive(Debug, Error)]
pub enum SnapError {
    /// A project with this exact name already exists (case-sensitive).
    #[error("a project named \"{0}\" already exists")]
    DuplicateName(String),

    /// Project creation was attempted with a blank name.
    #[error("project name must not be empty")]
    EmptyName,

    /// The referenced record no longer exists. Callers should reload
    /// their state from the store and retry if still relevant.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Capture was attempted with no project selected.
    #[error("no active project selected")]
    NoActiveProject,

    /// The edge extractor returned an error or an unusable mask.
    /// The overlay proceeds without a guide; capture is unaffected.
    #[error("edge extraction failed: {0}")]
    ExtractionFailed(String),

    /// The edge extractor did not respond within the configured bound.
    #[error("edge extraction timed out after {0} seconds")]
    ExtractionTimeout(u64),

    /// The capture source could not produce a frame.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// Underlying database failure. State should be reloaded from the
    /// store rather than trusting in-memory optimism.
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// Settings could not be serialized or parsed.
    #[error("settings (de)serialization failed: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SnapError>;
