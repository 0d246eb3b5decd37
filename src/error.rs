//! Structured error types for the report renderer.
//!
//! The taxonomy follows the failure propagation policy: validation failures
//! never reach the layout engine, per-image failures are contained by the
//! assembler, whole-build failures surface once, and upload failures are
//! soft (local delivery still succeeds).

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Required fields, choices or signatures are missing. Surfaced before
    /// any rendering begins; the build is not attempted.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An image could not be normalized. Only fatal where the image *is*
    /// the artifact; evidence images are skipped by the assembler instead.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The layout engine or rasterizer failed. Fatal to the current build;
    /// no partial artifact is produced.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The external object store rejected the artifact. Non-fatal.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Snapshot JSON failed to parse.
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Missing required fields, collected as dotted field paths
/// (e.g. `channels.1.status`).
#[derive(Debug, Clone, Error)]
#[error("{} required field(s) missing or invalid: {}", .fields.len(), .fields.join(", "))]
pub struct ValidationError {
    pub fields: Vec<String>,
}

impl ValidationError {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

/// Image normalization failures.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The input carries no binary content (e.g. a `{name, size, mime}`
    /// stub restored from a persisted draft). Rejected before decoding.
    #[error("not a decodable image input: {0}")]
    InvalidInput(String),

    /// Both the primary and the fallback decode strategies failed.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// Re-encoding the downscaled bitmap failed.
    #[error("image encode failed: {0}")]
    Encode(String),
}

/// Unrecoverable failures inside a document build.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Another build currently owns the off-screen rendering state.
    #[error("a document build is already in progress")]
    BuildInProgress,

    /// The snapshot rasterizer has no usable font face.
    #[error("no font face available for rasterization: {0}")]
    MissingFont(String),

    /// A page pixmap could not be allocated or drawn.
    #[error("rasterization failed: {0}")]
    Raster(String),

    /// The build produced no pages at all.
    #[error("document build produced no pages")]
    EmptyDocument,
}

/// Object-store hand-off failures. Reported as a warning; the local save
/// path is unaffected.
#[derive(Debug, Error)]
#[error("upload to object store failed: {0}")]
pub struct UploadError(pub String);
