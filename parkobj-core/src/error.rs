//! Error types for parkobj-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from parsing, classifying, or serializing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is not valid JSON, or its top level is not a JSON object.
    #[error("failed to parse manifest at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (write path).
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// A string did not have the `$LGX:<file>[<start>..<end>]` shape.
    #[error("invalid container reference '{0}'")]
    InvalidReference(String),
}
