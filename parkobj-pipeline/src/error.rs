//! Error types for parkobj-pipeline.

use std::path::PathBuf;

use thiserror::Error;

use parkobj_core::ManifestError;

/// All errors that can abort a build. Nothing is retried; the first error
/// reaching the orchestrator ends the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The external executable could not be located.
    #[error("{tool} was not found")]
    ToolNotFound { tool: String },

    /// The external executable ran and exited unsuccessfully.
    #[error("{tool} failed:\n{output}")]
    ToolFailed { tool: String, output: String },

    /// The compiler's details report had no usable `numEntries` field.
    #[error("unable to get number of images for gx file {container}: {reason}")]
    ManifestIntrospectionFailed { container: PathBuf, reason: String },

    /// The archiver ran and exited unsuccessfully.
    #[error("failed to create archive {archive}: {tool} failed:\n{output}")]
    ArchiveFailed {
        archive: PathBuf,
        tool: String,
        output: String,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest could not be parsed or serialized.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A background scan task panicked or was cancelled.
    #[error("scan task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience constructor for [`PipelineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.into(),
        source,
    }
}
