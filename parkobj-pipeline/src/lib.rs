//! # parkobj-pipeline
//!
//! Staging, image compilation, and archive packaging of object trees.
//!
//! Build a [`BuildContext`] and call [`pipeline::run`] to process the whole
//! `objects/` tree; the individual stages are public for callers that need
//! only part of the build.

pub mod archive;
pub mod discovery;
pub mod error;
pub mod execution;
pub mod fsops;
pub mod package;
pub mod pipeline;
pub mod process;
pub mod reprocess;
pub mod scanner;

pub use error::PipelineError;
pub use execution::ExecutionMode;
pub use pipeline::{run, BuildContext, BuildReport};
pub use process::ProcessRunner;
pub use scanner::{scan, ScanOptions};
