//! Build orchestration.
//!
//! Stages run strictly in order, each finishing completely before the next
//! starts: stage → discover → reprocess → package objects → package the rest.

use std::path::PathBuf;

use parkobj_core::{BuildOptions, Layout, ObjectId, ToolConfig};

use crate::discovery::discover_objects;
use crate::error::PipelineError;
use crate::execution::ExecutionMode;
use crate::fsops::{copy_tree, remove_path};
use crate::package::{package_objects, package_remaining};
use crate::process::ProcessRunner;
use crate::reprocess::reprocess_objects;

/// Everything a build needs, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub layout: Layout,
    pub tools: ToolConfig,
    pub options: BuildOptions,
    pub runner: ProcessRunner,
    pub mode: ExecutionMode,
}

impl BuildContext {
    pub fn new(layout: Layout, tools: ToolConfig, options: BuildOptions) -> Self {
        Self {
            layout,
            tools,
            options,
            runner: ProcessRunner::new(options.verbose),
            mode: ExecutionMode::from_parallel_flag(options.parallel),
        }
    }
}

/// What a completed build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of manifests found in the staged tree.
    pub discovered: usize,
    /// Objects whose images were compiled.
    pub reprocessed: Vec<ObjectId>,
    /// Per-object archives written.
    pub parkobjs: Vec<PathBuf>,
    /// The aggregate archive, unless nothing was left to put in it.
    pub aggregate: Option<PathBuf>,
}

/// Replace the staged tree with a fresh copy of the input tree.
pub async fn stage(ctx: &BuildContext) -> Result<PathBuf, PipelineError> {
    let staging = ctx.layout.staging_root();
    remove_path(&staging, ctx.options.verbose).await?;
    copy_tree(&ctx.layout.input_root(), &staging, ctx.options.verbose).await?;
    Ok(staging)
}

/// Run the whole build. Any error aborts the run; nothing already written or
/// deleted is rolled back.
pub async fn run(ctx: &BuildContext) -> Result<BuildReport, PipelineError> {
    let staging = stage(ctx).await?;
    let mut objects = discover_objects(&staging).await?;
    let reprocessed = reprocess_objects(ctx, &mut objects).await?;
    let parkobjs = package_objects(ctx, &objects).await?;
    let aggregate = package_remaining(ctx).await?;

    Ok(BuildReport {
        discovered: objects.len(),
        reprocessed,
        parkobjs,
        aggregate,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn stage_replaces_previous_artifacts() {
        let base = TempDir::new().expect("base");
        fs::create_dir_all(base.path().join("objects/foo")).expect("mkdir");
        fs::write(base.path().join("objects/foo/object.1.json"), "{}").expect("write");
        fs::create_dir_all(base.path().join("artifacts/stale")).expect("mkdir");
        fs::write(base.path().join("artifacts/objects.zip"), "old").expect("write");

        let ctx = BuildContext::new(
            Layout::at(base.path()),
            ToolConfig::default(),
            BuildOptions::default(),
        );
        let staging = stage(&ctx).await.expect("stage");

        assert_eq!(staging, base.path().join("artifacts"));
        assert!(staging.join("foo/object.1.json").is_file());
        assert!(!staging.join("stale").exists());
        assert!(!staging.join("objects.zip").exists());
        assert!(base.path().join("objects/foo/object.1.json").is_file());
    }

    #[tokio::test]
    async fn missing_input_tree_fails_before_anything_runs() {
        let base = TempDir::new().expect("base");
        let ctx = BuildContext::new(
            Layout::at(base.path()),
            ToolConfig::default(),
            BuildOptions { parallel: true, verbose: true },
        );
        let err = run(&ctx).await.unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }), "got: {err:?}");
        assert!(err.to_string().contains("objects"));
    }

    #[test]
    fn context_derives_mode_and_runner_from_options() {
        let ctx = BuildContext::new(
            Layout::at("."),
            ToolConfig::default(),
            BuildOptions { parallel: true, verbose: true },
        );
        assert_eq!(ctx.mode, ExecutionMode::Parallel);
        assert!(ctx.runner.verbose());
    }
}
