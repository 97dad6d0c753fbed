//! Packaging: one `.parkobj` per compiled object, then `objects.zip` for the rest.
//!
//! [`package_remaining`] lists what is left under the staged root, so it must
//! only run after [`package_objects`] has finished removing the directories it
//! archived.

use std::path::{Path, PathBuf};

use parkobj_core::layout::{parkobj_file_name, AGGREGATE_ARCHIVE, OBJECT_MANIFEST};
use parkobj_core::ObjectRecord;

use crate::archive::{create_archive, ArchiveOptions};
use crate::error::PipelineError;
use crate::fsops::{path_exists, remove_path};
use crate::pipeline::BuildContext;
use crate::scanner::{scan, ScanOptions};

/// Archive every object directory that holds an `object.json` into
/// `<id>.parkobj` beside it and delete the directory. Returns the archives.
///
/// The `object.json` check happens right before each object is archived, so an
/// object whose directory was already consumed by an earlier one is skipped.
pub async fn package_objects(
    ctx: &BuildContext,
    objects: &[ObjectRecord],
) -> Result<Vec<PathBuf>, PipelineError> {
    let archives = ctx
        .mode
        .run_each(objects, |object| async move {
            if !path_exists(&object.directory.join(OBJECT_MANIFEST)).await {
                tracing::debug!("{} has no {OBJECT_MANIFEST}, skipping", object.id);
                return Ok(None);
            }
            package_object(ctx, object).await.map(Some)
        })
        .await?;
    Ok(archives.into_iter().flatten().collect())
}

pub async fn package_object(
    ctx: &BuildContext,
    object: &ObjectRecord,
) -> Result<PathBuf, PipelineError> {
    let name = parkobj_file_name(&object.id);
    tracing::info!("Creating {name}");

    let dir = &object.directory;
    let contents = scan(dir, ScanOptions::default().files().directories()).await?;
    let output = Path::new("..").join(&name);
    let archive = create_archive(
        &ctx.runner,
        &ctx.tools.archiver,
        dir,
        &output,
        &contents,
        ArchiveOptions { recurse: true },
    )
    .await?;
    remove_path(dir, ctx.options.verbose).await?;

    Ok(dir.parent().map(|p| p.join(&name)).unwrap_or(archive))
}

/// Archive every top-level directory left in the staged root into
/// `objects.zip` and delete those directories.
///
/// Returns `None` without running the archiver when no directories remain.
pub async fn package_remaining(ctx: &BuildContext) -> Result<Option<PathBuf>, PipelineError> {
    tracing::info!("Creating {AGGREGATE_ARCHIVE}");

    let root = ctx.layout.staging_root();
    let directories = scan(&root, ScanOptions::default().directories()).await?;
    if directories.is_empty() {
        tracing::info!("nothing left to put in {AGGREGATE_ARCHIVE}");
        return Ok(None);
    }

    let archive = create_archive(
        &ctx.runner,
        &ctx.tools.archiver,
        &root,
        Path::new(AGGREGATE_ARCHIVE),
        &directories,
        ArchiveOptions { recurse: true },
    )
    .await?;
    for dir in &directories {
        remove_path(&root.join(dir), ctx.options.verbose).await?;
    }
    Ok(Some(archive))
}
