//! Compiling raw image lists into containers.
//!
//! ## `reprocess_object` steps
//!
//! 1. Write the raw `images` array to `images.json` beside the manifest.
//! 2. `gxc build images.dat images.json`.
//! 3. `gxc details images.dat`, read `numEntries` from the report.
//! 4. Replace `images` with `$LGX:images.dat[0..<numEntries - 1>]`.
//! 5. Write the manifest to `object.json`.
//! 6. Delete `images.json` and the `images/` directory.
//!
//! Objects whose `images` are not raw are left alone, which makes a second
//! run over already-compiled manifests a no-op.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use parkobj_core::layout::{IMAGES_CONTAINER, IMAGES_DIR, IMAGES_MANIFEST, OBJECT_MANIFEST};
use parkobj_core::{ContainerReference, ImageSet, ObjectId, ObjectRecord};

use crate::error::PipelineError;
use crate::fsops::{remove_path, write_json, write_manifest};
use crate::pipeline::BuildContext;

static ENTRY_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"numEntries: ([0-9]+)").expect("static regex is valid"));

/// Entry count from a `gxc details` report.
pub fn parse_entry_count(report: &str) -> Option<u32> {
    ENTRY_COUNT_RE
        .captures(report)
        .and_then(|caps| caps[1].parse().ok())
}

/// Compile every object whose images are still raw. Returns the ids of the
/// objects that were compiled.
pub async fn reprocess_objects(
    ctx: &BuildContext,
    objects: &mut [ObjectRecord],
) -> Result<Vec<ObjectId>, PipelineError> {
    let targets = objects.iter_mut().filter(|o| o.images.needs_compilation());
    ctx.mode
        .run_each(targets, |object| async move {
            reprocess_object(ctx, object).await?;
            Ok::<_, PipelineError>(object.id.clone())
        })
        .await
}

/// Compile one object's raw images. Returns `false` without touching
/// anything when there is nothing to compile.
pub async fn reprocess_object(
    ctx: &BuildContext,
    object: &mut ObjectRecord,
) -> Result<bool, PipelineError> {
    let Some(entries) = object.images.raw_entries() else {
        return Ok(false);
    };
    tracing::info!("Reprocessing {}", object.id);

    let dir = object.directory.clone();
    write_json(&dir.join(IMAGES_MANIFEST), &Value::Array(entries.to_vec())).await?;

    let compiler = &ctx.tools.compiler;
    ctx.runner
        .run(compiler, &["build", IMAGES_CONTAINER, IMAGES_MANIFEST], &dir)
        .await?;
    let report = ctx
        .runner
        .run(compiler, &["details", IMAGES_CONTAINER], &dir)
        .await?;

    let container = dir.join(IMAGES_CONTAINER);
    let count = parse_entry_count(&report).ok_or_else(|| {
        PipelineError::ManifestIntrospectionFailed {
            container: container.clone(),
            reason: "details report has no numEntries field".to_string(),
        }
    })?;
    let reference = ContainerReference::for_entries(IMAGES_CONTAINER, count).ok_or_else(|| {
        PipelineError::ManifestIntrospectionFailed {
            container: container.clone(),
            reason: "container holds no entries".to_string(),
        }
    })?;
    tracing::debug!("{} compiled into {} entries", object.id, reference.entry_count());
    object.images = ImageSet::Compiled(reference);

    write_manifest(&dir.join(OBJECT_MANIFEST), object).await?;
    remove_path(&dir.join(IMAGES_MANIFEST), ctx.options.verbose).await?;
    remove_path(&dir.join(IMAGES_DIR), ctx.options.verbose).await?;
    Ok(true)
}
