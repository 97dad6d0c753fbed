//! File-system helpers shared by the stages.

use std::path::Path;

use parkobj_core::types::to_pretty_json;
use parkobj_core::ObjectRecord;
use serde_json::Value;

use crate::error::{io_err, PipelineError};
use crate::scanner::{scan, ScanOptions};

pub async fn path_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Delete a file or a whole directory tree. A missing path is not an error.
pub async fn remove_path(path: &Path, verbose: bool) -> Result<(), PipelineError> {
    if verbose {
        tracing::info!("Deleting {}", path.display());
    }
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_err(path, e)),
    };
    let removed = if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match removed {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_err(path, e)),
        _ => Ok(()),
    }
}

/// Copy the tree under `src` into `dst`, creating `dst` as needed.
pub async fn copy_tree(src: &Path, dst: &Path, verbose: bool) -> Result<(), PipelineError> {
    if verbose {
        tracing::info!("Copying {} to {}", src.display(), dst.display());
    }
    // Listing the source first also surfaces a missing `src` as an I/O error.
    let directories = scan(src, ScanOptions::default().directories().recursive()).await?;
    tokio::fs::create_dir_all(dst)
        .await
        .map_err(|e| io_err(dst, e))?;
    for dir in &directories {
        let target = dst.join(dir);
        tokio::fs::create_dir_all(&target)
            .await
            .map_err(|e| io_err(&target, e))?;
    }
    for file in scan(src, ScanOptions::default().files().recursive()).await? {
        let from = src.join(&file);
        tokio::fs::copy(&from, dst.join(&file))
            .await
            .map_err(|e| io_err(&from, e))?;
    }
    Ok(())
}

pub async fn read_manifest(path: &Path) -> Result<ObjectRecord, PipelineError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_err(path, e))?;
    Ok(ObjectRecord::from_manifest_str(path, &text)?)
}

/// Write `value` as four-space indented JSON with a trailing newline.
pub async fn write_json(path: &Path, value: &Value) -> Result<(), PipelineError> {
    let text = to_pretty_json(value)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| io_err(path, e))
}

pub async fn write_manifest(path: &Path, object: &ObjectRecord) -> Result<(), PipelineError> {
    let text = object.to_manifest_json()?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| io_err(path, e))
}
