//! Finding object manifests in the staged tree.

use std::ffi::OsStr;
use std::path::Path;

use parkobj_core::layout::is_manifest_file_name;
use parkobj_core::ObjectRecord;

use crate::error::PipelineError;
use crate::fsops::read_manifest;
use crate::scanner::{scan, ScanOptions};

/// Load every `<name>.<variant>.json` manifest under `root`, in sorted path order.
pub async fn discover_objects(root: &Path) -> Result<Vec<ObjectRecord>, PipelineError> {
    let files = scan(root, ScanOptions::default().files().recursive().full_paths()).await?;
    let mut objects = Vec::new();
    for file in files.iter().filter(|f| {
        f.file_name()
            .and_then(OsStr::to_str)
            .is_some_and(is_manifest_file_name)
    }) {
        objects.push(read_manifest(file).await?);
    }
    tracing::debug!("discovered {} objects under {}", objects.len(), root.display());
    Ok(objects)
}
