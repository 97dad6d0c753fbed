//! Asynchronous directory listing.
//!
//! Every directory is listed by its own task; the stat calls for its entries
//! run concurrently inside that task. A [`JoinSet`] tracks outstanding
//! listings, so the scan finishes exactly when every listing launched so far,
//! including those spawned for subdirectories, has settled. Completion order
//! is arbitrary; the returned paths are sorted.
//!
//! An entry whose stat call fails is left out of the result. A directory that
//! cannot be listed fails the scan.

use std::path::PathBuf;

use futures::future::join_all;
use tokio::task::JoinSet;

use crate::error::{io_err, PipelineError};

/// What a scan reports and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub include_files: bool,
    pub include_directories: bool,
    pub recurse: bool,
    /// Report `root`-prefixed paths instead of paths relative to `root`.
    pub use_full_path: bool,
}

impl ScanOptions {
    pub fn files(mut self) -> Self {
        self.include_files = true;
        self
    }

    pub fn directories(mut self) -> Self {
        self.include_directories = true;
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recurse = true;
        self
    }

    pub fn full_paths(mut self) -> Self {
        self.use_full_path = true;
        self
    }
}

#[derive(Debug)]
struct Entry {
    full: PathBuf,
    relative: PathBuf,
    is_dir: bool,
}

/// List the contents of `root` according to `options`, sorted byte-wise.
pub async fn scan(
    root: impl Into<PathBuf>,
    options: ScanOptions,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut pending = JoinSet::new();
    pending.spawn(list_directory(root.into(), PathBuf::new()));

    let mut results = Vec::new();
    while let Some(joined) = pending.join_next().await {
        for entry in joined?? {
            if entry.is_dir && options.recurse {
                pending.spawn(list_directory(entry.full.clone(), entry.relative.clone()));
            }
            let wanted = if entry.is_dir {
                options.include_directories
            } else {
                options.include_files
            };
            if wanted {
                results.push(if options.use_full_path {
                    entry.full
                } else {
                    entry.relative
                });
            }
        }
    }

    results.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(results)
}

async fn list_directory(full: PathBuf, relative: PathBuf) -> Result<Vec<Entry>, PipelineError> {
    let mut reader = tokio::fs::read_dir(&full)
        .await
        .map_err(|e| io_err(&full, e))?;
    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(|e| io_err(&full, e))? {
        names.push(entry.file_name());
    }

    let stats = names.into_iter().map(|name| {
        let entry_full = full.join(&name);
        let entry_relative = relative.join(&name);
        async move {
            match tokio::fs::metadata(&entry_full).await {
                Ok(meta) => Some(Entry {
                    is_dir: meta.is_dir(),
                    full: entry_full,
                    relative: entry_relative,
                }),
                Err(err) => {
                    tracing::debug!("skipping {}: {err}", entry_full.display());
                    None
                }
            }
        }
    });
    Ok(join_all(stats).await.into_iter().flatten().collect())
}
