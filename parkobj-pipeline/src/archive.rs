//! Zip archive creation through the configured external archiver.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use parkobj_core::{Archiver, ArchiverFlavor};

use crate::error::PipelineError;
use crate::fsops::{path_exists, remove_path};
use crate::process::ProcessRunner;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Include the descendants of directory paths.
    pub recurse: bool,
}

/// Archiver arguments for `output` holding `paths`, both relative to the
/// archiver's working directory.
pub fn archiver_args(
    flavor: ArchiverFlavor,
    output: &Path,
    paths: &[PathBuf],
    options: ArchiveOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(paths.len() + 4);
    if flavor == ArchiverFlavor::SevenZip {
        args.push("a".into());
        args.push("-tzip".into());
    }
    if options.recurse {
        args.push("-r".into());
    }
    args.push(output.into());
    args.extend(paths.iter().map(|p| p.as_os_str().to_owned()));
    args
}

/// Archive `paths` (relative to `cwd`) into `output` (also relative to `cwd`).
///
/// An archive already present at the target is deleted first, so the result
/// holds exactly the given paths. Returns the archive's path.
pub async fn create_archive(
    runner: &ProcessRunner,
    archiver: &Archiver,
    cwd: &Path,
    output: &Path,
    paths: &[PathBuf],
    options: ArchiveOptions,
) -> Result<PathBuf, PipelineError> {
    let target = cwd.join(output);
    if path_exists(&target).await {
        remove_path(&target, runner.verbose()).await?;
    }

    let args = archiver_args(archiver.flavor, output, paths, options);
    match runner.run(&archiver.tool, &args, cwd).await {
        Ok(_) => Ok(target),
        Err(PipelineError::ToolFailed { tool, output }) => Err(PipelineError::ArchiveFailed {
            archive: target,
            tool,
            output,
        }),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use parkobj_core::Tool;
    use tempfile::TempDir;

    use super::*;

    fn strs(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn zip_arguments() {
        let paths = [PathBuf::from("foo"), PathBuf::from("bar")];
        let args = archiver_args(
            ArchiverFlavor::Zip,
            Path::new("objects.zip"),
            &paths,
            ArchiveOptions { recurse: true },
        );
        assert_eq!(strs(&args), ["-r", "objects.zip", "foo", "bar"]);
    }

    #[test]
    fn seven_zip_arguments() {
        let paths = [PathBuf::from("object.json")];
        let args = archiver_args(
            ArchiverFlavor::SevenZip,
            Path::new("../foo.parkobj"),
            &paths,
            ArchiveOptions::default(),
        );
        assert_eq!(strs(&args), ["a", "-tzip", "../foo.parkobj", "object.json"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn existing_archive_is_replaced() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("out.zip"), "stale").expect("write");
        // `sh -c <script> <$0> <$1>…`: append $1 (the output path) to itself.
        let archiver = Archiver::new(Tool::with_args("sh", ["-c", "echo \"$1\" >> \"$1\"", "zip"]));
        let target = create_archive(
            &ProcessRunner::default(),
            &archiver,
            dir.path(),
            Path::new("out.zip"),
            &[PathBuf::from("a")],
            ArchiveOptions::default(),
        )
        .await
        .expect("archive");
        assert_eq!(target, dir.path().join("out.zip"));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "out.zip\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn archiver_failure_is_archive_failed() {
        let dir = TempDir::new().expect("tempdir");
        let script = "echo 'zip error: Nothing to do!'; exit 12";
        let archiver = Archiver::new(Tool::with_args("sh", ["-c", script, "zip"]));
        let err = create_archive(
            &ProcessRunner::default(),
            &archiver,
            dir.path(),
            Path::new("out.zip"),
            &[],
            ArchiveOptions { recurse: true },
        )
        .await
        .unwrap_err();
        match err {
            PipelineError::ArchiveFailed { archive, output, .. } => {
                assert_eq!(archive, dir.path().join("out.zip"));
                assert!(output.contains("Nothing to do"));
            }
            other => panic!("expected ArchiveFailed, got {other:?}"),
        }
    }
}
