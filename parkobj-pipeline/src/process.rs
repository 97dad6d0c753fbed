//! Launching external tools.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use parkobj_core::Tool;

use crate::error::{io_err, PipelineError};

/// Runs external tools to completion and captures their output.
///
/// There is no timeout: a tool that never exits stalls the build.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    verbose: bool,
}

impl ProcessRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Run `tool` with `args` inside `cwd`.
    ///
    /// stdout and stderr are accumulated into one buffer in arrival order.
    /// Returns the captured text when the tool exits with status 0.
    pub async fn run<S: AsRef<OsStr>>(
        &self,
        tool: &Tool,
        args: &[S],
        cwd: &Path,
    ) -> Result<String, PipelineError> {
        if self.verbose {
            let words: Vec<String> = tool
                .leading_args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .chain(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
                .collect();
            tracing::info!(
                "Launching \"{} {}\" in \"{}\"",
                tool.program.display(),
                words.join(" "),
                cwd.display()
            );
        }

        let mut child = Command::new(&tool.program)
            .args(&tool.leading_args)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PipelineError::ToolNotFound { tool: tool.name() },
                _ => io_err(&tool.program, e),
            })?;

        let captured = Mutex::new(Vec::new());
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (out, err, status) = tokio::join!(
            drain(stdout, &captured),
            drain(stderr, &captured),
            child.wait()
        );
        out.map_err(|e| io_err(&tool.program, e))?;
        err.map_err(|e| io_err(&tool.program, e))?;
        let status = status.map_err(|e| io_err(&tool.program, e))?;

        let bytes = captured.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        let output = String::from_utf8_lossy(&bytes).into_owned();
        if !status.success() {
            return Err(PipelineError::ToolFailed {
                tool: tool.name(),
                output,
            });
        }
        Ok(output)
    }
}

async fn drain<R>(reader: Option<R>, sink: &Mutex<Vec<u8>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(());
    };
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        sink.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(&buf[..n]);
    }
}
