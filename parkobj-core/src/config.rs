//! Run configuration: which external tools to launch and how to schedule work.
//!
//! Nothing here reads ambient state on its own; [`ToolConfig::from_env`] is the
//! single place process environment is consulted, and the binary calls it once.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Overrides the image compiler command line (default `gxc`).
pub const COMPILER_ENV: &str = "PARKOBJ_COMPILER";
/// Overrides the archiver command line (default `zip`, or `7z` on Windows).
pub const ARCHIVER_ENV: &str = "PARKOBJ_ARCHIVER";

pub const DEFAULT_COMPILER: &str = "gxc";

/// An external executable plus any arguments that precede the per-call ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub program: PathBuf,
    pub leading_args: Vec<OsString>,
}

impl Tool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a whitespace-separated command line. Returns `None` when blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace();
        let program = words.next()?;
        Some(Self::with_args(program, words))
    }

    /// Name used in diagnostics.
    ///
    /// For an interpreter launched with a script (`sh /opt/gxc.sh`) this is the
    /// script's stem, otherwise the program as given.
    pub fn name(&self) -> String {
        let script = self
            .leading_args
            .first()
            .filter(|arg| !arg.to_string_lossy().starts_with('-'))
            .and_then(|arg| Path::new(arg).file_stem());
        match script {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => self.program.display().to_string(),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.program.display().fmt(f)
    }
}

/// Command-line dialect of the archiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiverFlavor {
    /// Info-ZIP `zip`: `zip [-r] <output> <paths…>`.
    Zip,
    /// 7-Zip: `7z a -tzip [-r] <output> <paths…>`.
    SevenZip,
}

impl ArchiverFlavor {
    pub fn for_program(program: &Path) -> Self {
        let stem = program
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match stem.as_str() {
            "7z" | "7za" | "7zr" => Self::SevenZip,
            _ => Self::Zip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archiver {
    pub tool: Tool,
    pub flavor: ArchiverFlavor,
}

impl Archiver {
    pub fn new(tool: Tool) -> Self {
        let flavor = ArchiverFlavor::for_program(&tool.program);
        Self { tool, flavor }
    }

    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::new(Tool::new("7z"))
        } else {
            Self::new(Tool::new("zip"))
        }
    }
}

/// External tools used by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub compiler: Tool,
    pub archiver: Archiver,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            compiler: Tool::new(DEFAULT_COMPILER),
            archiver: Archiver::platform_default(),
        }
    }
}

impl ToolConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve tools through `lookup`, falling back to the defaults for
    /// unset or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(tool) = lookup(COMPILER_ENV).as_deref().and_then(Tool::parse) {
            config.compiler = tool;
        }
        if let Some(tool) = lookup(ARCHIVER_ENV).as_deref().and_then(Tool::parse) {
            config.archiver = Archiver::new(tool);
        }
        config
    }
}

/// Process-wide switches, fixed for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Fan out reprocessing and per-object packaging instead of running them
    /// one object at a time.
    pub parallel: bool,
    /// Log every tool launch, copy, and delete.
    pub verbose: bool,
}
