//! parkobj: compile object image lists and package objects into archives.
//!
//! # Usage
//!
//! ```text
//! parkobj [--parallel] [--verbose]
//! ```
//!
//! Run from the directory holding `objects/`. The build stages a copy in
//! `artifacts/`, compiles raw image lists with `gxc`, and leaves
//! `artifacts/<id>.parkobj` files plus `artifacts/objects.zip`.
//!
//! `PARKOBJ_COMPILER` and `PARKOBJ_ARCHIVER` override the tool command lines;
//! `RUST_LOG` overrides the log filter.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use parkobj_core::{BuildOptions, Layout, ToolConfig};
use parkobj_pipeline::{BuildContext, BuildReport};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "parkobj",
    version,
    about = "Compile object images and package objects into .parkobj and objects.zip archives",
    long_about = None,
)]
struct Cli {
    /// Compile and package objects concurrently instead of one at a time.
    #[arg(long)]
    parallel: bool,

    /// Log every tool launch, copy, and delete.
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> BuildOptions {
        BuildOptions {
            parallel: self.parallel,
            verbose: self.verbose,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    match run(&cli) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<BuildReport> {
    let base = std::env::current_dir().context("could not determine working directory")?;
    let ctx = BuildContext::new(Layout::at(base), ToolConfig::from_env(), cli.options());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(parkobj_pipeline::run(&ctx))?)
}

fn init_tracing() {
    use std::io::IsTerminal;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

fn print_report(report: &BuildReport) {
    println!(
        "✓ {} objects ({} compiled, {} packaged as .parkobj)",
        report.discovered,
        report.reprocessed.len(),
        report.parkobjs.len()
    );
    for archive in &report.parkobjs {
        println!("  ✎  {}", archive.display());
    }
    match &report.aggregate {
        Some(archive) => println!("  ✎  {}", archive.display()),
        None => println!("  ·  nothing left for objects.zip"),
    }
}
