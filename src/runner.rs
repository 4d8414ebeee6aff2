use std::process::Command;

use anyhow::{Context, Result};
use log::{debug, warn};

// ---------------------------------------------------------------------------
// External build + run invocation
// ---------------------------------------------------------------------------

/// Which numeric representation the instrumented program is compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    FixedPoint,
    FloatingPoint,
}

impl BuildKind {
    fn make_invocation(self) -> &'static str {
        match self {
            BuildKind::FixedPoint => "make -s clean; make -s FIXED_POINT=1",
            BuildKind::FloatingPoint => "make -s clean; make -s",
        }
    }
}

/// Clean and rebuild the program under test in the given configuration.
///
/// Blocks until make finishes. A successful rebuild leaves a fresh log at
/// the log path once the program is next run.
pub fn rebuild(kind: BuildKind) -> Result<()> {
    shell(kind.make_invocation())
}

/// Run the user-supplied command line for the instrumented program,
/// blocking until it exits.
pub fn run(command: &str) -> Result<()> {
    shell(command)
}

/// Run one command line through the shell.
///
/// Spawn failure is an error; a non-zero exit status only gets a warning.
/// The harness never interprets the child's status beyond that — a broken
/// build or run surfaces as a stale or missing log downstream.
fn shell(command: &str) -> Result<()> {
    debug!("running `{command}`");
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .with_context(|| format!("spawning `{command}`"))?;
    if !status.success() {
        warn!("`{command}` exited with {status}");
    }
    Ok(())
}
