use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

use crate::error::{ApkBuildError, Result};

/// Builds a `Command` from an argv vector.
pub fn from_argv(argv: &[String]) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| ApkBuildError::config("empty command line"))?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

/// Human-readable rendering of a command for messages and logs.
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

fn check_status(cmd: &Command, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let reason = match status.code() {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    };
    Err(ApkBuildError::command(program_name(cmd), reason))
}

/// Runs a command attached to the terminal and waits for it.
///
/// Used for package managers, which may prompt for a password.
pub fn run_inherited(cmd: &mut Command) -> Result<()> {
    debug!("running: {}", describe(cmd));
    let status = cmd.status().map_err(|e| {
        ApkBuildError::command(program_name(cmd), format!("could not be started: {}", e))
    })?;
    check_status(cmd, status)
}

/// Runs a command with stdout and stderr appended to `log`.
pub fn run_logged(cmd: &mut Command, log: File) -> Result<()> {
    debug!("running (output to log): {}", describe(cmd));
    let stderr = log.try_clone()?;
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(stderr))
        .status()
        .map_err(|e| {
            ApkBuildError::command(program_name(cmd), format!("could not be started: {}", e))
        })?;
    check_status(cmd, status)
}

/// Locates an executable on PATH.
pub fn find_program(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
