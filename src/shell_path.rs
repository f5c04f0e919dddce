//! Keeping the user-local bin directory (where `pip --user` puts scripts)
//! on the search path.

use std::env;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ApkBuildError, Result};

/// Line appended to the shell startup file.
pub const EXPORT_LINE: &str = "export PATH=$PATH:$HOME/.local/bin";

/// `$HOME/.local/bin`
pub fn local_bin(home: &Path) -> PathBuf {
    home.join(".local").join("bin")
}

/// Whether `dir` is one of the entries of a PATH-style value.
pub fn path_contains(path_var: &OsString, dir: &Path) -> bool {
    env::split_paths(path_var).any(|entry| entry == dir)
}

/// Appends [`EXPORT_LINE`] to `rc_file` unless it already has it.
///
/// Returns whether the file was changed.
pub fn persist_export(rc_file: &Path) -> Result<bool> {
    let existing = match fs::read_to_string(rc_file) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    if existing.lines().any(|line| line.trim() == EXPORT_LINE) {
        return Ok(false);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(rc_file)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", EXPORT_LINE)?;
    Ok(true)
}

/// Outcome of [`ensure_local_bin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathChange {
    AlreadyPresent,
    /// The directory was added for this process; `persisted` tells whether the
    /// startup file was modified.
    Added { dir: PathBuf, persisted: bool },
}

/// Puts `$HOME/.local/bin` on this process's PATH and in `~/.bashrc`.
pub fn ensure_local_bin() -> Result<PathChange> {
    let home = dirs::home_dir()
        .ok_or_else(|| ApkBuildError::config("cannot determine the home directory"))?;
    let dir = local_bin(&home);
    let current = env::var_os("PATH").unwrap_or_default();

    if path_contains(&current, &dir) {
        return Ok(PathChange::AlreadyPresent);
    }

    let persisted = persist_export(&home.join(".bashrc"))?;

    let mut entries: Vec<PathBuf> = env::split_paths(&current).collect();
    entries.push(dir.clone());
    let joined = env::join_paths(entries)
        .map_err(|e| ApkBuildError::config(format!("cannot extend PATH: {}", e)))?;
    env::set_var("PATH", joined);

    Ok(PathChange::Added { dir, persisted })
}
