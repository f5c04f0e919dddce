use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ApkBuildError, Result};

/// Path Buildozer is expected to write a debug APK to.
///
/// The naming convention is assumed, not queried from the tool; newer
/// Buildozer releases may add an architecture component.
pub fn expected_path(artifact_dir: &Path, app_name: &str, version: &str) -> PathBuf {
    artifact_dir.join(format!("{}-{}-debug.apk", app_name, version))
}

/// Confirms the artifact exists.
///
/// On failure the error carries whatever `.apk` files the directory does hold.
pub fn verify(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let found = path
        .parent()
        .map(apk_files_in)
        .unwrap_or_default();
    Err(ApkBuildError::ArtifactMissing {
        path: path.to_path_buf(),
        found,
    })
}

fn apk_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut apks: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "apk"))
        .collect();
    apks.sort();
    apks
}
