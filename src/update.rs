//! Self-update.
//!
//! A release is described by a small manifest served over HTTP:
//!
//! ```text
//! version = "1.1.0"
//! url = "https://example.com/apk-autobuild-1.1.0"
//! sha256 = "<64 hex digits>"
//! ```
//!
//! Only `version` is required. Any difference from the running version counts
//! as an update; there is no ordering between versions.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::config::UpdateConfig;
use crate::error::{ApkBuildError, Result};
use crate::ui;

/// Version marker compiled into this binary.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where manifests and release binaries come from.
pub trait UpdateSource {
    fn fetch_manifest(&self) -> Result<String>;

    fn fetch_binary(&self, url: &str) -> Result<Vec<u8>>;

    /// Download URL used when the manifest does not name one.
    fn default_binary_url(&self) -> Option<String>;
}

/// Update source over plain HTTP(S) GET requests.
pub struct HttpUpdateSource {
    manifest_url: String,
    binary_url: Option<String>,
}

impl HttpUpdateSource {
    /// Returns `None` when no manifest URL is configured.
    pub fn from_config(config: &UpdateConfig) -> Option<Self> {
        let manifest_url = config.manifest_url.clone()?;
        Some(HttpUpdateSource {
            manifest_url,
            binary_url: config.binary_url.clone(),
        })
    }
}

impl UpdateSource for HttpUpdateSource {
    fn fetch_manifest(&self) -> Result<String> {
        let response = reqwest::blocking::get(&self.manifest_url)?.error_for_status()?;
        Ok(response.text()?)
    }

    fn fetch_binary(&self, url: &str) -> Result<Vec<u8>> {
        let response = reqwest::blocking::get(url)?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    fn default_binary_url(&self) -> Option<String> {
        self.binary_url.clone()
    }
}

/// Parsed release manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub version: String,
    pub url: Option<String>,
    pub sha256: Option<String>,
}

/// First `key = "value"` assignment in `text`.
fn extract_token(text: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"(?m)^\s*{}\s*=\s*"([^"]*)""#, key);
    let re = regex::Regex::new(&pattern).ok()?;
    let value = re.captures(text)?.get(1)?.as_str().trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Extracts the manifest fields, or `None` when no version marker is present.
///
/// `SCRIPT_VERSION="..."` is accepted as an alias for `version`, which is the
/// marker older releases published.
pub fn parse_manifest(text: &str) -> Option<Manifest> {
    let version = extract_token(text, "(?:version|SCRIPT_VERSION)")?;
    Some(Manifest {
        version,
        url: extract_token(text, "url"),
        sha256: extract_token(text, "sha256").map(|s| s.to_lowercase()),
    })
}

/// Result of comparing the remote manifest with the running version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    UpToDate,
    Available(Manifest),
    /// The check could not be completed; the run continues.
    Unavailable(String),
}

/// Fetches the manifest and compares versions. Never fails.
pub fn check<S: UpdateSource>(source: &S, current: &str) -> UpdateCheck {
    let text = match source.fetch_manifest() {
        Ok(text) => text,
        Err(e) => return UpdateCheck::Unavailable(e.to_string()),
    };
    match parse_manifest(&text) {
        Some(manifest) if manifest.version == current => UpdateCheck::UpToDate,
        Some(manifest) => UpdateCheck::Available(manifest),
        None => UpdateCheck::Unavailable("manifest has no version marker".to_string()),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Downloads the release and swaps it over `target`.
///
/// The new binary is written to a temporary file beside `target`, checked
/// against the manifest digest when one is given, then renamed into place.
/// `target` is untouched on any failure.
pub fn apply<S: UpdateSource>(source: &S, manifest: &Manifest, target: &Path) -> Result<()> {
    let url = manifest
        .url
        .clone()
        .or_else(|| source.default_binary_url())
        .ok_or_else(|| ApkBuildError::update("no download URL for the new version"))?;
    let bytes = source.fetch_binary(&url)?;
    if bytes.is_empty() {
        return Err(ApkBuildError::update(format!("{} returned an empty file", url)));
    }

    if let Some(expected) = &manifest.sha256 {
        let actual = sha256_hex(&bytes);
        if &actual != expected {
            return Err(ApkBuildError::update(format!(
                "checksum mismatch: expected {}, got {}",
                expected, actual
            )));
        }
    }

    let dir = target
        .parent()
        .ok_or_else(|| ApkBuildError::update(format!("{} has no parent", target.display())))?;
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&bytes)?;
    staged.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(staged.path(), std::fs::Permissions::from_mode(0o755))?;
    }

    staged
        .persist(target)
        .map_err(|e| ApkBuildError::update(format!("cannot replace {}: {}", target.display(), e)))?;
    Ok(())
}

/// Command that re-runs `exe` with the given arguments (program name excluded).
pub fn restart_command(exe: &Path, args: &[OsString]) -> Command {
    let mut cmd = Command::new(exe);
    cmd.args(args);
    cmd
}

/// Replaces the current process with `exe`. Only returns on failure.
pub fn restart(exe: &Path, args: &[OsString]) -> Result<()> {
    let mut cmd = restart_command(exe, args);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = cmd.exec();
        return Err(ApkBuildError::update(format!(
            "cannot restart {}: {}",
            exe.display(),
            err
        )));
    }

    #[cfg(not(unix))]
    {
        let status = cmd.status()?;
        std::process::exit(status.code().unwrap_or(1));
    }
}

/// Runs the whole update phase.
///
/// Check failures are reported and ignored. When a different version is
/// published it is installed over `exe` and the process restarts with `args`.
pub fn self_update<S: UpdateSource>(source: &S, exe: &Path, args: &[OsString]) -> Result<()> {
    ui::display_status("Checking for updates...");

    match check(source, CURRENT_VERSION) {
        UpdateCheck::UpToDate => {
            ui::display_status(&format!(
                "You are using the latest version: {}.",
                CURRENT_VERSION
            ));
            Ok(())
        }
        UpdateCheck::Unavailable(reason) => {
            ui::display_warning(&format!(
                "Failed to check for updates ({}). Continuing with the current version.",
                reason
            ));
            Ok(())
        }
        UpdateCheck::Available(manifest) => {
            ui::display_status(&format!(
                "New version available: {}. Updating...",
                manifest.version
            ));
            apply(source, &manifest, exe)
                .map_err(|e| ApkBuildError::update(format!("Failed to apply the update: {}", e)))?;
            ui::display_success("Update applied successfully. Restarting...");
            restart(exe, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    struct FakeSource {
        manifest: Option<String>,
        binary: Vec<u8>,
        default_url: Option<String>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new(manifest: Option<&str>, binary: &[u8]) -> Self {
            FakeSource {
                manifest: manifest.map(str::to_string),
                binary: binary.to_vec(),
                default_url: Some("https://example.com/default".to_string()),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl UpdateSource for FakeSource {
        fn fetch_manifest(&self) -> Result<String> {
            self.manifest
                .clone()
                .ok_or_else(|| ApkBuildError::update("connection refused"))
        }

        fn fetch_binary(&self, url: &str) -> Result<Vec<u8>> {
            self.requested.borrow_mut().push(url.to_string());
            Ok(self.binary.clone())
        }

        fn default_binary_url(&self) -> Option<String> {
            self.default_url.clone()
        }
    }

    #[test]
    fn test_parse_manifest_fields() {
        let manifest = parse_manifest(
            "# release\nversion = \"1.2.0\"\nurl = \"https://example.com/bin\"\nsha256 = \"ABCD\"\n",
        )
        .unwrap();
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.url.as_deref(), Some("https://example.com/bin"));
        assert_eq!(manifest.sha256.as_deref(), Some("abcd"));
    }

    #[test]
    fn test_parse_manifest_accepts_script_marker() {
        let manifest = parse_manifest("#!/bin/bash\nSCRIPT_VERSION=\"1.0.1\"\n").unwrap();
        assert_eq!(manifest.version, "1.0.1");
        assert_eq!(manifest.url, None);
    }

    #[test]
    fn test_parse_manifest_first_marker_wins() {
        let manifest = parse_manifest("version = \"2\"\nversion = \"3\"\n").unwrap();
        assert_eq!(manifest.version, "2");
    }

    #[test]
    fn test_parse_manifest_without_marker() {
        assert!(parse_manifest("<html>Not Found</html>").is_none());
        assert!(parse_manifest("version = \"\"").is_none());
    }

    #[test]
    fn test_check_equal_version_is_up_to_date() {
        let source = FakeSource::new(Some("version = \"1.0.0\""), b"");
        assert_eq!(check(&source, "1.0.0"), UpdateCheck::UpToDate);
    }

    #[test]
    fn test_check_any_difference_is_available() {
        let source = FakeSource::new(Some("version = \"0.9.0\""), b"");
        assert!(matches!(check(&source, "1.0.0"), UpdateCheck::Available(m) if m.version == "0.9.0"));
    }

    #[test]
    fn test_check_fetch_failure_is_not_fatal() {
        let source = FakeSource::new(None, b"");
        assert!(matches!(check(&source, "1.0.0"), UpdateCheck::Unavailable(_)));
    }

    #[test]
    fn test_self_update_up_to_date_leaves_binary_alone() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("apk-autobuild");
        fs::write(&exe, b"current").unwrap();

        let manifest = format!("version = \"{}\"", CURRENT_VERSION);
        let source = FakeSource::new(Some(&manifest), b"new");
        self_update(&source, &exe, &[]).unwrap();

        assert_eq!(fs::read(&exe).unwrap(), b"current");
        assert!(source.requested.borrow().is_empty());
    }

    #[test]
    fn test_self_update_without_download_url_fails() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("apk-autobuild");
        fs::write(&exe, b"current").unwrap();

        let mut source = FakeSource::new(Some("version = \"0.0.1-other\""), b"new");
        source.default_url = None;
        let err = self_update(&source, &exe, &[]).unwrap_err();

        assert!(matches!(err, ApkBuildError::Update(_)));
        assert!(err.to_string().contains("no download URL"));
        assert_eq!(fs::read(&exe).unwrap(), b"current");
        assert!(source.requested.borrow().is_empty());
    }

    #[test]
    fn test_self_update_checksum_mismatch_fails() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("apk-autobuild");
        fs::write(&exe, b"current").unwrap();

        let manifest = format!(
            "version = \"0.0.1-other\"\nsha256 = \"{}\"\n",
            sha256_hex(b"genuine")
        );
        let source = FakeSource::new(Some(&manifest), b"tampered");
        let err = self_update(&source, &exe, &[]).unwrap_err();

        assert!(err.to_string().contains("Failed to apply the update"));
        assert!(err.to_string().contains("checksum mismatch"));
        assert_eq!(fs::read(&exe).unwrap(), b"current");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_apply_replaces_target() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("apk-autobuild");
        fs::write(&exe, b"old").unwrap();

        let source = FakeSource::new(None, b"new build");
        let manifest = Manifest {
            version: "2.0.0".to_string(),
            url: None,
            sha256: Some(sha256_hex(b"new build")),
        };
        apply(&source, &manifest, &exe).unwrap();

        assert_eq!(fs::read(&exe).unwrap(), b"new build");
        assert_eq!(
            *source.requested.borrow(),
            vec!["https://example.com/default".to_string()]
        );
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&exe).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_apply_checksum_mismatch_keeps_target() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("apk-autobuild");
        fs::write(&exe, b"old").unwrap();

        let source = FakeSource::new(None, b"tampered");
        let manifest = Manifest {
            version: "2.0.0".to_string(),
            url: Some("https://example.com/2.0.0".to_string()),
            sha256: Some(sha256_hex(b"genuine")),
        };
        let err = apply(&source, &manifest, &exe).unwrap_err();

        assert!(err.to_string().contains("checksum mismatch"));
        assert_eq!(fs::read(&exe).unwrap(), b"old");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_apply_rejects_empty_download() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("apk-autobuild");
        fs::write(&exe, b"old").unwrap();

        let source = FakeSource::new(None, b"");
        let manifest = Manifest {
            version: "2.0.0".to_string(),
            url: None,
            sha256: None,
        };
        assert!(apply(&source, &manifest, &exe).is_err());
        assert_eq!(fs::read(&exe).unwrap(), b"old");
    }

    #[test]
    fn test_restart_command_keeps_arguments() {
        let args = vec![OsString::from("--config"), OsString::from("my build.toml")];
        let cmd = restart_command(Path::new("/usr/local/bin/apk-autobuild"), &args);

        assert_eq!(cmd.get_program(), "/usr/local/bin/apk-autobuild");
        let passed: Vec<_> = cmd.get_args().collect();
        assert_eq!(passed, vec!["--config", "my build.toml"]);
    }
}
