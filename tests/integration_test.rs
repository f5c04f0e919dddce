// tests/integration_test.rs
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_apk-autobuild");

fn log_files(dir: &Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("build_log_") && n.ends_with(".log"))
        })
        .collect()
}

#[test]
fn test_help() {
    let output = Command::new(BIN)
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("apk-autobuild"));
    assert!(stdout.contains("--skip-update"));
}

#[test]
fn test_version() {
    let output = Command::new(BIN)
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_bad_config_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.toml");
    fs::write(&config, "[log\n").unwrap();

    let output = Command::new(BIN)
        .args(["--config", config.to_str().unwrap(), "--skip-update"])
        .current_dir(dir.path())
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
}

#[test]
fn test_unknown_flag_exits_one() {
    let dir = TempDir::new().unwrap();

    let output = Command::new(BIN)
        .arg("--no-such-flag")
        .current_dir(dir.path())
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("--no-such-flag"));
    assert!(log_files(dir.path()).is_empty());
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_failed_dependency_update_is_fatal_and_logged() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("apkbuild.toml");
    fs::write(
        &config,
        r#"
[dependencies.linux]
label = "apt"
update = ["false"]
install = ["true"]

[dependencies.mac]
label = "Homebrew"
update = ["false"]
install = ["true"]
"#,
    )
    .unwrap();

    let output = Command::new(BIN)
        .args(["--config", config.to_str().unwrap(), "--skip-update"])
        .current_dir(dir.path())
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to update package list"),
        "stderr was: {}",
        stderr
    );

    let logs = log_files(dir.path());
    assert_eq!(logs.len(), 1, "expected exactly one run log");
    let log = fs::read_to_string(&logs[0]).unwrap();
    assert!(log.contains("Detected OS"));
    assert!(log.contains("Error: Failed to update package list"));
    assert!(!log.contains("Building the APK"));
    assert!(!dir.path().join("buildozer.spec").exists());
}
