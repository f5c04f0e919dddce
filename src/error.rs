use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for apk-autobuild operations
#[derive(Error, Debug)]
pub enum ApkBuildError {
    #[error("Unsupported OS: {0}")]
    Platform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command `{program}` {reason}")]
    Command { program: String, reason: String },

    #[error("Installation failed: {0}")]
    Install(String),

    #[error("Build tool error: {0}")]
    BuildTool(String),

    #[error("buildozer.spec error: {0}")]
    Spec(String),

    #[error("APK not found at {path}")]
    ArtifactMissing { path: PathBuf, found: Vec<PathBuf> },

    #[error("Device bridge error: {0}")]
    DeviceBridge(String),

    #[error("Update failed: {0}")]
    Update(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in apk-autobuild
pub type Result<T> = std::result::Result<T, ApkBuildError>;

impl ApkBuildError {
    /// Create a platform error for an unrecognised kernel name
    pub fn platform(kernel: impl Into<String>) -> Self {
        ApkBuildError::Platform(kernel.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ApkBuildError::Config(msg.into())
    }

    /// Create a command error for a process that could not run or exited badly
    pub fn command(program: impl Into<String>, reason: impl Into<String>) -> Self {
        ApkBuildError::Command {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Create an installation error with context
    pub fn install(msg: impl Into<String>) -> Self {
        ApkBuildError::Install(msg.into())
    }

    /// Create a build tool error with context
    pub fn build_tool(msg: impl Into<String>) -> Self {
        ApkBuildError::BuildTool(msg.into())
    }

    /// Create a spec file error with context
    pub fn spec(msg: impl Into<String>) -> Self {
        ApkBuildError::Spec(msg.into())
    }

    /// Create a device bridge error with context
    pub fn device_bridge(msg: impl Into<String>) -> Self {
        ApkBuildError::DeviceBridge(msg.into())
    }

    /// Create an update error with context
    pub fn update(msg: impl Into<String>) -> Self {
        ApkBuildError::Update(msg.into())
    }
}
