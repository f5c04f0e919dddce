//! External collaborators.
//!
//! Everything the orchestrator delegates to another program sits behind one of
//! the traits here:
//!
//! - [PackageManager]: the platform package manager (apt, Homebrew)
//! - [BuildTool]: the packaging tool (Buildozer)
//! - [DeviceBridge]: the device installer (adb)
//!
//! [system] holds the process-backed implementations and [mock] the in-memory
//! ones used by tests. Code driving a build should depend on the traits.

pub mod command;
pub mod mock;
pub mod system;

pub use mock::{MockBuildTool, MockDeviceBridge, MockPackageManager};
pub use system::{Adb, Buildozer, CommandPackageManager};

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Installs system packages.
pub trait PackageManager {
    /// Human-readable name used in messages, e.g. "apt".
    fn label(&self) -> &str;

    /// Refreshes the package index.
    fn update(&self) -> Result<()>;

    /// Installs the given packages.
    fn install(&self, packages: &[String]) -> Result<()>;
}

/// Packages a Python project into an installable bundle.
pub trait BuildTool {
    /// Whether the tool's executable is reachable.
    fn is_installed(&self) -> bool;

    /// Installs the tool.
    fn install(&self) -> Result<()>;

    /// Whether the project configuration file already exists.
    fn is_initialized(&self) -> bool;

    /// Creates the project configuration file.
    fn init(&self) -> Result<()>;

    /// Path of the configuration file `init` creates.
    fn spec_path(&self) -> PathBuf;

    /// Builds `target` and returns where the artifact is expected.
    ///
    /// A successful return does not mean the artifact exists; callers must
    /// check.
    fn build(&self, target: &[String], app_name: &str) -> Result<PathBuf>;
}

/// Installs a built bundle onto a connected device.
pub trait DeviceBridge {
    fn is_available(&self) -> bool;

    fn install(&self, artifact: &Path) -> Result<()>;
}
