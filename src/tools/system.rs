use std::path::{Path, PathBuf};

use crate::artifact;
use crate::config::{BuildToolConfig, DeviceBridgeConfig, PackageManagerConfig};
use crate::error::{ApkBuildError, Result};
use crate::logging::RunLog;
use crate::tools::command::{find_program, from_argv, run_inherited, run_logged};
use crate::tools::{BuildTool, DeviceBridge, PackageManager};

/// Package manager driven by configured argv vectors.
pub struct CommandPackageManager {
    config: PackageManagerConfig,
}

impl CommandPackageManager {
    pub fn new(config: PackageManagerConfig) -> Self {
        CommandPackageManager { config }
    }
}

impl PackageManager for CommandPackageManager {
    fn label(&self) -> &str {
        &self.config.label
    }

    fn update(&self) -> Result<()> {
        run_inherited(&mut from_argv(&self.config.update)?)
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        let mut cmd = from_argv(&self.config.install)?;
        cmd.args(packages);
        run_inherited(&mut cmd)
    }
}

/// Buildozer, run from a project directory.
pub struct Buildozer {
    config: BuildToolConfig,
    project_dir: PathBuf,
    log: RunLog,
}

impl Buildozer {
    pub fn new(config: BuildToolConfig, project_dir: impl Into<PathBuf>, log: RunLog) -> Self {
        Buildozer {
            config,
            project_dir: project_dir.into(),
            log,
        }
    }
}

impl BuildTool for Buildozer {
    fn is_installed(&self) -> bool {
        find_program(&self.config.program).is_some()
    }

    fn install(&self) -> Result<()> {
        run_inherited(&mut from_argv(&self.config.installer)?)
    }

    fn is_initialized(&self) -> bool {
        self.spec_path().is_file()
    }

    fn init(&self) -> Result<()> {
        let mut cmd = from_argv(&[self.config.program.clone(), "init".to_string()])?;
        cmd.current_dir(&self.project_dir);
        run_inherited(&mut cmd)
    }

    fn spec_path(&self) -> PathBuf {
        self.project_dir.join(&self.config.spec_file)
    }

    fn build(&self, target: &[String], app_name: &str) -> Result<PathBuf> {
        let mut argv = vec![self.config.program.clone(), "-v".to_string()];
        argv.extend_from_slice(target);
        let mut cmd = from_argv(&argv)?;
        cmd.current_dir(&self.project_dir);

        run_logged(&mut cmd, self.log.append_handle()?).map_err(|e| {
            ApkBuildError::build_tool(format!(
                "APK build failed ({}). Check the log: {}",
                e,
                self.log.path().display()
            ))
        })?;

        Ok(artifact::expected_path(
            &self.project_dir.join(&self.config.artifact_dir),
            app_name,
            &self.config.artifact_version,
        ))
    }
}

/// Android Debug Bridge.
pub struct Adb {
    config: DeviceBridgeConfig,
}

impl Adb {
    pub fn new(config: DeviceBridgeConfig) -> Self {
        Adb { config }
    }
}

impl DeviceBridge for Adb {
    fn is_available(&self) -> bool {
        find_program(&self.config.program).is_some()
    }

    fn install(&self, artifact: &Path) -> Result<()> {
        let mut cmd = from_argv(&[self.config.program.clone(), "install".to_string()])?;
        cmd.arg(artifact);
        run_inherited(&mut cmd)
    }
}
