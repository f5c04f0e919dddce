use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ApkBuildError, Result};
use crate::tools::{BuildTool, DeviceBridge, PackageManager};

/// Mock package manager recording every call
#[derive(Default)]
pub struct MockPackageManager {
    pub fail_update: bool,
    pub fail_install: bool,
    pub calls: RefCell<Vec<String>>,
}

impl PackageManager for MockPackageManager {
    fn label(&self) -> &str {
        "mock"
    }

    fn update(&self) -> Result<()> {
        self.calls.borrow_mut().push("update".to_string());
        if self.fail_update {
            return Err(ApkBuildError::command("mock", "exited with status 100"));
        }
        Ok(())
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("install {}", packages.join(" ")));
        if self.fail_install {
            return Err(ApkBuildError::command("mock", "exited with status 100"));
        }
        Ok(())
    }
}

/// Mock build tool working inside a real project directory.
///
/// `init` writes `init_template` to the spec path, and `build` optionally drops
/// an artifact at the conventional location.
pub struct MockBuildTool {
    pub project_dir: PathBuf,
    pub installed: bool,
    pub init_template: String,
    pub produce_artifact: bool,
    pub fail_build: bool,
    pub calls: RefCell<Vec<String>>,
}

impl MockBuildTool {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        MockBuildTool {
            project_dir: project_dir.into(),
            installed: true,
            init_template: "[app]\n".to_string(),
            produce_artifact: true,
            fail_build: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(name))
    }
}

impl BuildTool for MockBuildTool {
    fn is_installed(&self) -> bool {
        self.installed
    }

    fn install(&self) -> Result<()> {
        self.calls.borrow_mut().push("install".to_string());
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.spec_path().is_file()
    }

    fn init(&self) -> Result<()> {
        self.calls.borrow_mut().push("init".to_string());
        fs::write(self.spec_path(), &self.init_template)?;
        Ok(())
    }

    fn spec_path(&self) -> PathBuf {
        self.project_dir.join("buildozer.spec")
    }

    fn build(&self, target: &[String], app_name: &str) -> Result<PathBuf> {
        self.calls
            .borrow_mut()
            .push(format!("build {}", target.join(" ")));
        if self.fail_build {
            return Err(ApkBuildError::build_tool("APK build failed"));
        }

        let path = crate::artifact::expected_path(&self.project_dir.join("bin"), app_name, "0.1");
        if self.produce_artifact {
            fs::create_dir_all(self.project_dir.join("bin"))?;
            fs::write(&path, b"PK")?;
        }
        Ok(path)
    }
}

/// Mock device bridge recording installed artifacts
#[derive(Default)]
pub struct MockDeviceBridge {
    pub available: bool,
    pub fail_install: bool,
    pub installed: RefCell<Vec<PathBuf>>,
}

impl DeviceBridge for MockDeviceBridge {
    fn is_available(&self) -> bool {
        self.available
    }

    fn install(&self, artifact: &Path) -> Result<()> {
        if self.fail_install {
            return Err(ApkBuildError::command("adb", "exited with status 1"));
        }
        self.installed.borrow_mut().push(artifact.to_path_buf());
        Ok(())
    }
}
