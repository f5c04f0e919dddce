use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ApkBuildError, Result};
use crate::platform::Platform;

/// Name of the project-local configuration file.
pub const LOCAL_CONFIG_FILE: &str = "apkbuild.toml";

/// Represents the complete configuration for apk-autobuild.
///
/// Every table is optional; missing tables and fields fall back to the
/// values the tool has always used.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub update: UpdateConfig,

    #[serde(default)]
    pub dependencies: DependenciesConfig,

    #[serde(default)]
    pub build_tool: BuildToolConfig,

    #[serde(default)]
    pub device_bridge: DeviceBridgeConfig,

    #[serde(default)]
    pub defaults: PromptDefaults,

    #[serde(default)]
    pub log: LogConfig,
}

/// Where the self-update check looks for a newer release.
///
/// With no `manifest_url` the update phase is skipped.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct UpdateConfig {
    #[serde(default)]
    pub manifest_url: Option<String>,

    #[serde(default)]
    pub binary_url: Option<String>,
}

/// Package-manager command sets, one per platform family.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DependenciesConfig {
    /// Used for both Linux and WSL.
    #[serde(default = "PackageManagerConfig::apt")]
    pub linux: PackageManagerConfig,

    #[serde(default = "PackageManagerConfig::homebrew")]
    pub mac: PackageManagerConfig,
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        DependenciesConfig {
            linux: PackageManagerConfig::apt(),
            mac: PackageManagerConfig::homebrew(),
        }
    }
}

impl DependenciesConfig {
    /// Returns the command set used on the given platform.
    pub fn for_platform(&self, platform: Platform) -> &PackageManagerConfig {
        match platform {
            Platform::Linux | Platform::Wsl => &self.linux,
            Platform::Mac => &self.mac,
        }
    }
}

/// A package manager described as argv vectors.
///
/// `install` is run with `packages` appended.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackageManagerConfig {
    pub label: String,
    pub update: Vec<String>,
    pub install: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl PackageManagerConfig {
    pub fn apt() -> Self {
        PackageManagerConfig {
            label: "apt".to_string(),
            update: strings(&["sudo", "apt", "update"]),
            install: strings(&["sudo", "apt", "install", "-y"]),
            packages: strings(&["python3-pip", "openjdk-8-jdk", "git", "unzip"]),
        }
    }

    pub fn homebrew() -> Self {
        PackageManagerConfig {
            label: "Homebrew".to_string(),
            update: strings(&["brew", "update"]),
            install: strings(&["brew", "install"]),
            packages: strings(&["python3", "git", "openjdk"]),
        }
    }
}

fn default_build_program() -> String {
    "buildozer".to_string()
}

fn default_installer() -> Vec<String> {
    strings(&["pip3", "install", "--user", "--upgrade", "buildozer"])
}

fn default_spec_file() -> PathBuf {
    PathBuf::from("buildozer.spec")
}

fn default_target() -> Vec<String> {
    strings(&["android", "debug"])
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("bin")
}

fn default_artifact_version() -> String {
    "0.1".to_string()
}

/// Settings for the packaging tool (Buildozer).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildToolConfig {
    #[serde(default = "default_build_program")]
    pub program: String,

    /// Command used to install the tool when it is not on PATH.
    #[serde(default = "default_installer")]
    pub installer: Vec<String>,

    #[serde(default = "default_spec_file")]
    pub spec_file: PathBuf,

    #[serde(default = "default_target")]
    pub target: Vec<String>,

    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Version component of the expected artifact name.
    #[serde(default = "default_artifact_version")]
    pub artifact_version: String,
}

impl Default for BuildToolConfig {
    fn default() -> Self {
        BuildToolConfig {
            program: default_build_program(),
            installer: default_installer(),
            spec_file: default_spec_file(),
            target: default_target(),
            artifact_dir: default_artifact_dir(),
            artifact_version: default_artifact_version(),
        }
    }
}

fn default_bridge_program() -> String {
    "adb".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeviceBridgeConfig {
    #[serde(default = "default_bridge_program")]
    pub program: String,
}

impl Default for DeviceBridgeConfig {
    fn default() -> Self {
        DeviceBridgeConfig {
            program: default_bridge_program(),
        }
    }
}

fn default_app_name() -> String {
    "hackGPT".to_string()
}

fn default_package_domain() -> String {
    "org.ethicalhacker".to_string()
}

fn default_main_file() -> String {
    "hackgpt.py".to_string()
}

fn default_dependencies() -> String {
    "colorama".to_string()
}

/// Values substituted when a prompt is answered with an empty line.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PromptDefaults {
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_package_domain")]
    pub package_domain: String,

    #[serde(default = "default_main_file")]
    pub main_file: String,

    #[serde(default = "default_dependencies")]
    pub dependencies: String,
}

impl Default for PromptDefaults {
    fn default() -> Self {
        PromptDefaults {
            app_name: default_app_name(),
            package_domain: default_package_domain(),
            main_file: default_main_file(),
            dependencies: default_dependencies(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            dir: default_log_dir(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `apkbuild.toml` in current directory
/// 3. `~/.config/.apkbuild.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(".apkbuild.toml");
        if user_config.exists() {
            user_config
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ApkBuildError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&config_str)
        .map_err(|e| ApkBuildError::config(format!("{}: {}", path.display(), e)))
}

/// Parses configuration text, validating argv vectors are non-empty.
pub fn parse_config(config_str: &str) -> std::result::Result<Config, String> {
    let config: Config = toml::from_str(config_str).map_err(|e| e.to_string())?;

    for (name, manager) in [
        ("dependencies.linux", &config.dependencies.linux),
        ("dependencies.mac", &config.dependencies.mac),
    ] {
        if manager.update.is_empty() || manager.install.is_empty() {
            return Err(format!("{} needs non-empty `update` and `install`", name));
        }
    }
    if config.build_tool.installer.is_empty() {
        return Err("build_tool.installer must not be empty".to_string());
    }

    Ok(config)
}
