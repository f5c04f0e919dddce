//! Main workflow orchestration logic
//!
//! Runs the build phases after self-update and platform detection, in order,
//! stopping at the first failure. Every external program is reached through
//! the collaborator traits in [`crate::tools`], so the whole flow runs against
//! mocks in tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::buildspec;
use crate::config::{Config, PromptDefaults};
use crate::error::ApkBuildError;
use crate::platform::Platform;
use crate::settings::BuildSettings;
use crate::shell_path::{self, PathChange};
use crate::tools::{BuildTool, DeviceBridge, PackageManager};
use crate::{artifact, ui};

/// Inputs for the build workflow
///
/// Decoupled from [`Config`] so the workflow can be driven programmatically.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildWorkflowArgs {
    pub platform: Platform,

    /// System packages passed to the package manager.
    pub packages: Vec<String>,

    /// Build-tool target, e.g. `["android", "debug"]`.
    pub target: Vec<String>,

    pub defaults: PromptDefaults,

    /// Put `~/.local/bin` on PATH (and in `~/.bashrc`) after installing the
    /// build tool.
    pub manage_shell_path: bool,
}

impl BuildWorkflowArgs {
    pub fn from_config(config: &Config, platform: Platform) -> Self {
        BuildWorkflowArgs {
            platform,
            packages: config.dependencies.for_platform(platform).packages.clone(),
            target: config.build_tool.target.clone(),
            defaults: config.defaults.clone(),
            manage_shell_path: true,
        }
    }
}

/// Result of a successful build workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub settings: BuildSettings,

    /// The verified artifact.
    pub artifact: PathBuf,

    /// Whether the artifact was installed on a device.
    pub deployed: bool,
}

/// Refreshes the package index and installs the system packages.
pub fn install_dependencies<P: PackageManager>(
    package_manager: &P,
    platform: Platform,
    packages: &[String],
) -> Result<()> {
    let family = match platform {
        Platform::Linux | Platform::Wsl => "Linux/WSL",
        Platform::Mac => "macOS",
    };
    ui::display_status(&format!("Installing {} dependencies...", family));

    package_manager
        .update()
        .with_context(|| format!("Failed to update package list ({})", package_manager.label()))?;
    package_manager
        .install(packages)
        .context("Failed to install essential packages")?;
    Ok(())
}

/// Installs the build tool unless it is already on PATH.
pub fn ensure_build_tool<B: BuildTool>(build_tool: &B) -> Result<()> {
    if build_tool.is_installed() {
        ui::display_status("Buildozer is already installed.");
        return Ok(());
    }

    ui::display_status("Installing Buildozer...");
    build_tool.install().context("Failed to install Buildozer")?;
    Ok(())
}

fn ensure_shell_path() -> Result<()> {
    match shell_path::ensure_local_bin()? {
        PathChange::AlreadyPresent => debug!("~/.local/bin already on PATH"),
        PathChange::Added { dir, persisted } => {
            ui::display_status(&format!("Added {} to PATH.", dir.display()));
            if persisted {
                debug!("appended PATH export to ~/.bashrc");
            }
        }
    }
    Ok(())
}

/// Runs the build tool's init unless its spec file already exists.
pub fn initialize_project<B: BuildTool>(build_tool: &B) -> Result<()> {
    if build_tool.is_initialized() {
        ui::display_status("Buildozer already initialized.");
        return Ok(());
    }

    ui::display_status("Initializing Buildozer...");
    build_tool.init().context("Buildozer initialization failed")?;
    Ok(())
}

/// Writes the collected settings into the spec file.
pub fn configure_project<B: BuildTool>(build_tool: &B, settings: &BuildSettings) -> Result<()> {
    let spec_path = build_tool.spec_path();
    ui::display_status(&format!("Configuring {}...", spec_path.display()));

    for (key, edit) in buildspec::patch_file(&spec_path, settings)? {
        debug!("{}: {:?}", key, edit);
    }
    Ok(())
}

/// Builds and checks that the artifact really exists.
pub fn build_artifact<B: BuildTool>(
    build_tool: &B,
    target: &[String],
    settings: &BuildSettings,
) -> Result<PathBuf> {
    ui::display_status("Building the APK. This may take a while...");
    let expected = build_tool.build(target, &settings.app_name)?;

    let artifact = artifact::verify(&expected)?;
    ui::display_success("APK built successfully!");
    ui::display_status(&format!("You can find your APK here: {}", artifact.display()));
    Ok(artifact)
}

/// Offers to install the artifact on a connected device.
pub fn offer_deploy<D: DeviceBridge, R: BufRead, W: Write>(
    device_bridge: &D,
    artifact: &std::path::Path,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    let wanted = ui::confirm_action(
        input,
        output,
        "Would you like to install the APK on a connected device using adb?",
    )?;
    if !wanted {
        ui::display_status("Skipping APK installation.");
        return Ok(false);
    }

    if !device_bridge.is_available() {
        return Err(ApkBuildError::device_bridge("adb not found. Install adb and try again.").into());
    }

    ui::display_status("Installing APK on the connected device...");
    device_bridge
        .install(artifact)
        .context("Failed to install APK on the device")?;
    ui::display_success("APK installed successfully!");
    Ok(true)
}

/// Main build workflow
///
/// 1. Install system dependencies
/// 2. Install the build tool and fix up PATH
/// 3. Collect build settings
/// 4. Initialize and configure the project
/// 5. Build and verify the artifact
/// 6. Optionally deploy to a device
pub fn run_build_workflow<P, B, D, R, W>(
    args: &BuildWorkflowArgs,
    package_manager: &P,
    build_tool: &B,
    device_bridge: &D,
    input: &mut R,
    output: &mut W,
) -> Result<WorkflowResult>
where
    P: PackageManager,
    B: BuildTool,
    D: DeviceBridge,
    R: BufRead,
    W: Write,
{
    install_dependencies(package_manager, args.platform, &args.packages)?;

    ensure_build_tool(build_tool)?;
    if args.manage_shell_path {
        ensure_shell_path()?;
    }

    ui::display_heading("Let's customize your APK build.");
    let settings = ui::collect_settings(input, output, &args.defaults)?;

    initialize_project(build_tool)?;
    configure_project(build_tool, &settings)?;

    let artifact = build_artifact(build_tool, &args.target, &settings)?;
    let deployed = offer_deploy(device_bridge, &artifact, input, output)?;

    Ok(WorkflowResult {
        settings,
        artifact,
        deployed,
    })
}
