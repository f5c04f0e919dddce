use std::ffi::OsString;
use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use apk_autobuild::cli::orchestration::{run_build_workflow, BuildWorkflowArgs};
use apk_autobuild::config::{self, Config};
use apk_autobuild::logging::RunLog;
use apk_autobuild::tools::{Adb, Buildozer, CommandPackageManager};
use apk_autobuild::update::{self, HttpUpdateSource};
use apk_autobuild::{platform, ui, ApkBuildError};

#[derive(clap::Parser)]
#[command(
    name = "apk-autobuild",
    version,
    about = "Install dependencies and build an Android APK from a Python project with Buildozer"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Do not check for a newer release")]
    skip_update: bool,

    #[arg(short, long, help = "Mirror debug logging to the terminal")]
    verbose: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            ui::display_error(e.to_string().trim_start_matches("error: ").trim_end());
            process::exit(1);
        }
    };

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            process::exit(1);
        }
    };

    let log = match RunLog::create(&config.log.dir) {
        Ok(log) => log,
        Err(e) => {
            ui::display_error(&format!("cannot create log file: {}", e));
            process::exit(1);
        }
    };
    if let Err(e) = log.install_logger(args.verbose) {
        ui::display_error(&e.to_string());
        process::exit(1);
    }

    if let Err(e) = run(&args, &config, &log) {
        report_failure(&e, &log);
        process::exit(1);
    }

    ui::display_status(&format!(
        "Script completed. Check the log for details: {}",
        log.path().display()
    ));
}

fn run(args: &Args, config: &Config, log: &RunLog) -> Result<()> {
    if args.skip_update {
        ui::display_status("Skipping update check.");
    } else if let Some(source) = HttpUpdateSource::from_config(&config.update) {
        let exe = std::env::current_exe().context("cannot locate the running executable")?;
        let restart_args: Vec<OsString> = std::env::args_os().skip(1).collect();
        update::self_update(&source, &exe, &restart_args)?;
    } else {
        ui::display_status("No update source configured; skipping update check.");
    }

    let kernel = platform::kernel_name()?;
    ui::display_status(&format!("Detected OS: {}", kernel));
    let platform = platform::classify(&kernel)?;
    ui::display_status(&format!("Machine type: {}", platform));

    let package_manager =
        CommandPackageManager::new(config.dependencies.for_platform(platform).clone());
    let project_dir = std::env::current_dir()?;
    let build_tool = Buildozer::new(config.build_tool.clone(), project_dir, log.clone());
    let device_bridge = Adb::new(config.device_bridge.clone());

    let workflow_args = BuildWorkflowArgs::from_config(config, platform);
    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    run_build_workflow(
        &workflow_args,
        &package_manager,
        &build_tool,
        &device_bridge,
        &mut input,
        &mut output,
    )?;
    Ok(())
}

fn report_failure(err: &anyhow::Error, log: &RunLog) {
    if let Some(ApkBuildError::ArtifactMissing { path, found }) = err.downcast_ref() {
        ui::display_error(&format!(
            "APK build failed: {} does not exist. Check {} for details.",
            path.display(),
            log.path().display()
        ));
        ui::display_found_artifacts(found);
        return;
    }
    ui::display_error(&format!("{:#}", err));
}
