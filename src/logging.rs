//! Per-run log file.
//!
//! Every invocation writes to `build_log_YYYYMMDD_HHMMSS.log`. Status and error
//! lines arrive through the `log` facade; build-tool output is appended to the
//! same file through [`RunLog::append_handle`].

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::LevelFilter;
use simplelog::{
    format_description, ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::error::{ApkBuildError, Result};

/// Returns the log file name for a run started at `started`.
pub fn log_file_name(started: &DateTime<Local>) -> String {
    format!("build_log_{}.log", started.format("%Y%m%d_%H%M%S"))
}

#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Creates the log file in `dir`, named after the current local time.
    /// Missing directories are created.
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(log_file_name(&Local::now()));
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(RunLog { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens an independent append handle, for redirecting child output.
    pub fn append_handle(&self) -> Result<File> {
        Ok(OpenOptions::new().append(true).open(&self.path)?)
    }

    /// Installs the global logger.
    ///
    /// Info and above always go to the file. With `verbose`, debug records are
    /// mirrored to the terminal as well.
    pub fn install_logger(&self, verbose: bool) -> Result<()> {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_custom(format_description!("[hour]:[minute]:[second]"))
            .set_target_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off);
        // Falls back to UTC when the local offset cannot be determined.
        let _ = builder.set_time_offset_to_local();
        let config = builder.build();

        let mut loggers: Vec<Box<dyn SharedLogger>> = vec![WriteLogger::new(
            LevelFilter::Info,
            config.clone(),
            self.append_handle()?,
        )];
        if verbose {
            loggers.push(TermLogger::new(
                LevelFilter::Debug,
                config,
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ));
        }

        CombinedLogger::init(loggers)
            .map_err(|e| ApkBuildError::config(format!("logger already installed: {}", e)))
    }
}
