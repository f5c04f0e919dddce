pub mod artifact;
pub mod buildspec;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod settings;
pub mod shell_path;
pub mod tools;
pub mod ui;
pub mod update;

pub use error::{ApkBuildError, Result};
