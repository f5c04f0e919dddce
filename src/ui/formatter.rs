//! Pure formatting functions for UI output.
//!
//! Status and error lines are also forwarded to the run log through the `log`
//! facade, so whatever the user sees is on record.

use std::path::PathBuf;

use chrono::Local;
use console::style;
use log::{error, info, warn};

/// Format and print a status line, prefixed with the wall-clock time.
pub fn display_status(message: &str) {
    println!(
        "{}",
        style(format!("[{}] {}", Local::now().format("%H:%M:%S"), message)).green()
    );
    info!("{}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
    info!("{}", message);
}

/// Format and print a non-fatal warning in yellow.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
    warn!("{}", message);
}

/// Format and print a fatal error in red on stderr.
pub fn display_error(message: &str) {
    eprintln!("{}", style(format!("Error: {}", message)).red());
    error!("Error: {}", message);
}

/// Print a section heading in cyan.
pub fn display_heading(message: &str) {
    println!("{}", style(message).cyan());
}

/// Lines describing the `.apk` files found where the expected one was not.
pub fn format_found_artifacts(found: &[PathBuf]) -> Vec<String> {
    if found.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["APK files present in the output directory:".to_string()];
    lines.extend(found.iter().map(|path| format!("  - {}", path.display())));
    lines
}

/// List `.apk` files that exist where the expected artifact did not.
pub fn display_found_artifacts(found: &[PathBuf]) {
    for (i, line) in format_found_artifacts(found).iter().enumerate() {
        if i == 0 {
            eprintln!("{}", style(line).bold());
        } else {
            eprintln!("{}", line);
        }
        error!("{}", line);
    }
}
