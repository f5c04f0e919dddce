//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling
//!
//! Prompts read from any `BufRead` and write to any `Write` so the same code
//! serves the terminal and tests.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::config::PromptDefaults;
use crate::settings::{or_default, BuildSettings};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_found_artifacts, display_heading, display_status, display_success,
    display_warning,
};

/// Reads one answer, without its line terminator. End of input reads as empty.
fn read_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Asks a question, falling back to `default` on an empty answer.
///
/// The answer is used as typed apart from surrounding whitespace; nothing is
/// validated.
pub fn ask_with_default<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
) -> Result<String> {
    let answer = read_answer(input, output, &format!("{} (default: {}): ", question, default))?;
    Ok(or_default(&answer, default))
}

/// Runs the four build prompts.
pub fn collect_settings<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    defaults: &PromptDefaults,
) -> Result<BuildSettings> {
    Ok(BuildSettings {
        app_name: ask_with_default(
            input,
            output,
            "Enter the name of your application",
            &defaults.app_name,
        )?,
        package_domain: ask_with_default(
            input,
            output,
            "Enter the package domain",
            &defaults.package_domain,
        )?,
        main_file: ask_with_default(
            input,
            output,
            "Enter the main Python file",
            &defaults.main_file,
        )?,
        dependencies: ask_with_default(
            input,
            output,
            "Enter any additional Python dependencies (comma-separated)",
            &defaults.dependencies,
        )?,
    })
}

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive). Default is "no".
pub fn confirm_action<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<bool> {
    let response = read_answer(input, output, &format!("{} (y/N): ", prompt))?.to_lowercase();
    Ok(response == "y" || response == "yes")
}
