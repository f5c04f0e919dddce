use std::fmt;
use std::process::Command;

use crate::error::{ApkBuildError, Result};

/// Host families the tool knows how to provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Mac,
    /// Cygwin, MinGW and MSYS shells. Provisioned with the Linux command set.
    Wsl,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "Linux",
            Platform::Mac => "Mac",
            Platform::Wsl => "WSL",
        };
        f.write_str(name)
    }
}

/// Maps a kernel name as printed by `uname -s` to a platform.
///
/// Matching is by prefix, so `Linux`, `Darwin` and versioned names such as
/// `MINGW64_NT-10.0-19045` are all recognised.
pub fn classify(kernel_name: &str) -> Result<Platform> {
    let name = kernel_name.trim();
    if name.starts_with("Linux") {
        Ok(Platform::Linux)
    } else if name.starts_with("Darwin") {
        Ok(Platform::Mac)
    } else if ["CYGWIN", "MINGW", "MSYS"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
    {
        Ok(Platform::Wsl)
    } else {
        Err(ApkBuildError::platform(name))
    }
}

/// Reads the kernel name from `uname -s`.
pub fn kernel_name() -> Result<String> {
    let output = Command::new("uname")
        .arg("-s")
        .output()
        .map_err(|e| ApkBuildError::command("uname", format!("could not be run: {}", e)))?;

    if !output.status.success() {
        return Err(ApkBuildError::command(
            "uname",
            format!("exited with {}", output.status),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_variants() {
        assert_eq!(classify("Linux").unwrap(), Platform::Linux);
        assert_eq!(classify("Linux\n").unwrap(), Platform::Linux);
    }

    #[test]
    fn test_darwin_is_mac() {
        assert_eq!(classify("Darwin").unwrap(), Platform::Mac);
    }

    #[test]
    fn test_windows_shells_are_wsl() {
        assert_eq!(classify("CYGWIN_NT-10.0").unwrap(), Platform::Wsl);
        assert_eq!(classify("MINGW64_NT-10.0-19045").unwrap(), Platform::Wsl);
        assert_eq!(classify("MSYS_NT-10.0").unwrap(), Platform::Wsl);
    }

    #[test]
    fn test_unknown_kernel_rejected() {
        for name in ["FreeBSD", "SunOS", "", "linux"] {
            let err = classify(name).unwrap_err();
            assert!(
                err.to_string().starts_with("Unsupported OS"),
                "unexpected error for {:?}: {}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Platform::Linux.to_string(), "Linux");
        assert_eq!(Platform::Mac.to_string(), "Mac");
        assert_eq!(Platform::Wsl.to_string(), "WSL");
    }
}
