//! Structured editing of `buildozer.spec`.
//!
//! The file is INI-like. Lines are kept as written so comments, ordering and
//! unrelated keys survive a patch; only the lines for the keys being set are
//! touched.

use std::fs;
use std::path::Path;

use crate::error::{ApkBuildError, Result};
use crate::settings::BuildSettings;

/// Section holding the application metadata.
pub const APP_SECTION: &str = "app";

/// How a key ended up holding its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// An active `key = value` line was rewritten.
    Replaced,
    /// A commented template line was uncommented and rewritten.
    Uncommented,
    /// No line existed; one was added to the section.
    Inserted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Section(String),
    Assignment {
        commented: bool,
        key: String,
        value: String,
    },
    Other(String),
}

fn is_key(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl Line {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return Line::Section(name.trim().to_string());
        }

        let (commented, body) = match trimmed.strip_prefix('#') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        if let Some((key, value)) = body.split_once('=') {
            let key = key.trim_end();
            if is_key(key) {
                return Line::Assignment {
                    commented,
                    key: key.to_string(),
                    value: value.trim().to_string(),
                };
            }
        }
        Line::Other(raw.to_string())
    }
}

/// An in-memory `buildozer.spec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    raw: Vec<String>,
    parsed: Vec<Line>,
}

impl BuildSpec {
    pub fn parse(text: &str) -> Self {
        let raw: Vec<String> = text.lines().map(str::to_string).collect();
        let parsed = raw.iter().map(|l| Line::parse(l)).collect();
        BuildSpec { raw, parsed }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ApkBuildError::spec(format!("cannot read {}: {}", path.display(), e)))?;
        Ok(Self::parse(&text))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .map_err(|e| ApkBuildError::spec(format!("cannot write {}: {}", path.display(), e)))
    }

    pub fn render(&self) -> String {
        let mut out = self.raw.join("\n");
        out.push('\n');
        out
    }

    /// Line range `[start, end)` of the section body, excluding its header.
    fn section_bounds(&self, section: &str) -> Option<(usize, usize)> {
        let header = self
            .parsed
            .iter()
            .position(|l| matches!(l, Line::Section(name) if name == section))?;
        let end = self.parsed[header + 1..]
            .iter()
            .position(|l| matches!(l, Line::Section(_)))
            .map(|offset| header + 1 + offset)
            .unwrap_or(self.parsed.len());
        Some((header + 1, end))
    }

    fn find(&self, section: &str, key: &str, want_commented: bool) -> Option<usize> {
        let (start, end) = self.section_bounds(section)?;
        (start..end).find(|&i| {
            matches!(&self.parsed[i],
                Line::Assignment { commented, key: k, .. } if *commented == want_commented && k == key)
        })
    }

    /// Current value of an active assignment.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let index = self.find(section, key, false)?;
        match &self.parsed[index] {
            Line::Assignment { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    fn put(&mut self, index: usize, key: &str, value: &str) {
        self.raw[index] = format!("{} = {}", key, value);
        self.parsed[index] = Line::Assignment {
            commented: false,
            key: key.to_string(),
            value: value.trim().to_string(),
        };
    }

    /// Sets `key` in `section`, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Edit {
        if let Some(index) = self.find(section, key, false) {
            self.put(index, key, value);
            return Edit::Replaced;
        }
        if let Some(index) = self.find(section, key, true) {
            self.put(index, key, value);
            return Edit::Uncommented;
        }

        let at = match self.section_bounds(section) {
            Some((start, mut end)) => {
                while end > start && self.raw[end - 1].trim().is_empty() {
                    end -= 1;
                }
                end
            }
            None => {
                if self.raw.last().is_some_and(|l| !l.trim().is_empty()) {
                    self.raw.push(String::new());
                    self.parsed.push(Line::Other(String::new()));
                }
                self.raw.push(format!("[{}]", section));
                self.parsed.push(Line::Section(section.to_string()));
                self.raw.len()
            }
        };
        self.raw.insert(at, String::new());
        self.parsed.insert(at, Line::Other(String::new()));
        self.put(at, key, value);
        Edit::Inserted
    }
}

/// The `[app]` keys written for a set of build settings, in file order.
pub fn app_entries(settings: &BuildSettings) -> Vec<(&'static str, String)> {
    vec![
        ("package.name", settings.app_name.clone()),
        ("package.domain", settings.package_domain.clone()),
        ("requirements", settings.requirements()),
        ("source.main", settings.main_file.clone()),
        ("source.include_patterns", settings.main_file.clone()),
    ]
}

/// Writes the settings into the spec file and reads it back to confirm.
///
/// Returns one `(key, Edit)` per key written.
pub fn patch_file(path: &Path, settings: &BuildSettings) -> Result<Vec<(&'static str, Edit)>> {
    let mut spec = BuildSpec::load(path)?;
    let entries = app_entries(settings);

    let edits = entries
        .iter()
        .map(|(key, value)| (*key, spec.set(APP_SECTION, key, value)))
        .collect();
    spec.save(path)?;

    let written = BuildSpec::load(path)?;
    for (key, value) in &entries {
        match written.get(APP_SECTION, key) {
            Some(actual) if actual == value.trim() => {}
            actual => {
                return Err(ApkBuildError::spec(format!(
                    "`{}` should be `{}` after patching, found {:?}",
                    key, value, actual
                )));
            }
        }
    }

    Ok(edits)
}
