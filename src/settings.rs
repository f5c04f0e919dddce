use crate::config::PromptDefaults;

/// The four values collected from the user before building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub app_name: String,
    pub package_domain: String,
    pub main_file: String,
    /// Comma-separated extra Python requirements.
    pub dependencies: String,
}

impl BuildSettings {
    /// Settings made entirely of the configured defaults.
    pub fn from_defaults(defaults: &PromptDefaults) -> Self {
        BuildSettings {
            app_name: defaults.app_name.clone(),
            package_domain: defaults.package_domain.clone(),
            main_file: defaults.main_file.clone(),
            dependencies: defaults.dependencies.clone(),
        }
    }

    /// Value written to the `requirements` key.
    pub fn requirements(&self) -> String {
        format!("python3, {}", self.dependencies)
    }
}

/// Returns `answer` unless it is blank, in which case `default` is used.
pub fn or_default(answer: &str, default: &str) -> String {
    if answer.trim().is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    }
}
