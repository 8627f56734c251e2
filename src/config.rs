use crate::{
    constants::{CONFIG_FILENAMES, DEFAULT_LOCALE},
    error::{Error, Result},
    hosting::HostingMode,
    locale::FormatProvider,
};
use log::debug;
use minijinja::UndefinedBehavior;
use serde::Deserialize;
use std::path::Path;

/// How the evaluator treats names that resolve to nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedMode {
    /// Any use of an undefined value is a fault.
    #[default]
    Strict,
    /// Undefined values print as empty and are falsy.
    Lenient,
    /// Like lenient, and attribute access on undefined stays undefined.
    Chainable,
}

impl From<UndefinedMode> for UndefinedBehavior {
    fn from(mode: UndefinedMode) -> Self {
        match mode {
            UndefinedMode::Strict => UndefinedBehavior::Strict,
            UndefinedMode::Lenient => UndefinedBehavior::Lenient,
            UndefinedMode::Chainable => UndefinedBehavior::Chainable,
        }
    }
}

/// Output escaping applied to rendered values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoEscapeMode {
    /// HTML escaping for `.html`, `.htm` and `.xml` template names.
    #[default]
    ByExtension,
    Html,
    None,
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Hosting mode. When absent it is read from the environment.
    pub hosting: Option<HostingMode>,
    /// Locale tag used when the caller does not supply one.
    pub locale: String,
    pub undefined: UndefinedMode,
    pub auto_escape: AutoEscapeMode,
    /// Upper bound on evaluator work per render.
    pub fuel: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hosting: None,
            locale: DEFAULT_LOCALE.to_string(),
            undefined: UndefinedMode::default(),
            auto_escape: AutoEscapeMode::default(),
            fuel: None,
        }
    }
}

impl RenderConfig {
    /// Reads a config file, choosing YAML or JSON by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "yaml" | "yml"));

        let config = if is_yaml {
            serde_yaml::from_str(&contents)?
        } else {
            serde_json::from_str(&contents)?
        };
        debug!("Loaded render config from '{}'", path.display());
        Ok(config)
    }

    /// Looks for the first known config file name inside `config_dir`.
    pub fn load_config<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        for config_file in CONFIG_FILENAMES {
            let candidate = config_dir.join(config_file);
            if candidate.is_file() {
                return Self::from_file(candidate);
            }
        }
        Err(Error::ConfigNotFound {
            config_dir: config_dir.display().to_string(),
            config_files: CONFIG_FILENAMES.join(", "),
        })
    }

    /// The configured hosting mode, falling back to the environment.
    pub fn hosting_mode(&self) -> HostingMode {
        self.hosting.unwrap_or_else(HostingMode::from_env)
    }

    pub fn format_provider(&self) -> Result<FormatProvider> {
        FormatProvider::for_tag(&self.locale)
    }
}
