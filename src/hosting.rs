//! Hosting mode and the error-disclosure policy derived from it.

use crate::constants::HOSTED_ENV_VAR;
use log::debug;
use serde::Deserialize;

/// Answers whether the process runs inside a managed host such as a web server.
pub trait HostingEnvironment {
    fn is_hosted(&self) -> bool;
}

/// Hosting mode resolved once, usually at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingMode {
    /// Serving requests; template faults must not escape.
    Hosted,
    /// Tests and tooling; template faults are reported to the caller.
    #[default]
    Standalone,
}

impl HostingMode {
    /// Reads the hosting flag from the environment.
    ///
    /// Call this once and pass the result around; it is never consulted again
    /// at render time.
    pub fn from_env() -> Self {
        let mode = Self::from_flag(std::env::var(HOSTED_ENV_VAR).ok().as_deref());
        debug!("Resolved hosting mode {mode:?} from {HOSTED_ENV_VAR}");
        mode
    }

    /// Interprets a raw flag value. Unset or unrecognised values are standalone.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("1" | "true" | "yes" | "on") => HostingMode::Hosted,
            _ => HostingMode::Standalone,
        }
    }
}

impl HostingEnvironment for HostingMode {
    fn is_hosted(&self) -> bool {
        matches!(self, HostingMode::Hosted)
    }
}

impl HostingEnvironment for bool {
    fn is_hosted(&self) -> bool {
        *self
    }
}

/// What happens to evaluator faults during a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisclosurePolicy {
    /// Propagate the fault to the caller.
    Rethrow,
    /// Write a description of the fault into the rendered output.
    Inline,
}

impl ErrorDisclosurePolicy {
    pub fn for_environment(hosting: &dyn HostingEnvironment) -> Self {
        if hosting.is_hosted() {
            ErrorDisclosurePolicy::Inline
        } else {
            ErrorDisclosurePolicy::Rethrow
        }
    }
}
