//! Constants used throughout template-sandbox

/// Configuration file names in order of preference
pub const CONFIG_FILENAMES: &[&str] =
    &["template-sandbox.json", "template-sandbox.yaml", "template-sandbox.yml"];

/// Environment variable consulted once at startup to detect hosted mode
pub const HOSTED_ENV_VAR: &str = "TEMPLATE_SANDBOX_HOSTED";

/// Prefix of the fault description written into the output under inline policy
pub const INLINE_ERROR_PREFIX: &str = "Template error: ";

/// Name of the global holding the active locale tag
pub const LOCALE_GLOBAL: &str = "locale";

/// Locale used when neither the caller nor the config names one
pub const DEFAULT_LOCALE: &str = "en-US";

/// Tag of the culture-neutral format provider
pub const INVARIANT_LOCALE: &str = "invariant";

/// STDIN indicator for CLI arguments
pub const STDIN_INDICATOR: &str = "-";

/// Largest number of fraction digits `format_number` accepts.
pub const MAX_DECIMALS: usize = 20;

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
