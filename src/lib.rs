//! Safe data projection and rendering for templates authored by less-trusted
//! parties.
//!
//! Host data is converted into a closed set of [`value::SafeValue`]s before
//! any template sees it, and evaluator faults are either propagated or
//! rendered inline depending on the injected hosting mode.

/// Handles argument parsing and the command-line front end.
pub mod cli;

/// Rendering configuration files.
pub mod config;

/// Constants used across the crate.
pub mod constants;

/// Builds the safe variable set for one render call.
pub mod context;

/// Defines custom error types.
pub mod error;

/// Recursive safe conversion and the `Expose` capability for host types.
pub mod expose;

/// Hosting mode and error-disclosure policy.
pub mod hosting;

/// Locale-specific number and date conventions.
pub mod locale;

/// Template compilation and sandboxed rendering.
pub mod renderer;

/// Template-visible values.
pub mod value;

pub use context::{build_context, RenderInput, SafeVariableSet};
pub use error::{Error, Result};
pub use expose::{Expose, Opaque, ToSafe};
pub use hosting::{ErrorDisclosurePolicy, HostingEnvironment, HostingMode};
pub use locale::FormatProvider;
pub use renderer::{SandboxedTemplate, TemplateEngine};
pub use value::SafeValue;
