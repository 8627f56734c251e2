//! Template rendering for sandboxed data.
//!
//! The module is structured as:
//! - `engine`: compiles template source into immutable compiled templates
//! - `template`: renders a compiled template against a safe variable set
//! - `filters`: custom filters, including the locale-aware ones bound per render

pub mod engine;
pub mod filters;
pub mod template;

// Re-export the main types for convenience
pub use engine::{CompiledTemplate, TemplateEngine};
pub use template::{RenderParameters, SandboxedTemplate};
