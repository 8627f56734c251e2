use super::{filters, template::SandboxedTemplate};
use crate::{
    config::{AutoEscapeMode, RenderConfig},
    error::{Error, Result},
    hosting::HostingEnvironment,
};
use log::debug;
use minijinja::{AutoEscape, Environment};

/// MiniJinja-backed template compiler.
///
/// Holds the shared environment (undefined handling, escaping, fuel, filters)
/// every compiled template starts from.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::from_config(&RenderConfig::default())
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(config.undefined.into());
        match config.auto_escape {
            AutoEscapeMode::ByExtension => {}
            AutoEscapeMode::Html => env.set_auto_escape_callback(|_| AutoEscape::Html),
            AutoEscapeMode::None => env.set_auto_escape_callback(|_| AutoEscape::None),
        }
        env.set_fuel(config.fuel);
        filters::register(&mut env);

        Self { env }
    }

    /// Compiles `source` under `name`. Syntax errors are reported here and
    /// never reach a render call.
    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledTemplate> {
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("name", "template name must not be empty"));
        }
        // Normalize the template name for cross-platform compatibility
        let name = name.replace('\\', "/");
        let mut env = self.env.clone();
        env.add_template_owned(name.clone(), source.to_string())?;
        debug!("Compiled template '{name}'");
        Ok(CompiledTemplate { env, name })
    }

    /// Compiles `source` and wraps it in a [`SandboxedTemplate`].
    pub fn parse(
        &self,
        name: &str,
        source: &str,
        hosting: &dyn HostingEnvironment,
    ) -> Result<SandboxedTemplate> {
        let compiled = self.compile(name, source)?;
        SandboxedTemplate::new(compiled, source, hosting)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable compiled template together with the environment it lives in.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    env: Environment<'static>,
    name: String,
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this template was compiled from exactly `source`.
    pub fn has_source(&self, source: &str) -> bool {
        self.env.get_template(&self.name).is_ok_and(|tmpl| tmpl.source() == source)
    }

    pub(crate) fn env(&self) -> &Environment<'static> {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UndefinedMode;
    use minijinja::ErrorKind;

    #[test]
    fn compile_reports_syntax_errors() {
        let engine = TemplateEngine::new();
        let err = engine.compile("broken", "{% if %}").unwrap_err();
        match err {
            Error::EvaluatorFault(inner) => assert_eq!(inner.kind(), ErrorKind::SyntaxError),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn compile_rejects_empty_names() {
        let engine = TemplateEngine::new();
        assert!(matches!(
            engine.compile("  ", "hi"),
            Err(Error::InvalidArgument { name: "name", .. })
        ));
    }

    #[test]
    fn compiled_template_remembers_its_source() {
        let engine = TemplateEngine::new();
        let compiled = engine.compile("mail\\welcome.txt", "Hello {{ name }}").unwrap();
        assert_eq!(compiled.name(), "mail/welcome.txt");
        assert!(compiled.has_source("Hello {{ name }}"));
        assert!(!compiled.has_source("Hello"));
    }

    #[test]
    fn compiled_templates_do_not_see_each_other() {
        let engine = TemplateEngine::new();
        let first = engine.compile("first", "one").unwrap();
        let _second = engine.compile("second", "two").unwrap();
        assert!(first.env().get_template("second").is_err());
    }

    #[test]
    fn config_controls_undefined_behavior() {
        let config = RenderConfig { undefined: UndefinedMode::Lenient, ..Default::default() };
        let compiled = TemplateEngine::from_config(&config).compile("t", "[{{ x }}]").unwrap();
        let rendered = compiled
            .env()
            .get_template("t")
            .unwrap()
            .render(minijinja::context! {})
            .unwrap();
        assert_eq!(rendered, "[]");
    }
}
