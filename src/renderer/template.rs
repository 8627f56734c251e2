use super::{engine::CompiledTemplate, filters};
use crate::{
    constants::{INLINE_ERROR_PREFIX, LOCALE_GLOBAL},
    context::{build_context, RenderInput, SafeVariableSet},
    error::{Error, Result},
    hosting::{ErrorDisclosurePolicy, HostingEnvironment},
    locale::FormatProvider,
};
use log::{debug, warn};
use std::sync::Arc;

/// Everything the evaluator receives for one render call.
#[derive(Debug, Clone)]
pub struct RenderParameters {
    pub format_provider: Arc<FormatProvider>,
    pub variables: SafeVariableSet,
    pub error_policy: ErrorDisclosurePolicy,
}

/// A compiled template plus its source, rendered against sandboxed data.
///
/// Safe to share between threads; every render builds its own parameters.
#[derive(Debug, Clone)]
pub struct SandboxedTemplate {
    template: CompiledTemplate,
    source: String,
    policy: ErrorDisclosurePolicy,
}

impl SandboxedTemplate {
    /// Pairs a compiled template with its source and resolves the
    /// error-disclosure policy from `hosting` once.
    ///
    /// Fails when `source` is not the text `template` was compiled from.
    pub fn new(
        template: CompiledTemplate,
        source: impl Into<String>,
        hosting: &dyn HostingEnvironment,
    ) -> Result<Self> {
        let source = source.into();
        if !template.has_source(&source) {
            return Err(Error::invalid_argument(
                "source",
                format!("does not match compiled template '{}'", template.name()),
            ));
        }
        let policy = ErrorDisclosurePolicy::for_environment(hosting);
        Ok(Self { template, source, policy })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }

    pub fn policy(&self) -> ErrorDisclosurePolicy {
        self.policy
    }

    /// Renders the template against `data` using `format_provider`.
    ///
    /// Missing data is an [`Error::InvalidArgument`]. Evaluator faults are
    /// returned as [`Error::EvaluatorFault`] under
    /// [`ErrorDisclosurePolicy::Rethrow`] and written into the output under
    /// [`ErrorDisclosurePolicy::Inline`].
    pub fn render<'a>(
        &self,
        data: impl Into<RenderInput<'a>>,
        format_provider: &FormatProvider,
    ) -> Result<String> {
        let params = self.create_parameters(data.into(), format_provider)?;
        self.evaluate(params)
    }

    pub fn create_parameters(
        &self,
        data: RenderInput<'_>,
        format_provider: &FormatProvider,
    ) -> Result<RenderParameters> {
        let variables = build_context(data)?;
        Ok(RenderParameters {
            format_provider: Arc::new(format_provider.clone()),
            variables,
            error_policy: self.policy,
        })
    }

    fn evaluate(&self, params: RenderParameters) -> Result<String> {
        let name = self.template.name();
        debug!(
            "Rendering '{name}' with locale '{}' and {:?} policy",
            params.format_provider.tag(),
            params.error_policy
        );

        // The locale filters are bound per call, so they go on a clone; the
        // compiled template itself is shared, not recompiled.
        let mut env = self.template.env().clone();
        filters::register_locale_filters(&mut env, Arc::clone(&params.format_provider));
        env.add_global(LOCALE_GLOBAL, params.format_provider.tag().to_string());

        let tmpl = env.get_template(name)?;
        let mut out: Vec<u8> = Vec::new();
        let result = tmpl
            .render_captured_to(params.variables.to_template_context(), &mut out)
            .map(|_| ());

        match (result, params.error_policy) {
            (Ok(()), _) => Ok(String::from_utf8_lossy(&out).into_owned()),
            (Err(err), ErrorDisclosurePolicy::Rethrow) => Err(Error::EvaluatorFault(err)),
            (Err(err), ErrorDisclosurePolicy::Inline) => {
                warn!("Template '{name}' failed, rendering the fault inline: {err}");
                let mut rendered = String::from_utf8_lossy(&out).into_owned();
                rendered.push_str(INLINE_ERROR_PREFIX);
                rendered.push_str(&err.to_string());
                Ok(rendered)
            }
        }
    }
}
