//! Render template use case.

use stencil_domain::{TemplateError, TemplateResult, VariableMap};
use tracing::trace;

use crate::variable_resolver::VariableResolver;

/// Use case for rendering one template against a variable scope.
#[derive(Debug, Clone)]
pub struct RenderTemplate {
    resolver: VariableResolver,
}

impl RenderTemplate {
    /// Creates a new `RenderTemplate` use case.
    #[must_use]
    pub const fn new(resolver: VariableResolver) -> Self {
        Self { resolver }
    }

    /// Renders `template` to a string.
    ///
    /// # Errors
    /// - [`TemplateError::ParseFailed`] if strict tokenizing rejects the template
    /// - [`TemplateError::RenderFailed`] wrapping the first evaluation error
    pub fn execute(&self, template: &str, vars: &VariableMap) -> TemplateResult<String> {
        let tokens = self
            .resolver
            .tokenizer()
            .tokenize(template)
            .map_err(|err| TemplateError::ParseFailed(Box::new(err)))?;

        trace!(tokens = tokens.len(), "rendering template");

        self.resolver
            .evaluator()
            .render(&tokens, vars)
            .map_err(|err| TemplateError::RenderFailed(Box::new(err)))
    }
}
