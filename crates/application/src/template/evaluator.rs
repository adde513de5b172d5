//! Token evaluator
//!
//! Applies tokens to a variable scope and a filter registry. Evaluation is a
//! pure function of its inputs; the registry is shared read-only.

use std::sync::Arc;

use stencil_domain::{
    Arg, FilterCall, TemplateError, TemplateResult, Token, Value, VariableMap,
};
use tracing::{trace, warn};

use crate::ports::{FilterKind, FilterRegistry};

/// Renders token sequences against a scope.
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<FilterRegistry>,
}

impl Evaluator {
    /// Creates an evaluator over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<FilterRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the filter registry.
    #[must_use]
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Renders tokens into one string.
    ///
    /// Placeholder values are stringified with [`Value::to_text`]. Conditional
    /// markers produce no output; undefined placeholders render their raw
    /// contents.
    ///
    /// # Errors
    ///
    /// Fails on the first placeholder that cannot be evaluated.
    pub fn render(&self, tokens: &[Token], scope: &VariableMap) -> TemplateResult<String> {
        let mut output = String::new();

        for token in tokens {
            match token {
                Token::Text(text) => output.push_str(text),
                Token::Variable { .. } | Token::FilteredVariable { .. } => {
                    output.push_str(&self.render_token(token, scope)?.to_text());
                }
                Token::Undefined { raw } => output.push_str(raw),
                Token::IfStart { raw, .. }
                | Token::IfEnd { raw }
                | Token::Else { raw }
                | Token::ShorthandIf { raw } => {
                    warn!(token = %raw, "conditional placeholder skipped");
                }
            }
        }

        Ok(output)
    }

    /// Renders tokens into a typed value.
    ///
    /// Exactly one placeholder yields that placeholder's value; anything else
    /// is rendered as a string.
    ///
    /// # Errors
    ///
    /// Fails on the first placeholder that cannot be evaluated.
    pub fn render_value(&self, tokens: &[Token], scope: &VariableMap) -> TemplateResult<Value> {
        match tokens {
            [token @ (Token::Variable { .. } | Token::FilteredVariable { .. })] => {
                self.render_token(token, scope)
            }
            _ => self.render(tokens, scope).map(Value::String),
        }
    }

    /// Evaluates a single token.
    ///
    /// A plain variable stringifies booleans and integers and passes every
    /// other kind through. A filtered variable returns the output of its
    /// last filter unchanged.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::VariableNotFound`] for a missing variable that the
    ///   pipeline could not replace
    /// - [`TemplateError::FunctionNotFound`] for an unregistered filter
    /// - [`TemplateError::FunctionApplyFailed`] for a failing filter
    /// - [`TemplateError::InvalidToken`] for conditional or undefined tokens
    pub fn render_token(&self, token: &Token, scope: &VariableMap) -> TemplateResult<Value> {
        match token {
            Token::Text(text) => Ok(Value::String(text.clone())),
            Token::Variable { name } => {
                let value = scope
                    .get(name)
                    .ok_or_else(|| TemplateError::variable_not_found(name))?;

                Ok(match value {
                    Value::Bool(_) | Value::Int(_) => Value::String(value.to_text()),
                    other => other.clone(),
                })
            }
            Token::FilteredVariable { name, pipeline, .. } => {
                self.apply_pipeline(name, pipeline, scope)
            }
            other => Err(TemplateError::InvalidToken(other.raw().to_string())),
        }
    }

    /// Threads the base variable through `pipeline`.
    ///
    /// A missing base variable fails at once only when the pipeline is empty.
    /// Otherwise the filters run from [`Value::Nil`] and the lookup error is
    /// deferred: it is raised if a filter rejects the nil input and no
    /// fallback filter covers it, or if the pipeline ends on nil without a
    /// fallback filter having run.
    fn apply_pipeline(
        &self,
        name: &str,
        pipeline: &[FilterCall],
        scope: &VariableMap,
    ) -> TemplateResult<Value> {
        let (mut value, mut missing) = match scope.get(name) {
            Some(value) => (value.clone(), false),
            None if !pipeline.is_empty() => (Value::Nil, true),
            None => return Err(TemplateError::variable_not_found(name)),
        };

        let has_fallback = pipeline
            .iter()
            .any(|call| self.registry.is_fallback(&call.name));

        for call in pipeline {
            let filter = self
                .registry
                .get(&call.name)
                .ok_or_else(|| TemplateError::function_not_found(&call.name))?;
            let args = materialize_args(&call.args, scope)?;

            trace!(filter = %call.name, input = value.type_name(), args = args.len(), "applying filter");

            match filter.apply(&value, &args) {
                Ok(next) => {
                    if filter.kind() == FilterKind::Fallback || !next.is_nil() {
                        missing = false;
                    }
                    value = next;
                }
                Err(err) if has_fallback && err.allows_default() => {
                    trace!(filter = %call.name, error = %err, "filter deferred to fallback");
                }
                Err(err) if missing && err.allows_default() => {
                    return Err(TemplateError::variable_not_found(name));
                }
                Err(source) => {
                    return Err(TemplateError::FunctionApplyFailed {
                        name: call.name.clone(),
                        source,
                    });
                }
            }
        }

        if missing {
            return Err(TemplateError::variable_not_found(name));
        }

        Ok(value)
    }
}

/// Turns filter arguments into positional values, looking variable
/// references up in `scope`.
fn materialize_args(args: &[Arg], scope: &VariableMap) -> TemplateResult<Vec<Value>> {
    args.iter()
        .map(|arg| match arg {
            Arg::Literal(literal) => Ok(literal.to_value()),
            Arg::VariableRef(name) => scope
                .get(name)
                .cloned()
                .ok_or_else(|| TemplateError::variable_not_found(name)),
        })
        .collect()
}
