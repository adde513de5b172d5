//! Layered variable resolution use case.
//!
//! Resolves the variable layers of a pipeline step: system variables are
//! always visible, config variables resolve against them, and action
//! variables additionally see the resolved config and the outputs of the
//! previous step.

use std::fmt;
use std::sync::Arc;

use stencil_domain::{TemplateResult, Value, VariableMap};
use tracing::debug;

use crate::cancel::CancellationFlag;
use crate::ports::Clock;
use crate::variable_resolver::VariableResolver;

/// Name under which the current instant is exposed.
pub const NOW_VARIABLE: &str = "now";

/// Input layers for [`ResolveLayeredVariables`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayeredVariables {
    /// Variables always available, such as environment values.
    pub system: VariableMap,
    /// Variables defined by the pipeline configuration.
    pub config: VariableMap,
    /// Variables defined by the current action.
    pub action: VariableMap,
    /// Outputs of the previous action.
    pub outputs: VariableMap,
}

/// Use case for resolving [`LayeredVariables`].
pub struct ResolveLayeredVariables {
    resolver: VariableResolver,
    clock: Arc<dyn Clock>,
}

impl ResolveLayeredVariables {
    /// Creates a new `ResolveLayeredVariables` use case.
    #[must_use]
    pub fn new(resolver: VariableResolver, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    /// Resolves the layers and returns resolved config merged with resolved
    /// action variables; action entries win on collision.
    ///
    /// # Errors
    /// Returns the first error of either batch; nothing is returned partially.
    pub fn execute(&self, layers: &LayeredVariables) -> TemplateResult<VariableMap> {
        self.run(layers, None)
    }

    /// Like [`ResolveLayeredVariables::execute`], polling `cancel` between
    /// variables.
    ///
    /// # Errors
    /// Additionally returns `Cancelled` once the flag is set.
    pub fn execute_with_cancel(
        &self,
        layers: &LayeredVariables,
        cancel: &CancellationFlag,
    ) -> TemplateResult<VariableMap> {
        self.run(layers, Some(cancel))
    }

    fn run(
        &self,
        layers: &LayeredVariables,
        cancel: Option<&CancellationFlag>,
    ) -> TemplateResult<VariableMap> {
        let mut system = layers.system.clone();
        if self.resolver.settings().inject_now {
            system.insert(NOW_VARIABLE.to_string(), Value::Timestamp(self.clock.now()));
        }

        debug!(
            system = system.len(),
            config = layers.config.len(),
            action = layers.action.len(),
            outputs = layers.outputs.len(),
            "resolving variable layers"
        );

        let config = self.resolve(&system, &layers.config, cancel)?;

        let mut scope = system;
        scope.extend(config.iter().map(|(k, v)| (k.clone(), v.clone())));
        scope.extend(layers.outputs.iter().map(|(k, v)| (k.clone(), v.clone())));

        let action = self.resolve(&scope, &layers.action, cancel)?;

        let mut resolved = config;
        resolved.extend(action);
        Ok(resolved)
    }

    fn resolve(
        &self,
        base: &VariableMap,
        vars: &VariableMap,
        cancel: Option<&CancellationFlag>,
    ) -> TemplateResult<VariableMap> {
        match cancel {
            Some(flag) => self.resolver.resolve_with_cancel(base, vars, flag),
            None => self.resolver.resolve_with_base(base, vars),
        }
    }
}

impl fmt::Debug for ResolveLayeredVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveLayeredVariables")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
