//! Engine facade
//!
//! Bundles the tokenizer, evaluator, resolver and use cases behind the entry
//! points embedders call.

use std::fmt;
use std::sync::Arc;

use stencil_domain::{EngineSettings, TemplateResult, Value, VariableMap};

use crate::cancel::CancellationFlag;
use crate::ports::{Clock, FilterRegistry};
use crate::use_cases::{LayeredVariables, RenderTemplate, ResolveLayeredVariables};
use crate::variable_resolver::VariableResolver;

/// The template engine.
///
/// Cheap to clone; clones share the filter registry and clock.
#[derive(Clone)]
pub struct Engine {
    resolver: VariableResolver,
    registry: Arc<FilterRegistry>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Creates an engine over a fully assembled registry.
    #[must_use]
    pub fn new(registry: Arc<FilterRegistry>, settings: EngineSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            resolver: VariableResolver::new(Arc::clone(&registry), settings),
            registry,
            clock,
        }
    }

    /// Creates an engine whose registry is `defaults` with `overrides`
    /// merged on top.
    #[must_use]
    pub fn with_filters(
        defaults: &FilterRegistry,
        overrides: &FilterRegistry,
        settings: EngineSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            Arc::new(FilterRegistry::merged(defaults, overrides)),
            settings,
            clock,
        )
    }

    /// Returns the filter registry.
    #[must_use]
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        self.resolver.settings()
    }

    /// Returns the batch resolver.
    #[must_use]
    pub const fn resolver(&self) -> &VariableResolver {
        &self.resolver
    }

    /// Renders `template` against `vars`.
    ///
    /// # Errors
    /// Returns `ParseFailed` or `RenderFailed` wrapping the underlying error.
    pub fn render(&self, template: &str, vars: &VariableMap) -> TemplateResult<String> {
        RenderTemplate::new(self.resolver.clone()).execute(template, vars)
    }

    /// Renders `template` in value mode: a lone placeholder keeps its type.
    ///
    /// # Errors
    /// Returns the first tokenizing or evaluation error.
    pub fn render_value(&self, template: &str, vars: &VariableMap) -> TemplateResult<Value> {
        self.resolver.resolve_string(template, vars)
    }

    /// Resolves a self-contained batch.
    ///
    /// # Errors
    /// See [`VariableResolver::resolve_with_base`].
    pub fn resolve_variables(&self, batch: &VariableMap) -> TemplateResult<VariableMap> {
        self.resolver.resolve(batch)
    }

    /// Resolves a batch that may read names from `base`.
    ///
    /// # Errors
    /// See [`VariableResolver::resolve_with_base`].
    pub fn resolve_variables_with_base(
        &self,
        base: &VariableMap,
        batch: &VariableMap,
    ) -> TemplateResult<VariableMap> {
        self.resolver.resolve_with_base(base, batch)
    }

    /// Resolves a batch, polling `cancel` between variables.
    ///
    /// # Errors
    /// See [`VariableResolver::resolve_with_cancel`].
    pub fn resolve_variables_with_cancel(
        &self,
        base: &VariableMap,
        batch: &VariableMap,
        cancel: &CancellationFlag,
    ) -> TemplateResult<VariableMap> {
        self.resolver.resolve_with_cancel(base, batch, cancel)
    }

    /// Resolves system, config, action and output layers.
    ///
    /// # Errors
    /// See [`ResolveLayeredVariables::execute`].
    pub fn resolve_layers(&self, layers: &LayeredVariables) -> TemplateResult<VariableMap> {
        self.layers_use_case().execute(layers)
    }

    /// Resolves layers, polling `cancel` between variables.
    ///
    /// # Errors
    /// See [`ResolveLayeredVariables::execute_with_cancel`].
    pub fn resolve_layers_with_cancel(
        &self,
        layers: &LayeredVariables,
        cancel: &CancellationFlag,
    ) -> TemplateResult<VariableMap> {
        self.layers_use_case().execute_with_cancel(layers, cancel)
    }

    fn layers_use_case(&self) -> ResolveLayeredVariables {
        ResolveLayeredVariables::new(self.resolver.clone(), Arc::clone(&self.clock))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("settings", self.settings())
            .finish_non_exhaustive()
    }
}
