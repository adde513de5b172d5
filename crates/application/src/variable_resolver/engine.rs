//! Variable resolution engine
//!
//! Resolves a batch of mutually referential variables: build the dependency
//! graph, order it, then render each entry against a scope that accumulates
//! the entries resolved so far. Any failure discards the whole batch.

use std::sync::Arc;

use stencil_domain::{
    EngineSettings, TemplateError, TemplateResult, Token, Value, VariableMap,
};
use tracing::{debug, trace};

use super::graph::DependencyGraph;
use crate::cancel::CancellationFlag;
use crate::ports::FilterRegistry;
use crate::template::{Evaluator, Tokenizer};

/// The batch resolution engine.
#[derive(Debug, Clone)]
pub struct VariableResolver {
    tokenizer: Tokenizer,
    evaluator: Evaluator,
    settings: EngineSettings,
}

impl VariableResolver {
    /// Creates a resolver over `registry`.
    #[must_use]
    pub fn new(registry: Arc<FilterRegistry>, settings: EngineSettings) -> Self {
        let mut tokenizer = if settings.strict_syntax {
            Tokenizer::strict()
        } else {
            Tokenizer::new()
        };
        if settings.keyword_boundary {
            tokenizer = tokenizer.with_keyword_boundary();
        }

        Self {
            tokenizer,
            evaluator: Evaluator::new(registry),
            settings,
        }
    }

    /// Returns the tokenizer used for every entry.
    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Returns the evaluator used for every entry.
    #[must_use]
    pub const fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Resolves a self-contained batch.
    ///
    /// # Errors
    ///
    /// See [`VariableResolver::resolve_with_base`].
    pub fn resolve(&self, vars: &VariableMap) -> TemplateResult<VariableMap> {
        self.run(&VariableMap::new(), vars, None)
    }

    /// Resolves `vars`, reading external names from `base`.
    ///
    /// The result holds exactly the batch keys, in batch order. `base` entries
    /// are visible to the templates but are not copied into the result.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::CircularDependency`] before anything is evaluated
    /// - any evaluation error, wrapped in [`TemplateError::Variable`] with the
    ///   failing entry's name
    pub fn resolve_with_base(
        &self,
        base: &VariableMap,
        vars: &VariableMap,
    ) -> TemplateResult<VariableMap> {
        self.run(base, vars, None)
    }

    /// Like [`VariableResolver::resolve_with_base`], polling `cancel` before
    /// each entry.
    ///
    /// # Errors
    ///
    /// Additionally fails with [`TemplateError::Cancelled`] once the flag is
    /// set. Polling is skipped when `check_cancellation` is off.
    pub fn resolve_with_cancel(
        &self,
        base: &VariableMap,
        vars: &VariableMap,
        cancel: &CancellationFlag,
    ) -> TemplateResult<VariableMap> {
        self.run(base, vars, Some(cancel))
    }

    fn run(
        &self,
        base: &VariableMap,
        vars: &VariableMap,
        cancel: Option<&CancellationFlag>,
    ) -> TemplateResult<VariableMap> {
        debug!(variables = vars.len(), base = base.len(), "resolving variable batch");

        let graph = DependencyGraph::build(vars, &self.tokenizer)?;
        let order = graph.topological_order()?;

        debug!(order = ?order, "resolution order");
        if !graph.missing().is_empty() {
            debug!(external = ?graph.missing(), "batch reads names outside the batch");
        }

        let mut scope = base.clone();
        for (name, value) in vars {
            if !graph.contains(name) {
                scope.insert(name.clone(), value.clone());
            }
        }

        for name in &order {
            if self.settings.check_cancellation && cancel.is_some_and(CancellationFlag::is_cancelled)
            {
                debug!(variable = %name, "resolution cancelled");
                return Err(TemplateError::Cancelled);
            }

            let Some(raw) = vars.get(name) else {
                continue;
            };

            let resolved = self
                .resolve_value(raw, &scope)
                .map_err(|err| err.in_variable(name))?;

            trace!(variable = %name, kind = resolved.type_name(), "resolved variable");
            scope.insert(name.clone(), resolved);
        }

        let mut resolved = VariableMap::with_capacity(vars.len());
        for name in vars.keys() {
            if let Some(value) = scope.swap_remove(name) {
                resolved.insert(name.clone(), value);
            }
        }

        Ok(resolved)
    }

    /// Resolves one raw value against `scope`.
    ///
    /// Strings are rendered, maps are rebuilt with every string leaf
    /// rendered, and anything else is returned unchanged.
    ///
    /// # Errors
    ///
    /// Fails on the first leaf that cannot be rendered.
    pub fn resolve_value(&self, raw: &Value, scope: &VariableMap) -> TemplateResult<Value> {
        match raw {
            Value::String(template) => self.resolve_string(template, scope),
            Value::Map(map) => self.resolve_map(map, scope).map(Value::Map),
            other => Ok(other.clone()),
        }
    }

    /// Renders a template in value mode.
    ///
    /// A template that tokenizes to a single literal run is returned without
    /// touching the evaluator.
    ///
    /// # Errors
    ///
    /// Fails if the template cannot be tokenized or evaluated.
    pub fn resolve_string(&self, template: &str, scope: &VariableMap) -> TemplateResult<Value> {
        let tokens = self.tokenizer.tokenize(template)?;

        match tokens.as_slice() {
            [] => Ok(Value::String(String::new())),
            [Token::Text(text)] => Ok(Value::String(text.clone())),
            _ => self.evaluator.render_value(&tokens, scope),
        }
    }

    fn resolve_map(&self, map: &VariableMap, scope: &VariableMap) -> TemplateResult<VariableMap> {
        map.iter()
            .map(|(key, value)| {
                self.resolve_value(value, scope)
                    .map(|resolved| (key.clone(), resolved))
                    .map_err(|err| err.in_variable(key))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stencil_domain::{FilterError, FilterResult};

    fn upper(value: &Value, _: &[Value]) -> FilterResult {
        value
            .as_str()
            .map(|s| Value::from(s.to_uppercase()))
            .ok_or(FilterError::invalid_value("string", value.type_name()))
    }

    fn default(value: &Value, args: &[Value]) -> FilterResult {
        Ok(if value.is_nil() {
            args.first().cloned().unwrap_or_default()
        } else {
            value.clone()
        })
    }

    fn resolver() -> VariableResolver {
        let registry = FilterRegistry::builder()
            .filter("upper", upper)
            .fallback("default", default)
            .build();
        VariableResolver::new(Arc::new(registry), EngineSettings::default())
    }

    fn vars(entries: &[(&str, Value)]) -> VariableMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_resolve_chain() {
        let batch = vars(&[
            ("D", "{{C}}-D".into()),
            ("base", "root".into()),
            ("B", "{{A}}-B".into()),
            ("A", "{{base}}-A".into()),
            ("C", "{{B}}-C".into()),
        ]);

        let resolved = resolver().resolve(&batch).unwrap();

        assert_eq!(resolved["D"], Value::from("root-A-B-C-D"));
        assert_eq!(resolved["A"], Value::from("root-A"));
        // Output keeps batch order.
        assert_eq!(
            resolved.keys().collect::<Vec<_>>(),
            vec!["D", "base", "B", "A", "C"]
        );
    }

    #[test]
    fn test_resolve_self_reference() {
        let err = resolver().resolve(&vars(&[("self", "{{ self }}".into())])).unwrap_err();
        assert!(err.is_circular_dependency());
    }

    #[test]
    fn test_self_reference_shadowing_base_is_cycle() {
        let base = vars(&[("name", "outer".into())]);
        let err = resolver()
            .resolve_with_base(&base, &vars(&[("name", "{{ name }}!".into())]))
            .unwrap_err();
        assert!(err.is_circular_dependency());
    }

    #[test]
    fn test_base_values_visible_but_not_returned() {
        let base = vars(&[("env", "prod".into())]);
        let resolved = resolver()
            .resolve_with_base(&base, &vars(&[("url", "https://{{ env }}.example".into())]))
            .unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["url"], Value::from("https://prod.example"));
    }

    #[test]
    fn test_missing_reference_fails_at_evaluation() {
        let err = resolver()
            .resolve(&vars(&[("a", "{{ ghost }}".into())]))
            .unwrap_err();

        assert_eq!(
            err,
            TemplateError::variable_not_found("ghost").in_variable("a")
        );
    }

    #[test]
    fn test_pass_through_values() {
        let batch = vars(&[
            ("count", Value::Int(3)),
            ("flag", Value::Bool(false)),
            ("items", Value::from(vec!["{{ count }}"])),
            ("label", "n={{ count }}".into()),
        ]);

        let resolved = resolver().resolve(&batch).unwrap();

        assert_eq!(resolved["count"], Value::Int(3));
        assert_eq!(resolved["flag"], Value::Bool(false));
        // Lists are not rendered.
        assert_eq!(resolved["items"], Value::from(vec!["{{ count }}"]));
        assert_eq!(resolved["label"], Value::from("n=3"));
    }

    #[test]
    fn test_single_placeholder_keeps_type() {
        let batch = vars(&[
            ("items", Value::from(vec![1_i64, 2])),
            ("copy", "{{ items }}".into()),
        ]);
        let resolved = resolver().resolve(&batch).unwrap();
        assert_eq!(resolved["copy"], Value::from(vec![1_i64, 2]));
    }

    #[test]
    fn test_nested_maps_render_leaves() {
        let mut headers = VariableMap::new();
        headers.insert("auth".to_string(), "Bearer {{ token }}".into());
        headers.insert("retries".to_string(), Value::Int(2));
        let mut request = VariableMap::new();
        request.insert("url".to_string(), "{{ host }}/api".into());
        request.insert("headers".to_string(), Value::Map(headers));

        let batch = vars(&[
            ("request", Value::Map(request)),
            ("host", "http://localhost".into()),
            ("token", "{{ secret | upper }}".into()),
            ("secret", "abc".into()),
        ]);

        let resolved = resolver().resolve(&batch).unwrap();
        let request = resolved["request"].as_map().unwrap();

        assert_eq!(request["url"], Value::from("http://localhost/api"));
        let headers = request["headers"].as_map().unwrap();
        assert_eq!(headers["auth"], Value::from("Bearer ABC"));
        assert_eq!(headers["retries"], Value::Int(2));
    }

    #[test]
    fn test_nested_error_names_the_path() {
        let mut inner = VariableMap::new();
        inner.insert("leaf".to_string(), "{{ nope }}".into());
        let err = resolver()
            .resolve(&vars(&[("outer", Value::Map(inner))]))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to render variable 'outer': failed to render variable 'leaf': variable not found: nope"
        );
        assert!(err.is_variable_not_found());
    }

    #[test]
    fn test_default_filter_covers_missing_reference() {
        let resolved = resolver()
            .resolve(&vars(&[("title", "{{ raw | default:'Untitled' }}".into())]))
            .unwrap();
        assert_eq!(resolved["title"], Value::from("Untitled"));
    }

    #[test]
    fn test_idempotent_on_resolved_batch() {
        let batch = vars(&[
            ("a", "plain".into()),
            ("b", Value::Int(1)),
            ("c", Value::from(vec!["x"])),
        ]);
        let resolver = resolver();
        let once = resolver.resolve(&batch).unwrap();
        assert_eq!(once, batch);
        assert_eq!(resolver.resolve(&once).unwrap(), once);
    }

    #[test]
    fn test_literal_entries_never_reach_filters() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = FilterRegistry::builder()
            .filter("spy", move |value: &Value, _: &[Value]| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(value.clone())
            })
            .build();
        let resolver = VariableResolver::new(Arc::new(registry), EngineSettings::default());

        let batch = vars(&[
            ("literal", "spy | not a placeholder".into()),
            ("braces", "{ single }".into()),
            ("used", "{{ literal | spy }}".into()),
        ]);
        let resolved = resolver.resolve(&batch).unwrap();

        assert_eq!(resolved["literal"], Value::from("spy | not a placeholder"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancelled_before_first_entry() {
        let flag = CancellationFlag::new();
        flag.cancel();
        let err = resolver()
            .resolve_with_cancel(&VariableMap::new(), &vars(&[("a", "x".into())]), &flag)
            .unwrap_err();
        assert_eq!(err, TemplateError::Cancelled);
    }

    #[test]
    fn test_cancellation_check_can_be_disabled() {
        let settings = EngineSettings {
            check_cancellation: false,
            ..EngineSettings::default()
        };
        let resolver = VariableResolver::new(Arc::new(FilterRegistry::empty()), settings);
        let flag = CancellationFlag::new();
        flag.cancel();

        let resolved = resolver
            .resolve_with_cancel(&VariableMap::new(), &vars(&[("a", "x".into())]), &flag)
            .unwrap();
        assert_eq!(resolved["a"], Value::from("x"));
    }

    #[test]
    fn test_strict_settings_reject_malformed_entries() {
        let resolver = VariableResolver::new(
            Arc::new(FilterRegistry::empty()),
            EngineSettings::default().strict(),
        );
        assert!(resolver.tokenizer().is_strict());

        let err = resolver
            .resolve(&vars(&[("a", "{{ open".into())]))
            .unwrap_err();
        assert!(matches!(err.root_cause(), TemplateError::MalformedTemplate { .. }));
    }

    #[test]
    fn test_plain_reference_keeps_float() {
        let resolved = resolver()
            .resolve(&vars(&[("b", Value::Float(3.5)), ("c", "{{ b }}".into())]))
            .unwrap();
        assert_eq!(resolved["c"], Value::Float(3.5));
    }

    #[test]
    fn test_keyword_boundary_setting() {
        let batch = vars(&[("iffy", "maybe".into()), ("copy", "{{ iffy }}".into())]);

        // By default `iffy` opens a conditional, which renders nothing.
        let resolved = resolver().resolve(&batch).unwrap();
        assert_eq!(resolved["copy"], Value::from(""));

        let settings = EngineSettings {
            keyword_boundary: true,
            ..EngineSettings::default()
        };
        let resolved = VariableResolver::new(Arc::new(FilterRegistry::empty()), settings)
            .resolve(&batch)
            .unwrap();
        assert_eq!(resolved["copy"], Value::from("maybe"));
    }
}
