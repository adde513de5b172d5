//! Filter port and registry
//!
//! A filter is a pure function `(value, args) -> value` registered under a
//! name. Registries are assembled once through [`FilterRegistryBuilder`] and
//! are read-only afterwards, so one registry can serve concurrent renders.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use stencil_domain::{FilterResult, Value};

/// How the evaluator treats a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Transforms its input.
    #[default]
    Transform,
    /// Supplies a fallback for a missing or empty value. A pipeline that
    /// contains one tolerates a missing base variable and swallows
    /// [`FilterError::AllowsDefault`](stencil_domain::FilterError::AllowsDefault)
    /// from the other filters.
    Fallback,
}

/// A named value transformation.
pub trait Filter: Send + Sync {
    /// Applies the filter to the piped `value` with positional `args`.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`](stencil_domain::FilterError) when the input or
    /// arguments are not acceptable.
    fn apply(&self, value: &Value, args: &[Value]) -> FilterResult;

    /// Returns how the evaluator should treat this filter.
    fn kind(&self) -> FilterKind {
        FilterKind::Transform
    }
}

/// Adapts a plain function into a [`Filter`].
struct FnFilter<F> {
    func: F,
    kind: FilterKind,
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&Value, &[Value]) -> FilterResult + Send + Sync,
{
    fn apply(&self, value: &Value, args: &[Value]) -> FilterResult {
        (self.func)(value, args)
    }

    fn kind(&self) -> FilterKind {
        self.kind
    }
}

/// An immutable name to filter mapping.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// Returns a builder for constructing a registry.
    #[must_use]
    pub fn builder() -> FilterRegistryBuilder {
        FilterRegistryBuilder::default()
    }

    /// Creates a registry with no filters.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merges `overrides` over `defaults`; override entries win on collision.
    #[must_use]
    pub fn merged(defaults: &Self, overrides: &Self) -> Self {
        Self::builder().extend(defaults).extend(overrides).build()
    }

    /// Looks up a filter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(AsRef::as_ref)
    }

    /// Returns true if a filter is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Returns true if `name` is registered as a fallback filter.
    #[must_use]
    pub fn is_fallback(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|filter| filter.kind() == FilterKind::Fallback)
    }

    /// Returns all registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if no filters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

/// Builder for [`FilterRegistry`]. Later registrations replace earlier ones.
#[derive(Default)]
pub struct FilterRegistryBuilder {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterRegistryBuilder {
    /// Registers a transform function.
    #[must_use]
    pub fn filter<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> FilterResult + Send + Sync + 'static,
    {
        self.register(
            name,
            FnFilter {
                func,
                kind: FilterKind::Transform,
            },
        )
    }

    /// Registers a fallback (default-class) function.
    #[must_use]
    pub fn fallback<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> FilterResult + Send + Sync + 'static,
    {
        self.register(
            name,
            FnFilter {
                func,
                kind: FilterKind::Fallback,
            },
        )
    }

    /// Registers any [`Filter`] implementation.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, filter: impl Filter + 'static) -> Self {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Copies every entry of `registry`, replacing same-named entries.
    #[must_use]
    pub fn extend(mut self, registry: &FilterRegistry) -> Self {
        self.filters.extend(
            registry
                .filters
                .iter()
                .map(|(name, filter)| (name.clone(), Arc::clone(filter))),
        );
        self
    }

    /// Builds the registry.
    #[must_use]
    pub fn build(self) -> FilterRegistry {
        FilterRegistry {
            filters: self.filters,
        }
    }
}
