//! Variable resolution module
//!
//! Resolves batches of variables whose values may reference each other.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use stencil_application::ports::FilterRegistry;
//! use stencil_application::variable_resolver::VariableResolver;
//! use stencil_domain::{EngineSettings, Value, VariableMap};
//!
//! let resolver = VariableResolver::new(Arc::new(FilterRegistry::empty()), EngineSettings::default());
//!
//! let mut vars = VariableMap::new();
//! vars.insert("url".to_string(), Value::from("http://{{host}}/api"));
//! vars.insert("host".to_string(), Value::from("localhost"));
//!
//! let resolved = resolver.resolve(&vars).unwrap();
//! assert_eq!(resolved["url"], Value::from("http://localhost/api"));
//! ```

mod engine;
mod graph;

pub use engine::VariableResolver;
pub use graph::DependencyGraph;
