//! Stencil Application - Template engine core
//!
//! This crate holds the algorithmic core of Stencil: the tokenizer, the
//! filter pipeline parser, the evaluator, the dependency graph used for batch
//! resolution and the use cases built on top of them. It depends only on the
//! domain crate; concrete filters and clocks are supplied through the
//! [`ports`].

pub mod cancel;
pub mod engine;
pub mod ports;
pub mod template;
pub mod use_cases;
pub mod variable_resolver;

pub use cancel::CancellationFlag;
pub use engine::Engine;
pub use ports::{Clock, Filter, FilterKind, FilterRegistry, FilterRegistryBuilder};
pub use template::{Evaluator, Tokenizer, parse_pipeline, tokenize};
pub use use_cases::{LayeredVariables, RenderTemplate, ResolveLayeredVariables};
pub use variable_resolver::{DependencyGraph, VariableResolver};
