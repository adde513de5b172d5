//! Template parsing and evaluation
//!
//! ```
//! use std::sync::Arc;
//!
//! use stencil_application::ports::FilterRegistry;
//! use stencil_application::template::{Evaluator, tokenize};
//! use stencil_domain::{Value, VariableMap};
//!
//! let mut scope = VariableMap::new();
//! scope.insert("host".to_string(), Value::from("localhost"));
//!
//! let evaluator = Evaluator::new(Arc::new(FilterRegistry::empty()));
//! let output = evaluator.render(&tokenize("http://{{host}}/api"), &scope).unwrap();
//! assert_eq!(output, "http://localhost/api");
//! ```

mod evaluator;
mod pipeline;
mod tokenizer;

pub use evaluator::Evaluator;
pub use pipeline::parse_pipeline;
pub use tokenizer::{Tokenizer, has_placeholders, is_valid_variable_name, tokenize};
