//! Stencil Domain - Core template types
//!
//! This crate defines the data model shared by the Stencil template engine:
//! values, tokens, errors and settings. All types here are pure Rust with no
//! I/O dependencies.

pub mod error;
pub mod settings;
pub mod token;
pub mod value;

pub use error::{FilterError, FilterResult, PathError, TemplateError, TemplateResult};
pub use settings::EngineSettings;
pub use token::{Arg, FilterCall, Literal, Token};
pub use value::{Value, VariableMap};
