//! Domain error types

use thiserror::Error;

/// Errors raised while tokenizing, evaluating or resolving templates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// A variable lookup missed and no fallback filter supplied a value.
    #[error("variable not found: {name}")]
    VariableNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// A pipeline names a filter that is not registered.
    #[error("function not found: {name}")]
    FunctionNotFound {
        /// Name of the missing filter.
        name: String,
    },

    /// A filter ran and returned an error that was not suppressed.
    #[error("function '{name}' failed to apply: {source}")]
    FunctionApplyFailed {
        /// Name of the failing filter.
        name: String,
        /// What the filter reported.
        #[source]
        source: FilterError,
    },

    /// Batch variables reference each other in a cycle.
    #[error("circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency {
        /// Names along the cycle, ending with the name that closed it.
        chain: Vec<String>,
    },

    /// A token that cannot produce a value was evaluated.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Strict tokenizing rejected malformed placeholder syntax.
    #[error("malformed template at byte {offset}: {reason}")]
    MalformedTemplate {
        /// Byte offset of the offending opener.
        offset: usize,
        /// What was wrong.
        reason: String,
    },

    /// Resolution was cancelled between two variables.
    #[error("operation cancelled")]
    Cancelled,

    /// Context for which batch entry failed.
    #[error("failed to render variable '{name}': {source}")]
    Variable {
        /// Batch entry being resolved.
        name: String,
        /// Underlying failure.
        #[source]
        source: Box<TemplateError>,
    },

    /// The template could not be tokenized.
    #[error("failed to parse template: {0}")]
    ParseFailed(#[source] Box<TemplateError>),

    /// The template could not be rendered.
    #[error("failed to render template: {0}")]
    RenderFailed(#[source] Box<TemplateError>),
}

impl TemplateError {
    /// Creates a variable-not-found error.
    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound { name: name.into() }
    }

    /// Creates a function-not-found error.
    pub fn function_not_found(name: impl Into<String>) -> Self {
        Self::FunctionNotFound { name: name.into() }
    }

    /// Wraps `self` with the name of the batch entry that failed.
    #[must_use]
    pub fn in_variable(self, name: impl Into<String>) -> Self {
        Self::Variable {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through the wrapping kinds.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Variable { source, .. } | Self::ParseFailed(source) | Self::RenderFailed(source) => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Returns true if the root cause is a missing variable.
    #[must_use]
    pub fn is_variable_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::VariableNotFound { .. })
    }

    /// Returns true if the root cause is a missing filter.
    #[must_use]
    pub fn is_function_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::FunctionNotFound { .. })
    }

    /// Returns true if the root cause is a failing filter.
    #[must_use]
    pub fn is_function_apply_failed(&self) -> bool {
        matches!(self.root_cause(), Self::FunctionApplyFailed { .. })
    }

    /// Returns true if the root cause is a dependency cycle.
    #[must_use]
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self.root_cause(), Self::CircularDependency { .. })
    }

    /// Returns true if the root cause is cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root_cause(), Self::Cancelled)
    }
}

/// Errors returned by filter functions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The piped value has a shape the filter does not accept.
    #[error("expected {expected}, got {actual}")]
    InvalidValue {
        /// Accepted shapes.
        expected: &'static str,
        /// Shape that was received.
        actual: &'static str,
    },

    /// A required positional argument is absent.
    #[error("missing argument at position {0}")]
    MissingArgument(usize),

    /// A positional argument has the wrong shape or content.
    #[error("invalid argument at position {index}: {reason}")]
    InvalidArgument {
        /// Zero-based argument position.
        index: usize,
        /// What was wrong.
        reason: String,
    },

    /// The filter has no usable result for its input, but a fallback filter
    /// later in the pipeline may supply one.
    #[error("no value, fallback allowed: {0}")]
    AllowsDefault(String),

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl FilterError {
    /// Shortcut for an invalid piped value.
    #[must_use]
    pub const fn invalid_value(expected: &'static str, actual: &'static str) -> Self {
        Self::InvalidValue { expected, actual }
    }

    /// Shortcut for an invalid argument.
    pub fn invalid_argument(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            index,
            reason: reason.into(),
        }
    }

    /// Returns true for the sentinel a fallback filter may swallow.
    #[must_use]
    pub const fn allows_default(&self) -> bool {
        matches!(self, Self::AllowsDefault(_))
    }
}

/// A nested lookup that could not be followed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A map has no entry for the segment.
    #[error("key '{segment}' not found")]
    KeyNotFound {
        /// Missing key.
        segment: String,
    },

    /// A list index is past the end.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// List length.
        len: usize,
    },

    /// A list was indexed with something that is not a number.
    #[error("segment '{segment}' is not a valid list index")]
    InvalidIndex {
        /// Offending segment.
        segment: String,
    },

    /// A scalar was asked for a child.
    #[error("cannot look up '{segment}' in a {kind}")]
    NotAContainer {
        /// Segment that could not be followed.
        segment: String,
        /// Shape of the scalar.
        kind: &'static str,
    },
}

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Result type alias for filter functions.
pub type FilterResult = Result<crate::value::Value, FilterError>;
