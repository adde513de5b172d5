//! Token model for parsed templates
//!
//! A template is parsed into an ordered list of [`Token`]s. Tokens are plain
//! data; tokenizing and evaluation live in the application layer.

use crate::value::Value;

/// A literal filter argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted text, or an empty unquoted argument.
    String(String),
    /// An unquoted decimal integer.
    Int(i64),
    /// An unquoted float.
    Float(f64),
    /// `true`/`yes` or `false`/`no`.
    Bool(bool),
}

impl Literal {
    /// Converts the literal into a runtime value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Int(i) => Value::Int(*i),
            Self::Float(f) => Value::Float(*f),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

/// A positional filter argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A constant.
    Literal(Literal),
    /// A bare name looked up in the scope when the filter runs.
    VariableRef(String),
}

impl Arg {
    /// Shortcut for a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Shortcut for a variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Self::VariableRef(name.into())
    }
}

/// One `name:arg,arg` step of a filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    /// Registered filter name.
    pub name: String,
    /// Positional arguments in source order.
    pub args: Vec<Arg>,
}

impl FilterCall {
    /// Creates a filter call.
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Names of the variables referenced by this call's arguments.
    pub fn variable_refs(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|arg| match arg {
            Arg::VariableRef(name) => Some(name.as_str()),
            Arg::Literal(_) => None,
        })
    }
}

/// A classified template fragment.
///
/// `raw` always holds the trimmed text between the delimiters, or the literal
/// run for [`Token::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text outside placeholders.
    Text(String),
    /// `{{ name }}`.
    Variable {
        /// Variable name; identical to the raw contents.
        name: String,
    },
    /// `{{ name | filter:args | ... }}`.
    FilteredVariable {
        /// Raw placeholder contents.
        raw: String,
        /// Base variable name.
        name: String,
        /// Filters applied left to right.
        pipeline: Vec<FilterCall>,
    },
    /// `{{ if condition }}`; not evaluated.
    IfStart {
        /// Raw placeholder contents.
        raw: String,
        /// Text after the keyword.
        condition: String,
    },
    /// `{{ /if }}`; not evaluated.
    IfEnd {
        /// Raw placeholder contents.
        raw: String,
    },
    /// `{{ else }}`; not evaluated.
    Else {
        /// Raw placeholder contents.
        raw: String,
    },
    /// `{{ a ? b : c }}`; not evaluated.
    ShorthandIf {
        /// Raw placeholder contents.
        raw: String,
    },
    /// Placeholder contents that fit no other class. Rendered as its raw text.
    Undefined {
        /// Raw placeholder contents.
        raw: String,
    },
}

impl Token {
    /// Returns the raw text this token was built from.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Text(raw) | Self::Variable { name: raw } => raw,
            Self::FilteredVariable { raw, .. }
            | Self::IfStart { raw, .. }
            | Self::IfEnd { raw }
            | Self::Else { raw }
            | Self::ShorthandIf { raw }
            | Self::Undefined { raw } => raw,
        }
    }

    /// Returns the base variable name of variable tokens.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Variable { name } | Self::FilteredVariable { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns true for literal text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns true for tokens that evaluate to a value.
    #[must_use]
    pub const fn is_variable(&self) -> bool {
        matches!(self, Self::Variable { .. } | Self::FilteredVariable { .. })
    }

    /// Returns true for the conditional markers.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(
            self,
            Self::IfStart { .. } | Self::IfEnd { .. } | Self::Else { .. } | Self::ShorthandIf { .. }
        )
    }

    /// Every variable name this token reads: the base name and any
    /// variable-reference arguments of its pipeline.
    #[must_use]
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            Self::Variable { name } => vec![name.as_str()],
            Self::FilteredVariable { name, pipeline, .. } => std::iter::once(name.as_str())
                .chain(pipeline.iter().flat_map(FilterCall::variable_refs))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Reconstructs template source that tokenizes back to this token.
    #[must_use]
    pub fn to_source(&self) -> String {
        match self {
            Self::Text(raw) => raw.clone(),
            other => format!("{{{{ {} }}}}", other.raw()),
        }
    }
}
