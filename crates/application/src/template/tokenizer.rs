//! Template tokenizer for `{{ ... }}` syntax
//!
//! Splits a template into literal text and classified placeholders.

use stencil_domain::{TemplateError, TemplateResult, Token};

use super::pipeline::parse_pipeline;

const OPENER: &str = "{{";
const CLOSER: &str = "}}";

/// Turns template strings into token sequences.
///
/// The default tokenizer is lenient: an opener without a closer, or
/// placeholder contents that fit no class, degrade to literal output and never
/// fail. [`Tokenizer::strict`] reports both as [`TemplateError::MalformedTemplate`].
///
/// Contents that start with `if`, `/if` or `else` are conditional markers, so
/// `{{ iffy }}` is an `if` with condition `fy`.
/// [`Tokenizer::with_keyword_boundary`] requires whitespace or the end of the
/// contents after the keyword instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tokenizer {
    strict: bool,
    keyword_boundary: bool,
}

impl Tokenizer {
    /// Creates a lenient tokenizer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict: false,
            keyword_boundary: false,
        }
    }

    /// Creates a tokenizer that rejects malformed placeholders.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict: true,
            keyword_boundary: false,
        }
    }

    /// Returns a copy that only treats whole words as conditional keywords.
    #[must_use]
    pub const fn with_keyword_boundary(mut self) -> Self {
        self.keyword_boundary = true;
        self
    }

    /// Returns true if this tokenizer rejects malformed placeholders.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Tokenizes a template.
    ///
    /// # Errors
    ///
    /// Only a strict tokenizer fails, with [`TemplateError::MalformedTemplate`].
    pub fn tokenize(&self, template: &str) -> TemplateResult<Vec<Token>> {
        if !self.strict && !has_placeholders(template) {
            return Ok(text_only(template));
        }
        self.scan(template)
    }

    fn scan(&self, template: &str) -> TemplateResult<Vec<Token>> {
        let strict = self.strict;
        let mut tokens = Vec::new();
        let mut text = String::new();
        let mut rest = template;
        let mut offset = 0;

        while let Some(open) = rest.find(OPENER) {
            let inner = &rest[open + OPENER.len()..];
            let Some(close) = inner.find(CLOSER) else {
                if strict {
                    return Err(TemplateError::MalformedTemplate {
                        offset: offset + open,
                        reason: "placeholder is never closed".to_string(),
                    });
                }
                break;
            };

            let token = classify(&inner[..close], self.keyword_boundary);
            if strict && let Token::Undefined { raw } = &token {
                return Err(TemplateError::MalformedTemplate {
                    offset: offset + open,
                    reason: format!("'{raw}' is not a variable or filter pipeline"),
                });
            }

            text.push_str(&rest[..open]);
            if !text.is_empty() {
                tokens.push(Token::Text(std::mem::take(&mut text)));
            }
            tokens.push(token);

            let consumed = open + OPENER.len() + close + CLOSER.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        // Unclosed tail joins the pending literal run.
        text.push_str(rest);
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }

        Ok(tokens)
    }
}

/// Tokenizes leniently. Never fails.
#[must_use]
pub fn tokenize(template: &str) -> Vec<Token> {
    // A lenient scan has no error path.
    Tokenizer::new()
        .scan(template)
        .unwrap_or_else(|_| text_only(template))
}

/// Returns true if the input contains both delimiters.
#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    input.contains(OPENER) && input.contains(CLOSER)
}

/// Validates a bare variable name: `[A-Za-z_][A-Za-z0-9_.]*`.
///
/// Dots are allowed so dotted names read naturally; they are part of the name.
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();

    // First character must be an ASCII letter or underscore
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn text_only(template: &str) -> Vec<Token> {
    if template.is_empty() {
        Vec::new()
    } else {
        vec![Token::Text(template.to_string())]
    }
}

/// Classifies trimmed placeholder contents, first match wins.
fn classify(contents: &str, boundary: bool) -> Token {
    let raw = contents.trim();
    let leading = |word: &str| keyword(raw, word, boundary);

    if let Some(condition) = leading("if") {
        Token::IfStart {
            raw: raw.to_string(),
            condition: condition.to_string(),
        }
    } else if leading("/if").is_some() {
        Token::IfEnd {
            raw: raw.to_string(),
        }
    } else if leading("else").is_some() {
        Token::Else {
            raw: raw.to_string(),
        }
    } else if raw.contains(" ? ") && raw.contains(" : ") {
        Token::ShorthandIf {
            raw: raw.to_string(),
        }
    } else if is_valid_variable_name(raw) {
        Token::Variable {
            name: raw.to_string(),
        }
    } else if raw.contains('|') {
        let (name, pipeline) = parse_pipeline(raw);
        Token::FilteredVariable {
            raw: raw.to_string(),
            name,
            pipeline,
        }
    } else {
        Token::Undefined {
            raw: raw.to_string(),
        }
    }
}

/// Matches `word` as a leading keyword and returns the trimmed remainder.
///
/// With `boundary`, the keyword must be followed by whitespace or nothing.
fn keyword<'a>(raw: &'a str, word: &str, boundary: bool) -> Option<&'a str> {
    let rest = raw.strip_prefix(word)?;
    if !boundary || rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}
