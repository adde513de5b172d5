//! Filter pipeline parser
//!
//! Splits the contents of a filtered placeholder such as
//! `title | default:'Untitled' | shorten:20` into the base variable name and
//! its filter calls. Separators inside `'...'` or `"..."` are ignored; a quote
//! preceded by an odd number of backslashes does not close its span.

use stencil_domain::{Arg, FilterCall, Literal};

/// Splits `raw` into the base variable name and the ordered filter calls.
///
/// # Examples
///
/// ```
/// use stencil_application::template::parse_pipeline;
/// use stencil_domain::Arg;
///
/// let (name, calls) = parse_pipeline("x | f:'a,b', \"c\\\"d\"");
/// assert_eq!(name, "x");
/// assert_eq!(calls[0].args, vec![Arg::string("a,b"), Arg::string("c\"d")]);
/// ```
#[must_use]
pub fn parse_pipeline(raw: &str) -> (String, Vec<FilterCall>) {
    let mut segments = split_respecting_quotes(raw, '|').into_iter();
    let name = segments.next().unwrap_or_default();
    let calls = segments.map(|segment| parse_filter_call(&segment)).collect();
    (name, calls)
}

/// Parses one `name[:arg,arg,...]` segment.
fn parse_filter_call(segment: &str) -> FilterCall {
    let segment = segment.trim();
    let (name, raw_args) = match find_unquoted(segment, ':') {
        Some(colon) => (segment[..colon].trim(), &segment[colon + 1..]),
        None => (segment, ""),
    };

    let args = split_respecting_quotes(raw_args, ',')
        .iter()
        .map(|arg| classify_arg(arg))
        .collect();

    FilterCall::new(name, args)
}

/// Classifies one trimmed argument.
///
/// Quoted text is always a string. Unquoted text is tried as an integer, a
/// float, then a boolean word; anything else names a variable.
fn classify_arg(arg: &str) -> Arg {
    for quote in ['"', '\''] {
        if let Some(inner) = strip_quotes(arg, quote) {
            let escaped = format!("\\{quote}");
            return Arg::Literal(Literal::String(inner.replace(&escaped, &quote.to_string())));
        }
    }

    if arg.is_empty() {
        return Arg::Literal(Literal::String(String::new()));
    }

    if let Ok(int) = arg.parse::<i64>() {
        return Arg::Literal(Literal::Int(int));
    }

    if is_float_literal(arg)
        && let Ok(float) = arg.parse::<f64>()
    {
        return Arg::Literal(Literal::Float(float));
    }

    match arg {
        "true" | "yes" => Arg::Literal(Literal::Bool(true)),
        "false" | "no" => Arg::Literal(Literal::Bool(false)),
        _ => Arg::VariableRef(arg.to_string()),
    }
}

/// Returns the text between a matching pair of surrounding `quote`s.
fn strip_quotes(arg: &str, quote: char) -> Option<&str> {
    if arg.len() >= 2 && arg.starts_with(quote) && arg.ends_with(quote) {
        Some(&arg[1..arg.len() - 1])
    } else {
        None
    }
}

/// Digits with an optional sign, point and exponent. Keeps words such as
/// `inf` or `nan` out of the float class.
fn is_float_literal(arg: &str) -> bool {
    arg.chars().any(|c| c.is_ascii_digit())
        && arg
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// Tracks whether the scan position is inside a quoted span.
#[derive(Debug, Default)]
struct QuoteState {
    quote: Option<char>,
    backslashes: usize,
}

impl QuoteState {
    /// Advances over `c`; returns true if `c` sits outside any quoted span
    /// and is not itself an opening quote.
    fn step(&mut self, c: char) -> bool {
        let escaped = self.backslashes % 2 == 1;
        self.backslashes = if c == '\\' { self.backslashes + 1 } else { 0 };

        match self.quote {
            Some(open) => {
                if c == open && !escaped {
                    self.quote = None;
                }
                false
            }
            None if c == '"' || c == '\'' => {
                self.quote = Some(c);
                false
            }
            None => true,
        }
    }
}

/// Byte index of the first `target` outside quotes.
fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut state = QuoteState::default();
    s.char_indices()
        .find(|&(_, c)| state.step(c) && c == target)
        .map(|(i, _)| i)
}

/// Splits on `sep` outside quotes and trims every part. A trailing empty part
/// is dropped, so `""` and `"a,"` yield no and one part respectively.
fn split_respecting_quotes(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut state = QuoteState::default();
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if state.step(c) && c == sep {
            parts.push(s[start..i].trim().to_string());
            start = i + c.len_utf8();
        }
    }

    let tail = s[start..].trim();
    if !tail.is_empty() {
        parts.push(tail.to_string());
    }

    parts
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(i: i64) -> Arg {
        Arg::Literal(Literal::Int(i))
    }

    #[test]
    fn test_name_only() {
        let (name, calls) = parse_pipeline("content |");
        assert_eq!(name, "content");
        assert!(calls.is_empty());
    }

    #[test]
    fn test_filters_without_args() {
        let (name, calls) = parse_pipeline(" content | trim | length ");
        assert_eq!(name, "content");
        assert_eq!(
            calls,
            vec![FilterCall::new("trim", vec![]), FilterCall::new("length", vec![])]
        );
    }

    #[test]
    fn test_numeric_args() {
        let (_, calls) = parse_pipeline("x | summary:255, -3 | scale:1.5");
        assert_eq!(calls[0].args, vec![int(255), int(-3)]);
        assert_eq!(calls[1].args, vec![Arg::Literal(Literal::Float(1.5))]);
    }

    #[test]
    fn test_quoted_args_keep_separators() {
        let (_, calls) = parse_pipeline(r#"x | f:'a,b', "c\"d""#);
        assert_eq!(calls[0].name, "f");
        assert_eq!(calls[0].args, vec![Arg::string("a,b"), Arg::string("c\"d")]);
    }

    #[test]
    fn test_quoted_pipe_and_colon() {
        let (_, calls) = parse_pipeline("x | join:' | ' | wrap:'a:b'");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec![Arg::string(" | ")]);
        assert_eq!(calls[1].args, vec![Arg::string("a:b")]);
    }

    #[test]
    fn test_other_quote_kind_is_literal_inside_span() {
        let (_, calls) = parse_pipeline(r#"x | f:"it's", 'say "hi"'"#);
        assert_eq!(
            calls[0].args,
            vec![Arg::string("it's"), Arg::string(r#"say "hi""#)]
        );
    }

    #[test]
    fn test_escaped_single_quote() {
        let (_, calls) = parse_pipeline(r"x | f:'it\'s, fine'");
        assert_eq!(calls[0].args, vec![Arg::string("it's, fine")]);
    }

    #[test]
    fn test_double_backslash_does_not_escape() {
        // `\\'` is an escaped backslash followed by a closing quote.
        let (_, calls) = parse_pipeline(r"x | f:'a\\', b");
        assert_eq!(calls[0].args, vec![Arg::string(r"a\\"), Arg::var("b")]);
    }

    #[test]
    fn test_quoted_numbers_stay_strings() {
        let (_, calls) = parse_pipeline("x | f:'42', \"true\"");
        assert_eq!(calls[0].args, vec![Arg::string("42"), Arg::string("true")]);
    }

    #[test]
    fn test_bool_words() {
        let (_, calls) = parse_pipeline("x | f:true, yes, false, no");
        let bools: Vec<Arg> = [true, true, false, false]
            .into_iter()
            .map(|b| Arg::Literal(Literal::Bool(b)))
            .collect();
        assert_eq!(calls[0].args, bools);
    }

    #[test]
    fn test_bare_words_are_variable_refs() {
        let (_, calls) = parse_pipeline("x | default:fallback_title, app.name");
        assert_eq!(
            calls[0].args,
            vec![Arg::var("fallback_title"), Arg::var("app.name")]
        );
    }

    #[test]
    fn test_float_words_are_not_numbers() {
        let (_, calls) = parse_pipeline("x | f:inf, nan, 1e3");
        assert_eq!(
            calls[0].args,
            vec![
                Arg::var("inf"),
                Arg::var("nan"),
                Arg::Literal(Literal::Float(1000.0))
            ]
        );
    }

    #[test]
    fn test_empty_argument_list() {
        let (_, calls) = parse_pipeline("x | f:");
        assert!(calls[0].args.is_empty());
    }

    #[test]
    fn test_lone_quote_is_variable_ref() {
        let (_, calls) = parse_pipeline("x | f:a, '");
        assert_eq!(calls[0].args, vec![Arg::var("a"), Arg::var("'")]);
    }

    #[test]
    fn test_split_respecting_quotes() {
        assert_eq!(split_respecting_quotes("a, 'b,c' ,d", ','), vec!["a", "'b,c'", "d"]);
        assert_eq!(split_respecting_quotes("a,,b", ','), vec!["a", "", "b"]);
        assert!(split_respecting_quotes("  ", ',').is_empty());
    }
}
