//! Text filters

use std::sync::LazyLock;

use regex::Regex;
use stencil_domain::{FilterError, FilterResult, Value};

use super::{arg_int, arg_str, nil_value, value_str};

/// Words that `title` always upper-cases.
const ACRONYMS: &[&str] = &["ai", "gpt", "api", "json", "xml", "html", "css"];

struct SlugPatterns {
    /// Dot runs that do not sit between two digits.
    dots: [Regex; 3],
    hyphens: Regex,
}

static SLUG_PATTERNS: LazyLock<Result<SlugPatterns, regex::Error>> = LazyLock::new(|| {
    Ok(SlugPatterns {
        dots: [
            Regex::new(r"(\D)\.+(\D)")?,
            Regex::new(r"(\D)\.+(\d)")?,
            Regex::new(r"(\d)\.+(\D)")?,
        ],
        hyphens: Regex::new(r"[\s-]+")?,
    })
});

/// `trim[:chars]`: strips whitespace, or the given characters, from both ends.
pub fn trim(value: &Value, args: &[Value]) -> FilterResult {
    let text = value_str(value)?;
    Ok(Value::from(match args.first() {
        Some(_) => {
            let chars: Vec<char> = arg_str(args, 0)?.chars().collect();
            text.trim_matches(chars.as_slice())
        }
        None => text.trim(),
    }))
}

/// `shorten:n`: keeps the first `n` characters.
pub fn shorten(value: &Value, args: &[Value]) -> FilterResult {
    let text = value_str(value)?;
    let limit = usize::try_from(arg_int(args, 0)?)
        .map_err(|_| FilterError::invalid_argument(0, "length must not be negative"))?;
    Ok(Value::from(text.chars().take(limit).collect::<String>()))
}

/// `length`: character count of a string, or element count of a list or map.
pub fn length(value: &Value, _: &[Value]) -> FilterResult {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        Value::Nil => return Err(nil_value()),
        other => return Err(FilterError::invalid_value("string, list or map", other.type_name())),
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| FilterError::Failed("length does not fit in an integer".to_string()))
}

/// `lines`: splits a string on `\n`.
pub fn lines(value: &Value, _: &[Value]) -> FilterResult {
    Ok(value_str(value)?.split('\n').map(Value::from).collect::<Vec<_>>().into())
}

/// `join[:sep]`: joins list items as text, newline-separated by default.
pub fn join(value: &Value, args: &[Value]) -> FilterResult {
    let items = match value {
        Value::List(items) => items,
        Value::Nil => return Err(nil_value()),
        other => return Err(FilterError::invalid_value("list", other.type_name())),
    };
    let separator = if args.is_empty() { "\n" } else { arg_str(args, 0)? };

    Ok(Value::from(
        items.iter().map(Value::to_text).collect::<Vec<_>>().join(separator),
    ))
}

/// `split:sep`: splits a string into a list.
pub fn split(value: &Value, args: &[Value]) -> FilterResult {
    let text = value_str(value)?;
    let separator = arg_str(args, 0)?;
    Ok(text.split(separator).map(Value::from).collect::<Vec<_>>().into())
}

/// `concat:a,b,...`: appends string arguments.
pub fn concat(value: &Value, args: &[Value]) -> FilterResult {
    let mut text = value_str(value)?.to_string();
    for index in 0..args.len() {
        text.push_str(arg_str(args, index)?);
    }
    Ok(Value::String(text))
}

/// `slug`: lowercase, hyphen-separated form of a title.
pub fn slug(value: &Value, _: &[Value]) -> FilterResult {
    slugify(value_str(value)?)
        .map(Value::String)
        .map_err(|err| FilterError::Failed(err.to_string()))
}

/// Turns a title into a slug. Dots survive only between digits, so
/// `GPT-4.5 Preview` becomes `gpt-4.5-preview`.
///
/// # Errors
///
/// Returns an error if the built-in patterns fail to compile.
pub fn slugify(title: &str) -> Result<String, regex::Error> {
    let patterns = SLUG_PATTERNS.as_ref().map_err(Clone::clone)?;

    let lowered: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-' || c == '.'
            {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut slug = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    for dots in &patterns.dots {
        slug = dots.replace_all(&slug, "$1 $2").into_owned();
    }

    Ok(patterns.hyphens.replace_all(&slug, "-").into_owned())
}

/// `title[:acronym,...]`: turns a slug back into capitalised words.
pub fn title(value: &Value, args: &[Value]) -> FilterResult {
    let slug = value_str(value)?;
    let extra = (0..args.len())
        .map(|index| arg_str(args, index))
        .collect::<Result<Vec<_>, _>>()?;

    let words: Vec<String> = slug
        .split('-')
        .map(|word| {
            let is_acronym = ACRONYMS
                .iter()
                .chain(extra.iter())
                .any(|acronym| acronym.eq_ignore_ascii_case(word));
            if is_acronym {
                word.to_uppercase()
            } else {
                capitalize(word)
            }
        })
        .collect();

    Ok(Value::from(words.join(" ")))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// `upper`
pub fn upper(value: &Value, _: &[Value]) -> FilterResult {
    Ok(Value::from(value_str(value)?.to_uppercase()))
}

/// `lower`
pub fn lower(value: &Value, _: &[Value]) -> FilterResult {
    Ok(Value::from(value_str(value)?.to_lowercase()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim(&s("  hi \n"), &[]), Ok(s("hi")));
        assert_eq!(trim(&s("--hi--"), &[s("-")]), Ok(s("hi")));
        assert!(trim(&Value::Nil, &[]).unwrap_err().allows_default());
    }

    #[test]
    fn test_shorten_counts_characters() {
        assert_eq!(shorten(&s("Hello, World!"), &[Value::Int(5)]), Ok(s("Hello")));
        assert_eq!(shorten(&s("héllo"), &[Value::Int(2)]), Ok(s("hé")));
        assert_eq!(shorten(&s("abc"), &[Value::Int(10)]), Ok(s("abc")));
        assert_eq!(
            shorten(&s("abc"), &[]),
            Err(FilterError::MissingArgument(0))
        );
        assert!(shorten(&s("abc"), &[Value::Int(-1)]).is_err());
    }

    #[test]
    fn test_length() {
        assert_eq!(length(&s("Hello"), &[]), Ok(Value::Int(5)));
        assert_eq!(length(&Value::from(vec![1_i64, 2, 3]), &[]), Ok(Value::Int(3)));
        assert!(length(&Value::Bool(true), &[]).is_err());
    }

    #[test]
    fn test_lines_and_join() {
        let split = lines(&s("a\nb\nc"), &[]).unwrap();
        assert_eq!(split, Value::from(vec!["a", "b", "c"]));
        assert_eq!(join(&split, &[]), Ok(s("a\nb\nc")));
        assert_eq!(join(&split, &[s(", ")]), Ok(s("a, b, c")));
        assert_eq!(
            join(&Value::from(vec![Value::Int(1), Value::Bool(false)]), &[s("+")]),
            Ok(s("1+false"))
        );
    }

    #[test]
    fn test_split() {
        assert_eq!(
            split(&s("a,b"), &[s(",")]),
            Ok(Value::from(vec!["a", "b"]))
        );
        assert_eq!(split(&s("a,b"), &[]), Err(FilterError::MissingArgument(0)));
    }

    #[test]
    fn test_concat() {
        assert_eq!(concat(&s("a"), &[s("b"), s("c")]), Ok(s("abc")));
        assert!(matches!(
            concat(&s("a"), &[Value::Int(1)]),
            Err(FilterError::InvalidArgument { index: 0, .. })
        ));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World").unwrap(), "hello-world");
        assert_eq!(slugify("GPT-4.5 Preview").unwrap(), "gpt-4.5-preview");
        assert_eq!(slugify("Hello, World! @2023").unwrap(), "hello-world-2023");
        assert_eq!(slugify("file.name v2").unwrap(), "file-name-v2");
    }

    #[test]
    fn test_title() {
        assert_eq!(title(&s("hello-world"), &[]), Ok(s("Hello World")));
        assert_eq!(title(&s("gpt-4.5-preview"), &[]), Ok(s("GPT 4.5 Preview")));
        assert_eq!(title(&s("hello-world-2023"), &[]), Ok(s("Hello World 2023")));
        assert_eq!(title(&s("rust-sdk"), &[s("sdk")]), Ok(s("Rust SDK")));
    }

    #[test]
    fn test_case() {
        assert_eq!(upper(&s("abc"), &[]), Ok(s("ABC")));
        assert_eq!(lower(&s("ABC"), &[]), Ok(s("abc")));
    }
}
