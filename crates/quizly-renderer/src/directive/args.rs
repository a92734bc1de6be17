//! Directive argument and option parsing.
//!
//! Parses the `[arg1 arg2]{#id .class key="value"}` part of a directive opener.

use std::collections::BTreeMap;

/// Arguments and options from a directive opener.
///
/// `:::name[arguments]{#id .class key="value"}`
///
/// # Example
///
/// ```
/// use quizly_renderer::directive::DirectiveArgs;
///
/// let args = DirectiveArgs::parse("unit1/quiz_intro", r#"#intro .wide qnumber="1.4""#);
/// assert_eq!(args.arguments, vec!["unit1/quiz_intro"]);
/// assert_eq!(args.id.as_deref(), Some("intro"));
/// assert_eq!(args.classes, vec!["wide"]);
/// assert_eq!(args.get("qnumber"), Some("1.4"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Whitespace-separated arguments from `[...]`.
    pub arguments: Vec<String>,
    /// ID from options: `{#id}`.
    pub id: Option<String>,
    /// Classes from options: `{.class1 .class2}`.
    pub classes: Vec<String>,
    /// Key-value options: `{key="value"}`.
    pub options: BTreeMap<String, String>,
}

impl DirectiveArgs {
    /// Parse the bracket and brace contents (without the delimiters).
    #[must_use]
    pub fn parse(arguments: &str, options: &str) -> Self {
        let mut args = Self {
            arguments: arguments.split_whitespace().map(str::to_owned).collect(),
            ..Self::default()
        };

        let mut remaining = options.trim();

        while !remaining.is_empty() {
            remaining = remaining.trim_start();

            if let Some(rest) = remaining.strip_prefix('#') {
                let (id, rest) = split_selector(rest);
                args.id = Some(id.to_owned());
                remaining = rest;
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let (class, rest) = split_selector(rest);
                args.classes.push(class.to_owned());
                remaining = rest;
            } else if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.options.insert(key.to_owned(), value.to_owned());
                remaining = rest;
            } else {
                // Skip one unrecognized character
                let skip = remaining.chars().next().map_or(0, char::len_utf8);
                remaining = &remaining[skip..];
            }
        }

        args
    }

    /// Get an option value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// Split an `#id` or `.class` body from what follows it.
fn split_selector(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Parse a key-value pair from the options string.
///
/// Supports: `key="value"`, `key='value'`, `key=value`
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let key = s[..eq_pos].trim();

    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];

    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            let end_quote = stripped.find(quote)?;
            return Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, &after_eq[..end], &after_eq[end..]))
}
