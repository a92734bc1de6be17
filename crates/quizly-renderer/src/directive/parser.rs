//! Block directive line parsing.
//!
//! Openers take the whole line: `:::name[arguments]{options}`.
//! Closers are a line of at least as many colons as their opener.

use super::DirectiveArgs;

/// A line that opens or closes a block directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockLine {
    /// `:::name[arguments]{options}`
    Open {
        name: String,
        args: DirectiveArgs,
        colon_count: usize,
    },
    /// `:::`
    Close { colon_count: usize },
}

/// Parse a line as a block directive opener or closer.
///
/// Returns `None` for every other line.
pub(crate) fn parse_block_line(line: &str) -> Option<BlockLine> {
    let trimmed = line.trim();
    if !trimmed.starts_with(":::") {
        return None;
    }

    let colon_count = trimmed.chars().take_while(|&c| c == ':').count();
    let after_colons = trimmed[colon_count..].trim_start();

    if after_colons.is_empty() {
        return Some(BlockLine::Close { colon_count });
    }

    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_end];
    if !is_valid_directive_name(name) {
        return None;
    }

    let after_name = after_colons[name_end..].trim_start();
    let (arguments, consumed) = delimited(after_name, '[', ']');
    let (options, _) = delimited(after_name[consumed..].trim_start(), '{', '}');

    Some(BlockLine::Open {
        name: name.to_owned(),
        args: DirectiveArgs::parse(arguments, options),
        colon_count,
    })
}

/// Valid names contain only alphanumeric characters, hyphens, and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Extract the contents of a leading `open ... close` group, honoring nesting.
///
/// Returns (contents, `bytes_consumed`); `("", 0)` when `s` does not start with
/// `open` or the group is unterminated.
fn delimited(s: &str, open: char, close: char) -> (&str, usize) {
    if !s.starts_with(open) {
        return ("", 0);
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return (&s[open.len_utf8()..i], i + close.len_utf8());
            }
        }
    }

    ("", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open(line: &str) -> (String, DirectiveArgs, usize) {
        match parse_block_line(line) {
            Some(BlockLine::Open {
                name,
                args,
                colon_count,
            }) => (name, args, colon_count),
            other => panic!("expected opener, got {other:?}"),
        }
    }

    #[test]
    fn test_opener_with_arguments_and_options() {
        let (name, args, colons) = open(r#":::quizly[unit1/quiz_intro]{qnumber="2.1"}"#);
        assert_eq!(name, "quizly");
        assert_eq!(args.arguments, vec!["unit1/quiz_intro"]);
        assert_eq!(args.get("qnumber"), Some("2.1"));
        assert_eq!(colons, 3);
    }

    #[test]
    fn test_opener_with_spacing() {
        let (name, args, colons) = open("  :::: quizly [q1] {#x}");
        assert_eq!(name, "quizly");
        assert_eq!(args.arguments, vec!["q1"]);
        assert_eq!(args.id.as_deref(), Some("x"));
        assert_eq!(colons, 4);
    }

    #[test]
    fn test_opener_without_arguments() {
        let (name, args, _) = open(":::note");
        assert_eq!(name, "note");
        assert!(args.arguments.is_empty());
    }

    #[test]
    fn test_closer() {
        assert_eq!(
            parse_block_line(":::"),
            Some(BlockLine::Close { colon_count: 3 })
        );
        assert_eq!(
            parse_block_line("::::::   "),
            Some(BlockLine::Close { colon_count: 6 })
        );
    }

    #[test]
    fn test_not_block_lines() {
        assert_eq!(parse_block_line(":quizname: quiz_eval"), None);
        assert_eq!(parse_block_line("::leaf[x]"), None);
        assert_eq!(parse_block_line("text ::: more"), None);
        assert_eq!(parse_block_line(":::bad@name"), None);
        assert_eq!(parse_block_line(""), None);
    }

    #[test]
    fn test_delimited() {
        assert_eq!(delimited("[a [b]] rest", '[', ']'), ("a [b]", 7));
        assert_eq!(delimited("[unclosed", '[', ']'), ("", 0));
        assert_eq!(delimited("none", '{', '}'), ("", 0));
    }

    #[test]
    fn test_is_valid_directive_name() {
        assert!(is_valid_directive_name("quizly"));
        assert!(is_valid_directive_name("active-code_2"));
        assert!(!is_valid_directive_name(""));
        assert!(!is_valid_directive_name("a.b"));
    }
}
