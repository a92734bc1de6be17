//! Named-placeholder templates.
//!
//! Templates use `%(key)s` placeholders filled from a string map; `%%` renders
//! a literal `%`. Every placeholder must name a key present in the map.
//!
//! ```
//! use std::collections::BTreeMap;
//! use quizly_renderer::template::format_template;
//!
//! let mut values = BTreeMap::new();
//! values.insert("divid".to_owned(), "q1".to_owned());
//!
//! let html = format_template(r#"<div id="%(divid)s" style="width: 100%%">"#, &values).unwrap();
//! assert_eq!(html, r#"<div id="q1" style="width: 100%">"#);
//! ```

use std::collections::BTreeMap;

/// Template formatting error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A placeholder names a key that is not in the value map.
    #[error("template placeholder %({key})s has no value")]
    MissingKey {
        /// The missing key.
        key: String,
    },
    /// A `%` is not followed by `%` or a complete `(key)s` placeholder.
    #[error("malformed template placeholder at byte {offset}")]
    Malformed {
        /// Byte offset of the offending `%`.
        offset: usize,
    },
}

/// Substitute every `%(key)s` placeholder in `template` with `values[key]`.
///
/// # Errors
///
/// Returns [`TemplateError::MissingKey`] for a placeholder without a value and
/// [`TemplateError::Malformed`] for a `%` that does not start a placeholder.
pub fn format_template(
    template: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let at = offset + pos;
        let after = &rest[pos + 1..];

        let consumed = if after.starts_with('%') {
            out.push('%');
            2
        } else if let Some(inner) = after.strip_prefix('(') {
            let close = inner.find(')').ok_or(TemplateError::Malformed { offset: at })?;
            let key = &inner[..close];
            if !inner[close + 1..].starts_with('s') {
                return Err(TemplateError::Malformed { offset: at });
            }
            let value = values.get(key).ok_or_else(|| TemplateError::MissingKey {
                key: key.to_owned(),
            })?;
            out.push_str(value);
            // '%' + '(' + key + ')' + 's'
            key.len() + 4
        } else {
            return Err(TemplateError::Malformed { offset: at });
        };

        rest = &rest[pos + consumed..];
        offset = at + consumed;
    }

    out.push_str(rest);
    Ok(out)
}
