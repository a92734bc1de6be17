//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand `${VAR}` references in a string using the process environment.
///
/// Values without `${` are returned unchanged, bare `$` included. Once a value
/// contains `${`, bare `$VAR` references in it are expanded too.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |var| std::env::var(var).ok())
}

/// Expand `${VAR}` references using an arbitrary variable lookup.
fn expand_with<F>(value: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let missing = std::cell::RefCell::new(Vec::new());
    let context = |var: &str| -> Result<Option<String>, NoLookupError> {
        let found = lookup(var);
        if found.is_none() {
            missing.borrow_mut().push(var.to_owned());
        }
        Ok(found)
    };
    let expanded = shellexpand::env_with_context(value, context)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })?;

    // Unset variables without a `:-default` are an error; defaulted ones are not.
    if let Some(var) = missing
        .into_inner()
        .into_iter()
        .find(|var| value.contains(&format!("${{{var}}}")))
    {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        });
    }

    Ok(expanded)
}

/// Lookups never fail; unset variables are reported as `None`.
#[derive(Debug)]
enum NoLookupError {}

impl std::fmt::Display for NoLookupError {
    fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {}
    }
}

impl std::error::Error for NoLookupError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_env(var: &str) -> Option<String> {
        match var {
            "COURSE" => Some("thinkcspy".to_owned()),
            "STATIC" => Some("_static".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_simple_var() {
        let result = expand_with("${COURSE}", "build.basecourse", course_env).unwrap();
        assert_eq!(result, "thinkcspy");
    }

    #[test]
    fn test_default_ignored_when_set() {
        let result = expand_with("${COURSE:-fallback}", "build.basecourse", course_env).unwrap();
        assert_eq!(result, "thinkcspy");
    }

    #[test]
    fn test_default_used_when_unset() {
        let result = expand_with("${MISSING:-fallback}", "build.basecourse", course_env).unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_missing_var_names_field() {
        let err = expand_with("${MISSING}", "build.basecourse", course_env).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING"));
        assert!(err.to_string().contains("build.basecourse"));
    }

    #[test]
    fn test_embedded_vars() {
        let result =
            expand_with("out/${STATIC}/${COURSE}", "build.static_dir", course_env).unwrap();
        assert_eq!(result, "out/_static/thinkcspy");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_with("$COURSE", "build.basecourse", course_env).unwrap();
        assert_eq!(result, "$COURSE");
    }

    #[test]
    fn test_bare_dollar_expanded_alongside_braced() {
        let result = expand_with("${STATIC}/$COURSE", "database.path", course_env).unwrap();
        assert_eq!(result, "_static/thinkcspy");

        // An unset bare reference stays as written and is not an error.
        let result = expand_with("${STATIC}/$NOPE", "database.path", course_env).unwrap();
        assert_eq!(result, "_static/$NOPE");
    }

    #[test]
    fn test_process_environment_fallback() {
        let result = expand_env("${QUIZLY_SURELY_UNSET_VAR:-ok}", "test.field").unwrap();
        assert_eq!(result, "ok");
    }
}
