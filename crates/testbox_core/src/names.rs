//! Target name rules.
//!
//! Target names end up as file names (`lib<name>.a`, `bin/<name>`), so they are restricted to a
//! portable character set.

use crate::errors::ConfigError;

/// Check that `name` is usable as a target name.
///
/// ## Returns
/// - `Ok(())` for names matching `[A-Za-z0-9_][A-Za-z0-9_.-]*`.
/// - `Err(ConfigError::InvalidName)` otherwise, with a short reason.
///
/// ## Examples
/// ```rust
/// use testbox_core::validate_name;
///
/// assert!(validate_name("test_hello").is_ok());
/// assert!(validate_name("../escape").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("name is empty"));
    };
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(invalid("name must start with a letter, digit or `_`"));
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
        return Err(invalid("name contains a character outside `[A-Za-z0-9_.-]`"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_names() {
        for name in ["core", "gtest", "test_hello", "gtest_main", "lib-2.0", "_private", "9lives"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_rejects_empty() {
        let err = validate_name("").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName { reason: "name is empty", .. }));
    }

    #[test]
    fn test_rejects_path_like_names() {
        for name in ["../x", ".hidden", "a/b", "a b", "-flag", "tëst"] {
            assert!(validate_name(name).is_err(), "{name} should be rejected");
        }
    }
}
