//! Branch name validation.
//!
//! Branch names end up inside metadata sort keys and blob paths, so the
//! allowed alphabet is deliberately small: ASCII letters, digits and
//! `.` `_` `-` `/`. The key separator `#` is never allowed.

use super::error::VersionError;

pub const MAX_BRANCH_NAME_LEN: usize = 128;

pub fn validate_branch_name(name: &str) -> Result<(), VersionError> {
    let invalid = |reason: &str| {
        Err(VersionError::InvalidInput(format!(
            "invalid branch name '{name}': {reason}"
        )))
    };

    if name.is_empty() {
        return invalid("must not be empty");
    }
    if name.len() > MAX_BRANCH_NAME_LEN {
        return invalid("too long");
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/')))
    {
        return invalid(&format!("contains forbidden character {ch:?}"));
    }
    if name.contains("..") {
        return invalid("must not contain '..'");
    }
    if name.contains("//") {
        return invalid("must not contain '//'");
    }
    if name.starts_with(['.', '/']) || name.ends_with(['.', '/']) {
        return invalid("must not start or end with '.' or '/'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_names() {
        for name in ["main", "draft", "feature/tone-v2", "release_1.2"] {
            assert!(validate_branch_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_key_separator() {
        assert!(validate_branch_name("a#b").is_err());
    }

    #[test]
    fn test_rejects_malformed_names() {
        for name in ["", "a..b", "/lead", "trail/", ".hidden", "a b", "x//y"] {
            assert!(validate_branch_name(name).is_err(), "{name:?}");
        }
        assert!(validate_branch_name(&"a".repeat(MAX_BRANCH_NAME_LEN + 1)).is_err());
    }
}
