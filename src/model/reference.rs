//! Model reference parsing.

use std::fmt;

use crate::error::{Error, Result};

/// A repository id plus an optional variant (usually a quantization level).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReference {
    pub repo_id: String,
    pub variant: Option<String>,
}

impl ModelReference {
    /// Parse `repo[:variant]`.
    ///
    /// Returns `Ok(None)` for an empty string, which means no remote lookup
    /// should happen. Only the first `:` separates; the rest of the string is
    /// the variant verbatim. A `:` with nothing after it is rejected.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        if raw.is_empty() {
            return Ok(None);
        }

        let (repo_id, variant) = match raw.split_once(':') {
            Some((repo, variant)) => (repo, Some(variant.to_string())),
            None => (raw, None),
        };

        if repo_id.is_empty() || variant.as_deref() == Some("") {
            return Err(Error::InvalidReference(raw.to_string()));
        }

        Ok(Some(Self {
            repo_id: repo_id.to_string(),
            variant,
        }))
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{}:{}", self.repo_id, variant),
            None => write!(f, "{}", self.repo_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_no_reference() {
        assert_eq!(ModelReference::parse("").unwrap(), None);
    }

    #[test]
    fn test_without_variant() {
        for raw in ["acme/bar", "bar", "acme/bar-GGUF", "a/b/c"] {
            let parsed = ModelReference::parse(raw).unwrap().unwrap();
            assert_eq!(parsed.repo_id, raw);
            assert_eq!(parsed.variant, None);
        }
    }

    #[test]
    fn test_splits_on_first_colon_only() {
        let parsed = ModelReference::parse("acme/foo:Q4:extra").unwrap().unwrap();
        assert_eq!(parsed.repo_id, "acme/foo");
        assert_eq!(parsed.variant.as_deref(), Some("Q4:extra"));
    }

    #[test]
    fn test_empty_variant_is_invalid() {
        let err = ModelReference::parse("acme/foo-GGUF:").unwrap_err();
        assert!(matches!(err, Error::InvalidReference(ref raw) if raw == "acme/foo-GGUF:"));
    }

    #[test]
    fn test_empty_repo_is_invalid() {
        let err = ModelReference::parse(":Q4_K_M").unwrap_err();
        assert!(matches!(err, Error::InvalidReference(ref raw) if raw == ":Q4_K_M"));
    }

    #[test]
    fn test_display_round_trips() {
        let parsed = ModelReference::parse("acme/foo:Q4").unwrap().unwrap();
        assert_eq!(parsed.to_string(), "acme/foo:Q4");
    }
}
