//! Validation for resource paths and capture variable names
//!
//! Resource paths are `/`-delimited document paths such as `users/alice` or
//! `/analytics/2024/q1`. This module splits them into segments and rejects
//! anything a document store would refuse to address.

use crate::error::{RulesError, Result};
use regex::Regex;

/// A validated, non-empty resource path split into segments
///
/// # Rules
/// - At most one leading `/` is accepted and ignored
/// - At least one segment
/// - No empty segments (`users//alice`, trailing `/`)
/// - No relative components (`.` or `..`)
///
/// # Examples
///
/// ```
/// use pathguard::ResourcePath;
///
/// let path = ResourcePath::parse("/users/alice").unwrap();
/// assert_eq!(path.segments(), &["users", "alice"]);
/// assert_eq!(path.to_string(), "users/alice");
///
/// assert!(ResourcePath::parse("").is_err());
/// assert!(ResourcePath::parse("users//alice").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath(Vec<String>);

impl ResourcePath {
    /// Parse a `/`-delimited path
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path is empty or has a malformed segment.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Err(RulesError::invalid_path(path, "path cannot be empty"));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        Self::from_segments(&segments).map_err(|err| match err {
            RulesError::InvalidPath { reason, .. } => RulesError::invalid_path(path, reason),
            other => other,
        })
    }

    /// Build a path from already split segments
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self> {
        if segments.is_empty() {
            return Err(RulesError::invalid_path("", "path cannot be empty"));
        }

        let joined = || {
            segments
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join("/")
        };

        let mut owned = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let segment = segment.as_ref();
            if segment.is_empty() {
                return Err(RulesError::invalid_path(
                    &joined(),
                    format!("segment {} is empty", i),
                ));
            }
            if segment == "." || segment == ".." {
                return Err(RulesError::invalid_path(
                    &joined(),
                    format!("segment {} is a relative component '{}'", i, segment),
                ));
            }
            if segment.contains('/') {
                return Err(RulesError::invalid_path(
                    &joined(),
                    format!("segment {} contains '/'", i),
                ));
            }
            owned.push(segment.to_string());
        }

        Ok(ResourcePath(owned))
    }

    /// Get the path segments
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a parsed path has at least one segment
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl std::str::FromStr for ResourcePath {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        ResourcePath::parse(s)
    }
}

/// Pattern for valid capture variable names
const CAPTURE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// Check whether `name` is a valid capture variable name
///
/// Names start with a letter or underscore, followed by letters, digits,
/// or underscores (`userId`, `document`, `_id`).
pub fn is_valid_capture_name(name: &str) -> bool {
    let re = Regex::new(CAPTURE_NAME_PATTERN).expect("capture name pattern is valid");
    re.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_path() {
        let path = ResourcePath::parse("users/alice").unwrap();
        assert_eq!(path.segments(), &["users", "alice"]);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_leading_slash_ignored() {
        assert_eq!(
            ResourcePath::parse("/users/alice").unwrap(),
            ResourcePath::parse("users/alice").unwrap()
        );
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            ResourcePath::parse(""),
            Err(RulesError::InvalidPath { .. })
        ));
        assert!(matches!(
            ResourcePath::parse("/"),
            Err(RulesError::InvalidPath { .. })
        ));
        let empty: [&str; 0] = [];
        assert!(ResourcePath::from_segments(&empty).is_err());
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(ResourcePath::parse("users//alice").is_err());
        assert!(ResourcePath::parse("users/alice/").is_err());
        assert!(ResourcePath::parse("//users").is_err());
        assert!(ResourcePath::from_segments(&["users", ""]).is_err());
    }

    #[test]
    fn test_relative_components_rejected() {
        assert!(ResourcePath::parse("users/../admin").is_err());
        assert!(ResourcePath::parse("./users").is_err());
    }

    #[test]
    fn test_segment_with_slash_rejected() {
        assert!(ResourcePath::from_segments(&["users", "a/b"]).is_err());
    }

    #[test]
    fn test_error_reports_original_path() {
        match ResourcePath::parse("/users//alice") {
            Err(RulesError::InvalidPath { path, reason }) => {
                assert_eq!(path, "/users//alice");
                assert!(reason.contains("segment 1"));
            }
            other => panic!("expected InvalidPath, got {:?}", other),
        }
    }

    #[test]
    fn test_display_joins_segments() {
        let path = ResourcePath::from_segments(&["analytics", "2024", "q1"]).unwrap();
        assert_eq!(path.to_string(), "analytics/2024/q1");
    }

    #[test]
    fn test_capture_names() {
        assert!(is_valid_capture_name("userId"));
        assert!(is_valid_capture_name("document"));
        assert!(is_valid_capture_name("_id"));
        assert!(is_valid_capture_name("post2"));

        assert!(!is_valid_capture_name(""));
        assert!(!is_valid_capture_name("2post"));
        assert!(!is_valid_capture_name("user-id"));
        assert!(!is_valid_capture_name("user id"));
        assert!(!is_valid_capture_name("doc=**"));
    }
}
