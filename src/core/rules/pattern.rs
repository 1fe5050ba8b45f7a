//! Compiled path patterns
//!
//! Pattern text uses the document-rules syntax:
//! - `users` - literal segment, matched exactly (case-sensitive)
//! - `{userId}` - captures exactly one segment
//! - `{document=**}` - captures zero or more trailing segments (final segment only)

use super::guard::Bindings;
use crate::error::{RulesError, Result};
use crate::validation::is_valid_capture_name;
use std::collections::HashSet;

/// A single segment specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches one segment equal to the name
    Literal(String),
    /// Matches any single segment and binds it
    Capture(String),
    /// Matches all remaining segments and binds their `/`-joined form
    RecursiveCapture(String),
}

impl Segment {
    /// Variable bound by this segment, if any
    pub fn variable(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Capture(name) | Segment::RecursiveCapture(name) => Some(name),
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Literal(name) => write!(f, "{}", name),
            Segment::Capture(name) => write!(f, "{{{}}}", name),
            Segment::RecursiveCapture(name) => write!(f, "{{{}=**}}", name),
        }
    }
}

/// A compiled path pattern
///
/// # Examples
///
/// ```
/// use pathguard::PathPattern;
///
/// let pattern = PathPattern::parse("/users/{userId}").unwrap();
/// let bindings = pattern.match_segments(&["users", "alice"]).unwrap();
/// assert_eq!(bindings.get("userId"), Some("alice"));
///
/// assert!(pattern.match_segments(&["posts", "p1"]).is_none());
/// assert!(PathPattern::parse("/{rest=**}/tail").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile pattern text into segment specifiers
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.strip_prefix('/').unwrap_or(pattern);
        if trimmed.is_empty() {
            return Err(RulesError::invalid_pattern(pattern, "pattern cannot be empty"));
        }

        let segments = trimmed
            .split('/')
            .enumerate()
            .map(|(i, part)| Self::parse_segment(pattern, i, part))
            .collect::<Result<Vec<_>>>()?;

        Self::validate(pattern, &segments)?;
        Ok(PathPattern { segments })
    }

    /// Build a pattern from segment specifiers
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self> {
        let text = Self::render(&segments);
        for segment in &segments {
            match segment {
                Segment::Literal(name) => Self::check_literal(&text, name)?,
                Segment::Capture(name) | Segment::RecursiveCapture(name) => {
                    Self::check_capture_name(&text, name)?
                }
            }
        }
        Self::validate(&text, &segments)?;
        Ok(PathPattern { segments })
    }

    fn parse_segment(pattern: &str, index: usize, part: &str) -> Result<Segment> {
        if part.is_empty() {
            return Err(RulesError::invalid_pattern(
                pattern,
                format!("segment {} is empty", index),
            ));
        }

        match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
            Some(inner) => {
                let (name, recursive) = match inner.strip_suffix("=**") {
                    Some(name) => (name, true),
                    None => (inner, false),
                };
                Self::check_capture_name(pattern, name)?;
                if recursive {
                    Ok(Segment::RecursiveCapture(name.to_string()))
                } else {
                    Ok(Segment::Capture(name.to_string()))
                }
            }
            None => {
                Self::check_literal(pattern, part)?;
                Ok(Segment::Literal(part.to_string()))
            }
        }
    }

    fn check_literal(pattern: &str, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(RulesError::invalid_pattern(pattern, "literal segment is empty"));
        }
        if name == "." || name == ".." {
            return Err(RulesError::invalid_pattern(
                pattern,
                format!("relative segment '{}' can never match", name),
            ));
        }
        if name.contains(['{', '}', '/']) {
            return Err(RulesError::invalid_pattern(
                pattern,
                format!("malformed segment '{}'", name),
            ));
        }
        Ok(())
    }

    fn check_capture_name(pattern: &str, name: &str) -> Result<()> {
        if !is_valid_capture_name(name) {
            return Err(RulesError::invalid_pattern(
                pattern,
                format!("invalid capture name '{}'", name),
            ));
        }
        Ok(())
    }

    /// Structural invariants shared by both constructors
    fn validate(pattern: &str, segments: &[Segment]) -> Result<()> {
        if segments.is_empty() {
            return Err(RulesError::invalid_pattern(pattern, "pattern cannot be empty"));
        }

        let last = segments.len() - 1;
        let mut seen = HashSet::new();
        for (i, segment) in segments.iter().enumerate() {
            if matches!(segment, Segment::RecursiveCapture(_)) && i != last {
                return Err(RulesError::invalid_pattern(
                    pattern,
                    "recursive capture must be the final segment",
                ));
            }
            if let Some(name) = segment.variable() {
                if !seen.insert(name) {
                    return Err(RulesError::invalid_pattern(
                        pattern,
                        format!("duplicate capture name '{}'", name),
                    ));
                }
            }
        }

        Ok(())
    }

    fn render(segments: &[Segment]) -> String {
        let parts: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        format!("/{}", parts.join("/"))
    }

    /// Segment specifiers in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all variables this pattern binds
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::variable)
    }

    /// Whether the pattern binds `name`
    pub fn binds(&self, name: &str) -> bool {
        self.variables().any(|v| v == name)
    }

    /// Prefix this pattern with `base` (e.g. `/databases/{database}/documents`)
    pub fn prefixed(base: &PathPattern, pattern: &PathPattern) -> Result<Self> {
        let mut segments = base.segments.clone();
        segments.extend(pattern.segments.iter().cloned());
        let text = Self::render(&segments);
        Self::validate(&text, &segments)?;
        Ok(PathPattern { segments })
    }

    /// Match path segments against this pattern
    ///
    /// Returns the captured bindings on success. Segments are assumed to be
    /// validated (non-empty); see [`crate::ResourcePath`].
    pub fn match_segments<S: AsRef<str>>(&self, path: &[S]) -> Option<Bindings> {
        let mut bindings = Bindings::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::RecursiveCapture(name) => {
                    // Always final; swallows the rest, possibly nothing
                    let rest: Vec<&str> = path
                        .get(i..)
                        .unwrap_or(&[])
                        .iter()
                        .map(|s| s.as_ref())
                        .collect();
                    bindings.insert(name.clone(), rest.join("/"));
                    return Some(bindings);
                }
                Segment::Capture(name) => {
                    let part = path.get(i)?.as_ref();
                    if part.is_empty() {
                        return None;
                    }
                    bindings.insert(name.clone(), part.to_string());
                }
                Segment::Literal(literal) => {
                    if path.get(i)?.as_ref() != literal {
                        return None;
                    }
                }
            }
        }

        // No recursive tail: the whole path must be consumed
        if path.len() == self.segments.len() {
            Some(bindings)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Self::render(&self.segments))
    }
}

impl std::str::FromStr for PathPattern {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        PathPattern::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, path: &[&str]) -> bool {
        PathPattern::parse(pattern).unwrap().match_segments(path).is_some()
    }

    #[test]
    fn test_parse_segments() {
        let pattern = PathPattern::parse("/users/{userId}/posts/{rest=**}").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("users".to_string()),
                Segment::Capture("userId".to_string()),
                Segment::Literal("posts".to_string()),
                Segment::RecursiveCapture("rest".to_string()),
            ]
        );
        assert_eq!(pattern.variables().collect::<Vec<_>>(), vec!["userId", "rest"]);
    }

    #[test]
    fn test_leading_slash_optional() {
        assert_eq!(
            PathPattern::parse("users/{id}").unwrap(),
            PathPattern::parse("/users/{id}").unwrap()
        );
    }

    #[test]
    fn test_exact_match() {
        assert!(matches("/config/app", &["config", "app"]));
        assert!(!matches("/config/app", &["config", "other"]));
        assert!(!matches("/config/app", &["config"]));
        assert!(!matches("/config/app", &["config", "app", "extra"]));
    }

    #[test]
    fn test_case_sensitive_literals() {
        assert!(!matches("/Users/{id}", &["users", "alice"]));
    }

    #[test]
    fn test_single_capture() {
        let pattern = PathPattern::parse("/users/{userId}").unwrap();
        let bindings = pattern.match_segments(&["users", "alice"]).unwrap();
        assert_eq!(bindings.get("userId"), Some("alice"));

        assert!(pattern.match_segments(&["users"]).is_none());
        assert!(pattern.match_segments(&["users", "alice", "posts"]).is_none());
    }

    #[test]
    fn test_recursive_capture_zero_or_more() {
        let pattern = PathPattern::parse("/analytics/{document=**}").unwrap();

        let b = pattern.match_segments(&["analytics"]).unwrap();
        assert_eq!(b.get("document"), Some(""));

        let b = pattern.match_segments(&["analytics", "x"]).unwrap();
        assert_eq!(b.get("document"), Some("x"));

        let b = pattern.match_segments(&["analytics", "x", "y"]).unwrap();
        assert_eq!(b.get("document"), Some("x/y"));

        assert!(pattern.match_segments(&["other", "x"]).is_none());
    }

    #[test]
    fn test_root_recursive_capture() {
        let pattern = PathPattern::parse("/{document=**}").unwrap();
        assert!(pattern.match_segments(&["users"]).is_some());
        assert!(pattern.match_segments(&["a", "b", "c", "d"]).is_some());
    }

    #[test]
    fn test_recursive_capture_must_be_last() {
        let err = PathPattern::parse("/{rest=**}/tail").unwrap_err();
        assert!(matches!(err, RulesError::InvalidPattern { .. }));

        let err = PathPattern::from_segments(vec![
            Segment::RecursiveCapture("rest".to_string()),
            Segment::Literal("tail".to_string()),
        ])
        .unwrap_err();
        assert!(matches!(err, RulesError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(PathPattern::parse("").is_err());
        assert!(PathPattern::parse("/").is_err());
        assert!(PathPattern::from_segments(Vec::new()).is_err());
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        assert!(PathPattern::parse("/users//{id}").is_err());
        assert!(PathPattern::parse("/users/{id").is_err());
        assert!(PathPattern::parse("/users/id}").is_err());
        assert!(PathPattern::parse("/users/{}").is_err());
        assert!(PathPattern::parse("/users/{user-id}").is_err());
        assert!(PathPattern::parse("/users/{id=*}").is_err());
        assert!(PathPattern::parse("/users/{id}/").is_err());
        assert!(PathPattern::parse("/users/..").is_err());
        assert!(PathPattern::parse("/./users/{id}").is_err());
        assert!(PathPattern::from_segments(vec![Segment::Literal("..".into())]).is_err());
    }

    #[test]
    fn test_duplicate_capture_rejected() {
        let err = PathPattern::parse("/a/{id}/b/{id}").unwrap_err();
        match err {
            RulesError::InvalidPattern { reason, .. } => assert!(reason.contains("duplicate")),
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_display_round_trips_text() {
        let text = "/databases/{database}/documents/{document=**}";
        assert_eq!(PathPattern::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_prefixed() {
        let base = PathPattern::parse("/databases/{database}/documents").unwrap();
        let rule = PathPattern::parse("/users/{userId}").unwrap();
        let full = PathPattern::prefixed(&base, &rule).unwrap();

        let b = full
            .match_segments(&["databases", "(default)", "documents", "users", "alice"])
            .unwrap();
        assert_eq!(b.get("database"), Some("(default)"));
        assert_eq!(b.get("userId"), Some("alice"));

        let clash = PathPattern::parse("/{database}").unwrap();
        assert!(PathPattern::prefixed(&base, &clash).is_err());

        let recursive_base = PathPattern::parse("/{rest=**}").unwrap();
        assert!(PathPattern::prefixed(&recursive_base, &rule).is_err());
    }
}
