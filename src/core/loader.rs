//! Rule documents
//!
//! Declarative rule sets stored as TOML or JSON. A document carries an
//! optional `base` prefix shared by every rule, matcher settings, and the
//! ordered rule list:
//!
//! ```toml
//! rules_version = "2"
//! base = "/databases/{database}/documents"
//!
//! [matcher]
//! precedence = "first_allowing"
//!
//! [[rules]]
//! name = "own-user-document"
//! match = "/users/{userId}"
//! allow = ["read", "write"]
//! guard = { uid_equals = "userId" }
//! ```

use crate::core::rules::{MatcherConfig, PathPattern, PathRuleMatcher, Rule, RuleDef};
use crate::error::{RulesError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The only supported document format version
pub const RULES_VERSION: &str = "2";

fn default_version() -> String {
    RULES_VERSION.to_string()
}

/// A declarative rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Format version; must be "2"
    #[serde(default = "default_version")]
    pub rules_version: String,

    /// Pattern prefixed to every rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Matcher settings
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Rules in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

impl RuleDocument {
    /// Create an empty document
    pub fn new() -> Self {
        RuleDocument {
            rules_version: default_version(),
            base: None,
            matcher: MatcherConfig::default(),
            rules: Vec::new(),
        }
    }

    /// Append a rule
    pub fn add_rule(&mut self, rule: RuleDef) {
        self.rules.push(rule);
    }

    /// Parse a document from TOML
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let doc: RuleDocument = toml::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Parse a document from JSON
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: RuleDocument = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the format version
    pub fn validate(&self) -> Result<()> {
        if self.rules_version != RULES_VERSION {
            return Err(RulesError::UnsupportedVersion(self.rules_version.clone()));
        }
        Ok(())
    }

    /// Compile into a matcher, applying `base` to every rule
    pub fn into_matcher(self) -> Result<PathRuleMatcher> {
        self.validate()?;

        let base = self.base.as_deref().map(PathPattern::parse).transpose()?;

        let rules = self
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, def)| {
                let pattern = PathPattern::parse(&def.pattern)?;
                let pattern = match &base {
                    Some(base) => PathPattern::prefixed(base, &pattern)?,
                    None => pattern,
                };
                Rule::from_parts(index, def.name, pattern, def.operations, def.guard)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PathRuleMatcher::from_rules(rules, self.matcher))
    }
}

impl Default for RuleDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a rule document from disk
///
/// Files ending in `.json` are read as JSON, everything else as TOML.
pub fn load_rules(path: impl AsRef<Path>) -> Result<RuleDocument> {
    let path = path.as_ref();
    debug!("Loading rules from {}", path.display());

    let text = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        RuleDocument::from_json_str(&text)
    } else {
        RuleDocument::from_toml_str(&text)
    }
}
