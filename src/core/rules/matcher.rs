//! Rule matcher with deny-by-default
//!
//! Evaluates an operation on a resource path against an ordered rule list.
//! Key properties:
//! - Rules are compiled once and never change afterwards
//! - Rules are scanned in registration order
//! - No deciding rule means deny
//! - Evaluation is pure; matchers can be shared across threads without locks

use super::guard::AuthContext;
use super::provider::AuthProvider;
use super::rule::{Operation, Rule, RuleDef, RuleId};
use crate::error::{RulesError, Result};
use crate::validation::ResourcePath;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// How overlapping rules are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// The first rule whose pattern matches AND whose guard passes wins.
    /// A matching rule with a failing guard is skipped.
    #[default]
    FirstAllowing,
    /// The first rule whose pattern matches decides, with its guard as the answer.
    FirstMatch,
}

/// Matcher configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Overlap resolution policy
    #[serde(default)]
    pub precedence: Precedence,

    /// Capacity of the decision cache, if one is wanted
    ///
    /// `CachedMatcher::from_config` falls back to
    /// [`CachedMatcher::DEFAULT_CAPACITY`](super::CachedMatcher::DEFAULT_CAPACITY)
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the operation is permitted
    pub allowed: bool,
    /// Rule that decided, if any
    pub matched_rule: Option<RuleId>,
}

impl Decision {
    /// Default-deny decision (no rule decided)
    pub fn deny_default() -> Self {
        Decision {
            allowed: false,
            matched_rule: None,
        }
    }

    /// Turn a deny into `PermissionDenied`
    pub fn enforce(&self, operation: Operation, path: &str) -> Result<()> {
        if self.allowed {
            Ok(())
        } else {
            Err(RulesError::PermissionDenied {
                operation,
                path: path.to_string(),
            })
        }
    }
}

/// Ordered set of compiled rules
///
/// # Examples
///
/// ```
/// use pathguard::{AuthContext, Guard, OperationSet, Operation, PathRuleMatcher, RuleDef, RuleId};
///
/// let matcher = PathRuleMatcher::new(vec![
///     RuleDef::new("/users/{uid}", OperationSet::ALL, Guard::uid_equals("uid")),
///     RuleDef::new("/{document=**}", OperationSet::ALL, Guard::is_authenticated()),
/// ])
/// .unwrap();
///
/// let alice = AuthContext::user("alice");
///
/// let d = matcher.evaluate(Operation::Write, "users/alice", &alice).unwrap();
/// assert!(d.allowed);
/// assert_eq!(d.matched_rule, Some(RuleId(0)));
///
/// // First rule's guard fails, second rule grants
/// let d = matcher.evaluate(Operation::Write, "users/bob", &alice).unwrap();
/// assert_eq!(d.matched_rule, Some(RuleId(1)));
///
/// let d = matcher.evaluate(Operation::Read, "users/bob", &AuthContext::anonymous()).unwrap();
/// assert!(!d.allowed);
/// ```
#[derive(Debug, Clone)]
pub struct PathRuleMatcher {
    rules: Vec<Rule>,
    config: MatcherConfig,
}

impl PathRuleMatcher {
    /// Compile rule definitions with the default configuration
    pub fn new(defs: impl IntoIterator<Item = RuleDef>) -> Result<Self> {
        Self::with_config(defs, MatcherConfig::default())
    }

    /// Compile rule definitions with an explicit configuration
    ///
    /// # Errors
    ///
    /// Fails on the first rule that does not compile (`InvalidPattern`,
    /// `UnboundVariable`, `InvalidRule`).
    pub fn with_config(
        defs: impl IntoIterator<Item = RuleDef>,
        config: MatcherConfig,
    ) -> Result<Self> {
        let rules = defs
            .into_iter()
            .enumerate()
            .map(|(index, def)| Rule::compile(index, def))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_rules(rules, config))
    }

    /// Wrap rules that are already compiled (e.g. with a base prefix)
    pub(crate) fn from_rules(rules: Vec<Rule>, config: MatcherConfig) -> Self {
        info!(
            "Compiled {} rules (precedence: {:?})",
            rules.len(),
            config.precedence
        );
        PathRuleMatcher { rules, config }
    }

    /// Rules in registration order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by ID
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Evaluate an operation on a `/`-delimited path
    ///
    /// # Errors
    ///
    /// `InvalidPath` if the path is empty or has an empty or relative segment.
    pub fn evaluate(
        &self,
        operation: Operation,
        path: &str,
        auth: &AuthContext,
    ) -> Result<Decision> {
        let path = ResourcePath::parse(path).inspect_err(|e| warn!("Rejected request: {}", e))?;
        Ok(self.evaluate_path(operation, &path, auth))
    }

    /// Evaluate an operation on already split segments
    pub fn evaluate_segments<S: AsRef<str>>(
        &self,
        operation: Operation,
        segments: &[S],
        auth: &AuthContext,
    ) -> Result<Decision> {
        let path = ResourcePath::from_segments(segments)
            .inspect_err(|e| warn!("Rejected request: {}", e))?;
        Ok(self.evaluate_path(operation, &path, auth))
    }

    /// Evaluate an operation on a validated path
    pub fn evaluate_path(
        &self,
        operation: Operation,
        path: &ResourcePath,
        auth: &AuthContext,
    ) -> Decision {
        let segments = path.segments();

        for rule in self.rules.iter().filter(|r| r.governs(operation)) {
            let Some(bindings) = rule.pattern().match_segments(segments) else {
                continue;
            };

            let granted = rule.guard().evaluate(auth, &bindings);
            trace!(
                "Rule {} ({}) matched {}; guard {}",
                rule.id(),
                rule.label(),
                path,
                if granted { "passed" } else { "failed" }
            );

            if granted || self.config.precedence == Precedence::FirstMatch {
                let decision = Decision {
                    allowed: granted,
                    matched_rule: Some(rule.id()),
                };
                debug!(
                    "{} {} -> {} by rule {}",
                    operation,
                    path,
                    if granted { "allow" } else { "deny" },
                    rule.id()
                );
                return decision;
            }
        }

        debug!("{} {} -> deny (no rule granted)", operation, path);
        Decision::deny_default()
    }

    /// Evaluate with identity taken from an [`AuthProvider`]
    pub fn authorize(
        &self,
        operation: Operation,
        path: &str,
        provider: &dyn AuthProvider,
    ) -> Result<Decision> {
        let auth = provider.auth_context();
        self.evaluate(operation, path, &auth)
    }

    /// Evaluate and turn a deny into `PermissionDenied`
    pub fn check_access(&self, operation: Operation, path: &str, auth: &AuthContext) -> Result<()> {
        self.evaluate(operation, path, auth)?.enforce(operation, path)
    }
}
