//! Path-scoped access rules for document stores
//!
//! Provides allow/deny decisions for single operations with:
//! - Compiled path patterns (literal, `{capture}`, `{rest=**}`)
//! - Guard predicates over the caller identity and captured segments
//! - Ordered rules with deny-by-default
//! - Optional LRU decision caching

mod cache;
mod guard;
mod matcher;
mod pattern;
mod provider;
mod rule;

pub use cache::{CachedMatcher, DecisionCache};
pub use guard::{AuthContext, Bindings, Guard};
pub use matcher::{Decision, MatcherConfig, PathRuleMatcher, Precedence};
pub use pattern::{PathPattern, Segment};
pub use provider::AuthProvider;
pub use rule::{Operation, OperationSet, Rule, RuleDef, RuleId};
