//! # pathguard - Path-Scoped Access Rules
//!
//! `pathguard` decides whether a single read or write on a document path is
//! allowed. It evaluates ordered, document-store style rules:
//!
//! - **Path patterns** with literal segments, `{capture}` and `{rest=**}`
//! - **Guards** over the caller identity and captured segments
//! - **Deny by default** when no rule grants the operation
//! - **Rule documents** in TOML or JSON, with an optional shared `base` prefix
//! - **Decision caching** with an LRU shared across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use pathguard::{AuthContext, Guard, Operation, OperationSet, PathRuleMatcher, Result, RuleDef};
//!
//! # fn main() -> Result<()> {
//! let matcher = PathRuleMatcher::new(vec![
//!     RuleDef::new("/users/{userId}", OperationSet::ALL, Guard::uid_equals("userId")),
//!     RuleDef::new("/posts/{postId}", OperationSet::ALL, Guard::is_authenticated()),
//! ])?;
//!
//! let alice = AuthContext::user("alice");
//! assert!(matcher.evaluate(Operation::Write, "users/alice", &alice)?.allowed);
//! assert!(!matcher.evaluate(Operation::Write, "users/bob", &alice)?.allowed);
//!
//! // Reject the request outright
//! assert!(matcher.check_access(Operation::Read, "posts/p1", &AuthContext::anonymous()).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ## Rule Documents
//!
//! ```rust
//! use pathguard::{AuthContext, Operation, Result, RuleDocument};
//!
//! # fn main() -> Result<()> {
//! let doc = RuleDocument::from_toml_str(r#"
//!     rules_version = "2"
//!     base = "/databases/{database}/documents"
//!
//!     [[rules]]
//!     match = "/{document=**}"
//!     allow = ["read", "write"]
//!     guard = "authenticated"
//! "#)?;
//!
//! let matcher = doc.into_matcher()?;
//! let d = matcher.evaluate(
//!     Operation::Read,
//!     "databases/(default)/documents/groups/g1",
//!     &AuthContext::user("alice"),
//! )?;
//! assert!(d.allowed);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;

// Re-export core modules internally so crate:: paths in core still work
pub(crate) use crate::core::validation;

pub use crate::core::{
    loader::{load_rules, RuleDocument, RULES_VERSION},
    rules::{
        AuthContext, AuthProvider, Bindings, CachedMatcher, Decision, DecisionCache, Guard,
        MatcherConfig, Operation, OperationSet, PathPattern, PathRuleMatcher, Precedence, Rule,
        RuleDef, RuleId, Segment,
    },
    validation::ResourcePath,
};
pub use crate::error::{Result, RulesError};
