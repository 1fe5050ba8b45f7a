//! Guard predicates for rules
//!
//! A guard decides whether a matched rule grants the operation. Guards see
//! the caller's [`AuthContext`] and the [`Bindings`] captured from the path:
//! - `Authenticated` - the request carries a verified identity
//! - `UidEquals(var)` - the caller's uid equals the segment bound to `var`
//! - `All` / `Any` / `Not` - boolean combinators
//! - `Always` / `Never` - constants

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of the caller, supplied per request
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthContext {
    /// Whether the request carries a verified identity
    #[serde(default)]
    pub authenticated: bool,
    /// User ID of the caller, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl AuthContext {
    /// Unauthenticated caller
    pub fn anonymous() -> Self {
        AuthContext::default()
    }

    /// Authenticated caller with a user ID
    pub fn user(uid: impl Into<String>) -> Self {
        AuthContext {
            authenticated: true,
            uid: Some(uid.into()),
        }
    }

    /// Authenticated caller without a user ID
    pub fn authenticated() -> Self {
        AuthContext {
            authenticated: true,
            uid: None,
        }
    }

    /// The user ID, only when authenticated
    pub fn verified_uid(&self) -> Option<&str> {
        if self.authenticated {
            self.uid.as_deref()
        } else {
            None
        }
    }
}

/// Values captured from a path, keyed by variable name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn insert(&mut self, name: String, value: String) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Boolean predicate over `(AuthContext, Bindings)`
///
/// # Examples
///
/// ```
/// use pathguard::{AuthContext, Bindings, Guard};
///
/// let guard = Guard::is_authenticated().and(Guard::uid_equals("userId"));
///
/// let mut bindings = Bindings::new();
/// bindings.insert("userId".to_string(), "alice".to_string());
///
/// assert!(guard.evaluate(&AuthContext::user("alice"), &bindings));
/// assert!(!guard.evaluate(&AuthContext::user("bob"), &bindings));
/// assert!(!guard.evaluate(&AuthContext::anonymous(), &bindings));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Always grants
    Always,
    /// Never grants
    Never,
    /// Grants any authenticated caller
    Authenticated,
    /// Grants an authenticated caller whose uid equals the bound variable
    UidEquals(String),
    /// Grants when every inner guard grants (empty = grants)
    All(Vec<Guard>),
    /// Grants when any inner guard grants (empty = denies)
    Any(Vec<Guard>),
    /// Inverts the inner guard
    Not(Box<Guard>),
}

impl Guard {
    pub fn always() -> Self {
        Guard::Always
    }

    pub fn never() -> Self {
        Guard::Never
    }

    pub fn is_authenticated() -> Self {
        Guard::Authenticated
    }

    pub fn uid_equals(variable: impl Into<String>) -> Self {
        Guard::UidEquals(variable.into())
    }

    /// Conjunction; flattens nested `All`
    pub fn and(self, other: Guard) -> Self {
        match self {
            Guard::All(mut guards) => {
                guards.push(other);
                Guard::All(guards)
            }
            first => Guard::All(vec![first, other]),
        }
    }

    /// Disjunction; flattens nested `Any`
    pub fn or(self, other: Guard) -> Self {
        match self {
            Guard::Any(mut guards) => {
                guards.push(other);
                Guard::Any(guards)
            }
            first => Guard::Any(vec![first, other]),
        }
    }

    /// Negation
    pub fn negate(guard: Guard) -> Self {
        match guard {
            Guard::Not(inner) => *inner,
            other => Guard::Not(Box::new(other)),
        }
    }

    /// Evaluate this guard
    ///
    /// Never panics; a variable missing from `bindings` makes `UidEquals`
    /// false (rules reject such guards at construction).
    pub fn evaluate(&self, auth: &AuthContext, bindings: &Bindings) -> bool {
        match self {
            Guard::Always => true,
            Guard::Never => false,
            Guard::Authenticated => auth.authenticated,
            Guard::UidEquals(variable) => match (auth.verified_uid(), bindings.get(variable)) {
                (Some(uid), Some(bound)) => uid == bound,
                _ => false,
            },
            Guard::All(guards) => guards.iter().all(|g| g.evaluate(auth, bindings)),
            Guard::Any(guards) => guards.iter().any(|g| g.evaluate(auth, bindings)),
            Guard::Not(inner) => !inner.evaluate(auth, bindings),
        }
    }

    /// Variables this guard reads from the bindings
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Guard::UidEquals(variable) => out.push(variable),
            Guard::All(guards) | Guard::Any(guards) => {
                for guard in guards {
                    guard.collect_variables(out);
                }
            }
            Guard::Not(inner) => inner.collect_variables(out),
            Guard::Always | Guard::Never | Guard::Authenticated => {}
        }
    }
}

impl std::ops::Not for Guard {
    type Output = Guard;

    fn not(self) -> Guard {
        Guard::negate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        let mut bindings = Bindings::new();
        for (k, v) in pairs {
            bindings.insert(k.to_string(), v.to_string());
        }
        bindings
    }

    #[test]
    fn test_authenticated() {
        let guard = Guard::is_authenticated();
        assert!(guard.evaluate(&AuthContext::user("alice"), &Bindings::new()));
        assert!(guard.evaluate(&AuthContext::authenticated(), &Bindings::new()));
        assert!(!guard.evaluate(&AuthContext::anonymous(), &Bindings::new()));
    }

    #[test]
    fn test_uid_equals() {
        let guard = Guard::uid_equals("userId");
        let bindings = bind(&[("userId", "alice")]);

        assert!(guard.evaluate(&AuthContext::user("alice"), &bindings));
        assert!(!guard.evaluate(&AuthContext::user("bob"), &bindings));
        assert!(!guard.evaluate(&AuthContext::authenticated(), &bindings));
    }

    #[test]
    fn test_uid_equals_requires_authentication() {
        // A uid without verified authentication does not count
        let auth = AuthContext {
            authenticated: false,
            uid: Some("alice".to_string()),
        };
        let bindings = bind(&[("userId", "alice")]);
        assert!(!Guard::uid_equals("userId").evaluate(&auth, &bindings));
    }

    #[test]
    fn test_uid_equals_missing_binding() {
        let guard = Guard::uid_equals("userId");
        assert!(!guard.evaluate(&AuthContext::user("alice"), &Bindings::new()));
    }

    #[test]
    fn test_constants() {
        let auth = AuthContext::anonymous();
        assert!(Guard::always().evaluate(&auth, &Bindings::new()));
        assert!(!Guard::never().evaluate(&auth, &Bindings::new()));
    }

    #[test]
    fn test_combinators() {
        let bindings = bind(&[("owner", "alice")]);
        let alice = AuthContext::user("alice");
        let bob = AuthContext::user("bob");

        let owner_only = Guard::is_authenticated().and(Guard::uid_equals("owner"));
        assert!(owner_only.evaluate(&alice, &bindings));
        assert!(!owner_only.evaluate(&bob, &bindings));

        let not_owner = !Guard::uid_equals("owner");
        assert!(!not_owner.evaluate(&alice, &bindings));
        assert!(not_owner.evaluate(&bob, &bindings));

        let either = Guard::uid_equals("owner").or(Guard::never());
        assert!(either.evaluate(&alice, &bindings));
        assert!(!either.evaluate(&bob, &bindings));
    }

    #[test]
    fn test_empty_combinators() {
        let auth = AuthContext::anonymous();
        assert!(Guard::All(vec![]).evaluate(&auth, &Bindings::new()));
        assert!(!Guard::Any(vec![]).evaluate(&auth, &Bindings::new()));
    }

    #[test]
    fn test_combinators_flatten() {
        let guard = Guard::always().and(Guard::never()).and(Guard::is_authenticated());
        assert_eq!(
            guard,
            Guard::All(vec![Guard::Always, Guard::Never, Guard::Authenticated])
        );

        let double = !!Guard::is_authenticated();
        assert_eq!(double, Guard::Authenticated);
    }

    #[test]
    fn test_variables() {
        let guard = Guard::uid_equals("a")
            .and(!Guard::uid_equals("b"))
            .or(Guard::is_authenticated());
        assert_eq!(guard.variables(), vec!["a", "b"]);
        assert!(Guard::always().variables().is_empty());
    }

    #[test]
    fn test_guard_serde_shape() {
        let guard: Guard = serde_json::from_str(r#"{"uid_equals":"userId"}"#).unwrap();
        assert_eq!(guard, Guard::uid_equals("userId"));

        let guard: Guard = serde_json::from_str(r#""authenticated""#).unwrap();
        assert_eq!(guard, Guard::Authenticated);

        let guard: Guard =
            serde_json::from_str(r#"{"all":["authenticated",{"not":"never"}]}"#).unwrap();
        assert_eq!(
            guard,
            Guard::All(vec![Guard::Authenticated, Guard::Not(Box::new(Guard::Never))])
        );
    }
}
