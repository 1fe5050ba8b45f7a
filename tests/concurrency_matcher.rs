//! Concurrent evaluation tests
//!
//! Matchers are immutable after construction and shared without locks;
//! cached matchers share one LRU behind a mutex.

use pathguard::{
    AuthContext, CachedMatcher, Guard, Operation, OperationSet, PathRuleMatcher, RuleDef, RuleId,
};
use std::sync::Arc;

fn rules() -> PathRuleMatcher {
    PathRuleMatcher::new(vec![
        RuleDef::new("/users/{uid}", OperationSet::ALL, Guard::uid_equals("uid")),
        RuleDef::new("/{document=**}", OperationSet::ALL, Guard::is_authenticated()),
    ])
    .unwrap()
}

#[test]
fn test_shared_matcher_across_threads() {
    let matcher = Arc::new(rules());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let matcher = Arc::clone(&matcher);
            std::thread::spawn(move || {
                let me = AuthContext::user(format!("user{}", t));
                for i in 0..500 {
                    let own = format!("users/user{}", t);
                    let d = matcher.evaluate(Operation::Write, &own, &me).unwrap();
                    assert_eq!(d.matched_rule, Some(RuleId(0)));

                    let other = format!("users/user{}", (t + 1) % 8);
                    let d = matcher.evaluate(Operation::Write, &other, &me).unwrap();
                    assert_eq!(d.matched_rule, Some(RuleId(1)));

                    let anon = matcher
                        .evaluate(Operation::Read, &format!("docs/{}", i), &AuthContext::anonymous())
                        .unwrap();
                    assert!(!anon.allowed);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn test_scoped_threads_borrow_matcher() {
    let matcher = rules();
    let alice = AuthContext::user("alice");

    let results: Vec<bool> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let matcher = &matcher;
                let alice = &alice;
                s.spawn(move || {
                    matcher
                        .evaluate(Operation::Read, &format!("users/{}", i), alice)
                        .unwrap()
                        .allowed
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Falls through to the authenticated catch-all
    assert!(results.iter().all(|allowed| *allowed));
}

#[test]
fn test_cached_matcher_consistent_under_contention() {
    let cached = Arc::new(CachedMatcher::new(rules(), 16));
    let reference = rules();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cached = Arc::clone(&cached);
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                for i in 0..200 {
                    let auth = if i % 3 == 0 {
                        AuthContext::anonymous()
                    } else {
                        AuthContext::user(format!("user{}", (t + i) % 4))
                    };
                    let path = format!("users/user{}", i % 4);
                    let op = if i % 2 == 0 { Operation::Read } else { Operation::Write };
                    let d = cached.evaluate(op, &path, &auth).unwrap();
                    seen.push((op, path, auth, d));
                }
                seen
            })
        })
        .collect();

    for h in handles {
        for (op, path, auth, decision) in h.join().unwrap() {
            assert_eq!(decision, reference.evaluate(op, &path, &auth).unwrap());
        }
    }

    assert!(cached.cache_size() <= 16);
}
