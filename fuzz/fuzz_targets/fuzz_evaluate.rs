#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pathguard::{AuthContext, Guard, Operation, OperationSet, PathRuleMatcher, RuleDef};

#[derive(Arbitrary, Debug)]
struct Input {
    patterns: Vec<String>,
    path: String,
    write: bool,
    uid: Option<String>,
}

// Evaluation over arbitrary rules and paths must never panic and must be repeatable
fuzz_target!(|input: Input| {
    let defs = input.patterns.iter().take(16).map(|p| {
        RuleDef::new(p.clone(), OperationSet::ALL, Guard::is_authenticated())
    });
    let Ok(matcher) = PathRuleMatcher::new(defs) else {
        return;
    };

    let op = if input.write { Operation::Write } else { Operation::Read };
    let auth = match input.uid {
        Some(uid) => AuthContext::user(uid),
        None => AuthContext::anonymous(),
    };

    let first = matcher.evaluate(op, &input.path, &auth);
    let second = matcher.evaluate(op, &input.path, &auth);
    match (first, second) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a, b);
            if !auth.authenticated {
                assert!(!a.allowed);
            }
        }
        (Err(_), Err(_)) => {}
        _ => panic!("evaluation is not deterministic"),
    }
});
