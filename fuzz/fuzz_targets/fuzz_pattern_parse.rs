#![no_main]
use libfuzzer_sys::fuzz_target;
use pathguard::{PathPattern, Segment};

// Pattern compilation must never panic, and accepted patterns keep their invariants
fuzz_target!(|data: &str| {
    let Ok(pattern) = PathPattern::parse(data) else {
        return;
    };

    let segments = pattern.segments();
    assert!(!segments.is_empty());
    for segment in &segments[..segments.len() - 1] {
        assert!(!matches!(segment, Segment::RecursiveCapture(_)));
    }

    // Rendered text compiles back to the same pattern
    let reparsed = PathPattern::parse(&pattern.to_string()).expect("rendered pattern parses");
    assert_eq!(reparsed, pattern);
});
