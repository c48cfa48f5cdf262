//! Sandboxed recursion-depth ceiling (§4.10 resource limits): `LimitedTracker` must stop
//! a runaway user-function recursion with the exact contract message, while
//! `NoLimitTracker` lets the same recursion through.

#[path = "support/mod.rs"]
mod support;

use loxide_core::ResourceLimits;

const DEEP_RECURSION: &str = r#"
    fun countdown(n) {
        if (n <= 0) return 0;
        return countdown(n - 1);
    }
    print countdown(10000);
"#;

#[test]
fn limited_tracker_stops_runaway_recursion_with_the_contract_message() {
    let limits = ResourceLimits { max_recursion_depth: 50, max_heap_bytes: usize::MAX };
    let (_lines, result) = support::run_limited(DEEP_RECURSION, limits);
    let err = result.unwrap_err();
    assert_eq!(err.message, "Maximum recursion depth exceeded (50).");
}

#[test]
fn a_recursion_depth_within_the_limit_succeeds() {
    let limits = ResourceLimits { max_recursion_depth: 50, max_heap_bytes: usize::MAX };
    let (lines, result) = support::run_limited(
        r#"
        fun countdown(n) {
            if (n <= 0) return 0;
            return countdown(n - 1);
        }
        print countdown(10);
        "#,
        limits,
    );
    result.unwrap();
    assert_eq!(lines, vec!["0"]);
}

#[test]
fn no_limit_tracker_allows_deep_recursion_that_would_trip_a_limited_tracker() {
    let (lines, result) = support::run(DEEP_RECURSION);
    result.unwrap();
    assert_eq!(lines, vec!["0"]);
}

#[test]
fn default_resource_limits_use_the_documented_default_depth() {
    let limits = ResourceLimits::default();
    assert_eq!(limits.max_recursion_depth, loxide_core::resource::DEFAULT_MAX_RECURSION_DEPTH);
}
