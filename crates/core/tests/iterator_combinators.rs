//! Iterator-protocol properties beyond the golden-script corpus (§4.6, §8): truncation
//! to the shortest source, `hasNext`/`StopIteration` on an exhausted explicit iterator,
//! `reduceRight` vs. `reversed().reduce()` equivalence, and `chain` concatenation.

#[path = "support/mod.rs"]
mod support;

#[test]
fn zip_truncates_to_the_shortest_source() {
    let (lines, result) = support::run(
        r#"
        var a = [1, 2, 3, 4, 5];
        var b = ["x", "y"];
        print a.iterator().zip([b.iterator()]).toList().len();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["2"]);
}

#[test]
fn chain_concatenates_sources_in_order() {
    let (lines, result) = support::run(
        r#"
        var a = [1, 2];
        var b = [3, 4];
        print a.iterator().chain([b.iterator()]).toList();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["[1, 2, 3, 4]"]);
}

#[test]
fn calling_next_past_the_end_raises_stop_iteration() {
    let (_lines, result) = support::run(
        r#"
        var it = [1].iterator();
        it.next();
        it.next();
        "#,
    );
    let err = result.unwrap_err();
    assert_eq!(err.kind, loxide_core::ErrorKind::StopIteration);
}

#[test]
fn has_next_does_not_consume_the_peeked_value() {
    let (lines, result) = support::run(
        r#"
        var it = [10, 20].iterator();
        print it.hasNext();
        print it.next();
        print it.hasNext();
        print it.next();
        print it.hasNext();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["true", "10", "true", "20", "false"]);
}

#[test]
fn reduce_right_matches_reduce_over_the_reversed_iterator() {
    let (lines, result) = support::run(
        r#"
        var items = ["a", "b", "c", "d"];
        var viaReduceRight = items.iterator().reduceRight(fun(acc, x) { return acc + x; }, "");
        var viaReversed = items.iterator().reversed().reduce(fun(acc, x) { return acc + x; }, "");
        print viaReduceRight == viaReversed;
        print viaReduceRight;
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["true", "dcba"]);
}

#[test]
fn accumulate_add_saturates_instead_of_overflowing() {
    let (lines, result) = support::run(
        r#"
        var it = [9223372036854775807, 1].iterator().accumulateAdd();
        print it.next();
        print it.next();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["9223372036854775807", "9223372036854775807"]);
}

#[test]
fn pairwise_yields_adjacent_overlapping_pairs() {
    let (lines, result) = support::run(
        r#"
        var pairs = [1, 2, 3].iterator().pairwise().toList();
        print pairs.len();
        print pairs[0];
        print pairs[1];
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["2", "[1, 2]", "[2, 3]"]);
}
