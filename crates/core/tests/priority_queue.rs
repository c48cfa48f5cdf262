//! Priority-queue engine properties (§4.7, §8): ordering, the `dequeueErr` empty-queue
//! contract, duplicate-priority handling, and the builder's `buildArgs`/`buildDict`.
//!
//! `enqueue(priority, value)` and `dequeue`/`peek` returning a `[value, priority]` pair
//! follow §8 scenario 1 literally (`q.enqueue(2, "a"); q.enqueue(1, "b"); q.dequeue() ->
//! ["b", 1]`).

#[path = "support/mod.rs"]
mod support;

#[test]
fn dequeue_returns_entries_in_ascending_priority_order() {
    let (lines, result) = support::run(
        r#"
        var q = pqueue.new();
        q.enqueue(3, "c");
        q.enqueue(1, "a");
        q.enqueue(2, "b");
        print q.dequeue();
        print q.dequeue();
        print q.dequeue();
        print q.isEmpty();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec![r#"["a", 1]"#, r#"["b", 2]"#, r#"["c", 3]"#, "true"]);
}

#[test]
fn reversed_queue_dequeues_highest_priority_first() {
    let (lines, result) = support::run(
        r#"
        var q = pqueue.new(true);
        q.enqueue(3, "c");
        q.enqueue(1, "a");
        q.enqueue(2, "b");
        print q.dequeue();
        print q.dequeue();
        print q.dequeue();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec![r#"["c", 3]"#, r#"["b", 2]"#, r#"["a", 1]"#]);
}

#[test]
fn scenario_one_from_the_spec() {
    let (lines, result) = support::run(
        r#"
        var q = pqueue.new();
        q.enqueue(2, "a");
        q.enqueue(1, "b");
        print q.dequeue();
        print q.peek();
        print q.dequeue();
        print q.isEmpty();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec![r#"["b", 1]"#, r#"["a", 2]"#, r#"["a", 2]"#, "true"]);
}

#[test]
fn dequeue_on_an_empty_queue_yields_nil_but_dequeue_err_fails_loudly() {
    let (lines, result) = support::run(
        r#"
        var q = pqueue.new();
        print q.dequeue();
        q.dequeueErr();
        "#,
    );
    let err = result.unwrap_err();
    assert_eq!(lines, vec!["nil"]);
    assert_eq!(err.message, "Cannot remove from empty priority queue.");
}

#[test]
fn duplicate_priorities_are_rejected_unless_the_builder_allows_them() {
    let (_lines, result) = support::run(
        r#"
        var q = pqueue.new();
        q.enqueue(1, "a");
        q.enqueue(1, "b");
        "#,
    );
    let err = result.unwrap_err();
    assert_eq!(err.message, "Priority queue already contains that priority.");

    let (lines, result) = support::run(
        r#"
        var q = pqueue.new(false, true);
        q.enqueue(1, "a");
        q.enqueue(1, "b");
        print q.len();
        print q.containsPriority(1);
        print q.containsValue("b");
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["2", "true", "true"]);
}

#[test]
fn duplicate_priority_bag_dequeues_in_enqueue_order() {
    let (lines, result) = support::run(
        r#"
        var q = pqueue.builder().allowDuplicates().build();
        q.enqueue(1, "first");
        q.enqueue(1, "second");
        print q.dequeue();
        print q.dequeue();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec![r#"["first", 1]"#, r#"["second", 1]"#]);
}

#[test]
fn builder_build_args_enqueues_priority_value_pairs() {
    let (lines, result) = support::run(
        r#"
        var q = pqueue.builder().buildArgs(2, "b", 1, "a", 3, "c");
        print q.dequeue();
        print q.dequeue();
        print q.dequeue();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec![r#"["a", 1]"#, r#"["b", 2]"#, r#"["c", 3]"#]);
}

#[test]
fn builder_build_dict_enqueues_value_to_priority_mapping() {
    let (lines, result) = support::run(
        r#"
        var d = {"a": 1, "b": 2, "c": 3};
        var q = pqueue.builder().buildDict(d);
        print q.dequeue();
        print q.dequeue();
        print q.dequeue();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec![r#"["a", 1]"#, r#"["b", 2]"#, r#"["c", 3]"#]);
}
