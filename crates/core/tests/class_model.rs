//! Class/instance model properties (§4.5, §8): method binding identity, `init`'s
//! always-return-the-instance rule, superclass/`super` resolution, field-shadows-method,
//! and the uniform "no property called" error contract.

#[path = "support/mod.rs"]
mod support;

#[test]
fn bound_methods_are_memoized_per_instance() {
    let (lines, result) = support::run(
        r#"
        class Box {
            init(v) { this.v = v; }
            get() { return this.v; }
        }
        var b = Box(1);
        print b.get == b.get;
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["true"]);
}

#[test]
fn two_instances_of_the_same_class_get_distinct_bound_methods() {
    let (lines, result) = support::run(
        r#"
        class Box {
            init(v) { this.v = v; }
            get() { return this.v; }
        }
        var a = Box(1);
        var b = Box(2);
        print a.get == b.get;
        print a.get();
        print b.get();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["false", "1", "2"]);
}

#[test]
fn init_always_returns_the_instance_even_with_an_explicit_return() {
    let (lines, result) = support::run(
        r#"
        class Thing {
            init(v) {
                this.v = v;
                return nil;
            }
        }
        var t = Thing(42);
        print t.v;
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["42"]);
}

#[test]
fn super_dispatches_to_the_parent_implementation() {
    let (lines, result) = support::run(
        r#"
        class Animal {
            speak() { return "..."; }
        }
        class Dog < Animal {
            speak() { return "woof, then " + super.speak(); }
        }
        print Dog().speak();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["woof, then ..."]);
}

#[test]
fn a_field_set_after_construction_shadows_a_method_of_the_same_name() {
    let (lines, result) = support::run(
        r#"
        class Thing {
            greet() { return "method"; }
        }
        var t = Thing();
        print t.greet();
        t.greet = "field";
        print t.greet;
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["method", "field"]);
}

#[test]
fn unknown_property_reports_the_uniform_contract_message() {
    let (_lines, result) = support::run(
        r#"
        class Thing {}
        var t = Thing();
        print t.nope;
        "#,
    );
    let err = result.unwrap_err();
    assert_eq!(err.message, "Things have no property called 'nope'.");
}

#[test]
fn calling_an_undeclared_method_on_a_builtin_uses_the_same_contract_message() {
    let (_lines, result) = support::run("print [1, 2].nope();");
    let err = result.unwrap_err();
    assert_eq!(err.message, "lists have no property called 'nope'.");
}
