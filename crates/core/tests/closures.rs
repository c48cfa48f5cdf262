//! Lexical closure / upvalue capture semantics (§4.2).

#[path = "support/mod.rs"]
mod support;

#[test]
fn each_closure_keeps_its_own_captured_variable() {
    let (lines, result) = support::run(
        r#"
        fun makeCounter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }

        var a = makeCounter();
        var b = makeCounter();
        print a();
        print a();
        print b();
        print a();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["1", "2", "1", "3"]);
}

#[test]
fn nested_functions_see_enclosing_locals_not_globals() {
    let (lines, result) = support::run(
        r#"
        var x = "global";
        fun outer() {
            var x = "outer";
            fun inner() {
                return x;
            }
            return inner();
        }
        print outer();
        print x;
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["outer", "global"]);
}

#[test]
fn closure_over_loop_variable_captures_the_value_at_call_time() {
    let (lines, result) = support::run(
        r#"
        var fns = [];
        var i = 0;
        while (i < 3) {
            var captured = i;
            fun report() {
                return captured;
            }
            fns.push(report);
            i = i + 1;
        }
        print fns[0]();
        print fns[1]();
        print fns[2]();
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["0", "1", "2"]);
}

#[test]
fn assigning_inside_a_closure_does_not_leak_into_sibling_calls() {
    let (lines, result) = support::run(
        r#"
        fun adder(n) {
            fun add(x) {
                return x + n;
            }
            return add;
        }
        var addFive = adder(5);
        var addTen = adder(10);
        print addFive(1);
        print addTen(1);
        print addFive(2);
        "#,
    );
    result.unwrap();
    assert_eq!(lines, vec!["6", "11", "7"]);
}
