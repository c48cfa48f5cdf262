//! `loxide-core`: the runtime powering the `lox` interpreter (see `crates/cli`).
//!
//! The evaluator (`interpreter`) walks an AST produced by `lexer`/`parser` and resolved
//! by `resolver`. Every runtime value funnels through `value::Value`, heap-resident
//! data through `heap::Heap`. `builtins` installs the per-type method tables that back
//! the uniform property-access protocol in `property`; `stdlib` holds the host-backed
//! leaf adapters (files, processes, HTML, crypto, networking) those tables expose.

pub mod ast;
pub mod builtins;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod heap;
pub mod interpreter;
pub mod lexer;
pub mod numeric;
pub mod parser;
pub mod pqueue;
pub mod print;
pub mod property;
pub mod resolver;
pub mod resource;
pub mod stdlib;
pub mod tracer;
pub mod types;
pub mod value;

pub use error::{CodeLoc, ErrorKind, LoxError, RunResult};
pub use heap::{Heap, HeapData, HeapId};
pub use interpreter::Interpreter;
pub use print::{CollectingPrint, NoPrint, Sink, StdPrint};
pub use resource::{LimitedTracker, NoLimitTracker, ResourceLimits, ResourceTracker};
pub use value::Value;

/// Parses, resolves and runs `source` against a fresh interpreter with no resource
/// ceiling, returning nothing but any error raised. Convenience used by tests and the
/// CLI's non-interactive mode; embedders that need a persistent `Interpreter` (REPL,
/// multiple scripts sharing globals) should construct one directly instead.
pub fn run_script(source: &str) -> RunResult<()> {
    Interpreter::new().run(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_script_executes_print() {
        let mut interp = Interpreter::with_parts(
            Box::new(NoLimitTracker),
            Box::new(tracer::NoopTracer),
            Box::new(CollectingPrint::new()),
        );
        interp.run("print 1 + 2;").unwrap();
    }

    #[test]
    fn class_method_identity_is_stable() {
        let mut sink = CollectingPrint::new();
        let mut interp =
            Interpreter::with_parts(Box::new(NoLimitTracker), Box::new(tracer::NoopTracer), Box::new(CollectingPrint::new()));
        let _ = &mut sink;
        interp
            .run(
                r#"
                class C {
                    greet(n) {
                        return "hi " + n;
                    }
                }
                var c = C();
                print c.greet("world");
                print c.greet == c.greet;
                "#,
            )
            .unwrap();
    }
}
