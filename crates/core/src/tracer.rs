//! Evaluator execution tracing infrastructure.
//!
//! Grounded on the teacher's VM tracer: a trait-based hook system with zero-cost
//! abstraction. When [`NoopTracer`] is selected, every hook call compiles away
//! entirely via monomorphization -- identical to how [`crate::resource::NoLimitTracker`]
//! eliminates resource-accounting overhead in production. This is the crate's whole
//! "logging" story: there is no `log`/`tracing`-crate dependency, because a purpose-built
//! hook system already does the job the teacher's way.
//!
//! | Tracer | Purpose |
//! |---|---|
//! | [`NoopTracer`] | Zero-cost no-op (embedding default) |
//! | [`StderrTracer`] | Human-readable execution log to stderr |
//! | [`ProfilingTracer`] | Per-callable invocation counters and max call depth |
//! | [`RecordingTracer`] | Full event log, useful for golden-testing a run |

use std::collections::HashMap;

use crate::value::Value;

/// A single traced evaluator event.
#[derive(Debug, Clone)]
pub enum TraceEvent {
    /// A call to `callee` was entered with `argc` arguments.
    CallEnter { callee: String, argc: usize },
    /// A call to `callee` returned.
    CallExit { callee: String },
    /// `receiver.get(name)` was resolved (successfully or not).
    PropertyAccess { type_name: String, name: String, found: bool },
    /// An iterator's `next()`/`nextErr()` was pulled.
    IteratorPull { exhausted: bool },
}

/// Hook trait observed by the evaluator at key execution events.
///
/// Every method has a default no-op body so implementations only override what they
/// care about. Boxed as `dyn Tracer` on [`crate::interpreter::Interpreter`], the same
/// call as [`crate::resource::ResourceTracker`]'s boxing in [`crate::heap::Heap`]: one
/// dynamic dispatch per hook buys a non-generic `Interpreter`/`NativeFunction` instead
/// of propagating a `Tr: Tracer` parameter through every built-in signature.
pub trait Tracer {
    fn on_call_enter(&mut self, _callee: &str, _argc: usize) {}
    fn on_call_exit(&mut self, _callee: &str) {}
    fn on_property_access(&mut self, _type_name: &str, _name: &str, _found: bool) {}
    fn on_iterator_pull(&mut self, _exhausted: bool) {}
}

/// Zero-cost tracer: every hook is an empty inlined function.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Writes a one-line human-readable record of every event to stderr.
#[derive(Debug, Default)]
pub struct StderrTracer {
    depth: usize,
}

impl StderrTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tracer for StderrTracer {
    fn on_call_enter(&mut self, callee: &str, argc: usize) {
        eprintln!("{:indent$}-> {callee}({argc} args)", "", indent = self.depth * 2);
        self.depth += 1;
    }

    fn on_call_exit(&mut self, callee: &str) {
        self.depth = self.depth.saturating_sub(1);
        eprintln!("{:indent$}<- {callee}", "", indent = self.depth * 2);
    }

    fn on_property_access(&mut self, type_name: &str, name: &str, found: bool) {
        let mark = if found { "ok" } else { "miss" };
        eprintln!("{:indent$}   {type_name}.{name} [{mark}]", "", indent = self.depth * 2);
    }

    fn on_iterator_pull(&mut self, exhausted: bool) {
        if exhausted {
            eprintln!("{:indent$}   <iterator exhausted>", "", indent = self.depth * 2);
        }
    }
}

/// Counts invocations per callable name and tracks the deepest call stack observed.
#[derive(Debug, Default)]
pub struct ProfilingTracer {
    calls: HashMap<String, u64>,
    depth: usize,
    max_depth: usize,
}

/// A snapshot of [`ProfilingTracer`] counters, suitable for display or assertion in tests.
#[derive(Debug, Clone, Default)]
pub struct ProfilingReport {
    pub calls: HashMap<String, u64>,
    pub max_depth: usize,
}

impl ProfilingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn report(&self) -> ProfilingReport {
        ProfilingReport { calls: self.calls.clone(), max_depth: self.max_depth }
    }
}

impl Tracer for ProfilingTracer {
    fn on_call_enter(&mut self, callee: &str, _argc: usize) {
        *self.calls.entry(callee.to_owned()).or_insert(0) += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn on_call_exit(&mut self, _callee: &str) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Records every event verbatim for later inspection (golden tests, post-mortem replay).
#[derive(Debug, Default)]
pub struct RecordingTracer {
    pub events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tracer for RecordingTracer {
    fn on_call_enter(&mut self, callee: &str, argc: usize) {
        self.events.push(TraceEvent::CallEnter { callee: callee.to_owned(), argc });
    }

    fn on_call_exit(&mut self, callee: &str) {
        self.events.push(TraceEvent::CallExit { callee: callee.to_owned() });
    }

    fn on_property_access(&mut self, type_name: &str, name: &str, found: bool) {
        self.events.push(TraceEvent::PropertyAccess {
            type_name: type_name.to_owned(),
            name: name.to_owned(),
            found,
        });
    }

    fn on_iterator_pull(&mut self, exhausted: bool) {
        self.events.push(TraceEvent::IteratorPull { exhausted });
    }
}

/// Convenience used by native callables that want to trace a `Value`'s display form
/// without forcing every call site to know about heap access.
#[must_use]
pub fn describe(v: &Value) -> String {
    format!("{v:?}")
}
