//! Shared plumbing for the integration test files in this directory: build an
//! [`Interpreter`] wired to an in-memory [`Sink`] and hand back both the run result and
//! whatever got printed, the way the teacher's `tests/inputs.rs` builds one `Runner`
//! per scenario rather than threading a test fixture through a shared harness struct.

use std::cell::RefCell;
use std::rc::Rc;

use loxide_core::print::Sink;
use loxide_core::tracer::NoopTracer;
use loxide_core::{Interpreter, LimitedTracker, NoLimitTracker, ResourceLimits, RunResult};

/// A [`Sink`] that pushes into a shared buffer instead of owning it outright, so the
/// test can keep reading the buffer after the `Interpreter` (which owns a boxed `Sink`)
/// has been dropped or is still borrowed mutably by `run`.
#[derive(Clone, Default)]
pub struct SharedLines(Rc<RefCell<Vec<String>>>);

impl Sink for SharedLines {
    fn write_line(&mut self, line: &str) {
        self.0.borrow_mut().push(line.to_owned());
    }
}

impl SharedLines {
    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Runs `source` against a fresh, unlimited interpreter and returns every printed line
/// alongside the run's result.
#[allow(dead_code)]
pub fn run(source: &str) -> (Vec<String>, RunResult<()>) {
    let sink = SharedLines::default();
    let mut interp = Interpreter::with_parts(Box::new(NoLimitTracker), Box::new(NoopTracer), Box::new(sink.clone()));
    let result = interp.run(source);
    (sink.lines(), result)
}

/// Same as [`run`], but sandboxed under `limits` -- for exercising [`ResourceError`]
/// reporting without a genuinely unbounded recursive/allocating script.
#[allow(dead_code)]
pub fn run_limited(source: &str, limits: ResourceLimits) -> (Vec<String>, RunResult<()>) {
    let sink = SharedLines::default();
    let mut interp = Interpreter::with_parts(Box::new(LimitedTracker::new(limits)), Box::new(NoopTracer), Box::new(sink.clone()));
    let result = interp.run(source);
    (sink.lines(), result)
}
