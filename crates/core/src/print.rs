//! Output sinks for `print` (§6).
//!
//! Grounded on the teacher's `StdPrint`/`CollectStringPrint`/`NoPrint` split: the
//! evaluator never calls `println!` directly, so a test can swap in a sink that
//! collects lines instead of writing to stdout, and an embedder that wants silence
//! can swap in one that drops them.

/// Where `print` statements go. One line per call, newline-exclusive (the caller
/// decides how lines are joined/terminated).
pub trait Sink {
    fn write_line(&mut self, line: &str);
}

/// Default sink used by the CLI: writes to process stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl Sink for StdPrint {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Discards everything, for embedders that evaluate purely for side effects on the
/// value universe (tests asserting on return values, not printed output).
#[derive(Debug, Default)]
pub struct NoPrint;

impl Sink for NoPrint {
    fn write_line(&mut self, _line: &str) {}
}

/// Collects every printed line in order, the sink the golden-script test harness and
/// unit tests use to assert on `print` output without touching real stdout.
#[derive(Debug, Default)]
pub struct CollectingPrint {
    pub lines: Vec<String>,
}

impl CollectingPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

impl Sink for CollectingPrint {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}
