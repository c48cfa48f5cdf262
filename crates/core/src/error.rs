//! Error model backing the runtime's failure contract.
//!
//! The evaluator never panics on a user-reachable fault. Every fallible operation
//! returns a [`RunResult`], whose error variant carries enough to print a useful
//! diagnostic (a message, a location, and a kind tag) without pulling in a generic
//! error-handling crate: matching the rest of the ambient stack, this is plain
//! hand-written `Display`/`Error` impls.

use std::fmt;

/// Result alias used throughout the evaluator and the built-in layer.
pub type RunResult<T> = Result<T, LoxError>;

/// Source location attached to most AST nodes and to every [`LoxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeLoc {
    pub line: u32,
    pub column: u32,
}

impl CodeLoc {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The placeholder location used by values that did not originate from source text
    /// (native-built values constructed directly through the Rust API).
    #[must_use]
    pub const fn synthetic() -> Self {
        Self { line: 0, column: 0 }
    }
}

impl fmt::Display for CodeLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The three error kinds named in the error-handling contract.
///
/// `Return` is deliberately not a variant here: it is a control-flow signal, not an
/// error, and is modeled separately as `ControlFlow<Value>` (see `interpreter::Exec`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Failure while scanning or parsing source text.
    Syntax,
    /// Every core evaluator failure: undefined name, wrong arity, type mismatch,
    /// index out of range, division by zero, close-after-close, etc.
    Runtime,
    /// Raised only by the explicit iterator API (`.next()` on an exhausted iterator).
    StopIteration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Syntax => "SyntaxError",
            Self::Runtime => "RuntimeError",
            Self::StopIteration => "StopIteration",
        };
        f.write_str(s)
    }
}

/// A runtime fault. `Display` renders exactly `message` (the contract text), with
/// `kind`/`at` available separately for callers that want structured detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoxError {
    pub kind: ErrorKind,
    pub message: String,
    pub at: CodeLoc,
}

impl LoxError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, at: CodeLoc) -> Self {
        Self { kind, message: message.into(), at }
    }

    #[must_use]
    pub fn runtime(message: impl Into<String>, at: CodeLoc) -> Self {
        Self::new(ErrorKind::Runtime, message, at)
    }

    #[must_use]
    pub fn syntax(message: impl Into<String>, at: CodeLoc) -> Self {
        Self::new(ErrorKind::Syntax, message, at)
    }

    #[must_use]
    pub fn stop_iteration(at: CodeLoc) -> Self {
        Self::new(ErrorKind::StopIteration, "StopIteration", at)
    }

    /// `<Type>s have no property called '<name>'.` -- the property protocol's
    /// uniform failure message (§4.4, §8).
    #[must_use]
    pub fn no_property(type_name: &str, prop: &str, at: CodeLoc) -> Self {
        Self::runtime(format!("{type_name}s have no property called '{prop}'."), at)
    }

    /// `Argument to '<class>.<name>' must be a <type>.` -- the built-in argument-type
    /// failure message.
    #[must_use]
    pub fn bad_argument(owner: &str, method: &str, expected_type: &str, at: CodeLoc) -> Self {
        Self::runtime(
            format!("Argument to '{owner}.{method}' must be a {expected_type}."),
            at,
        )
    }

    #[must_use]
    pub fn undefined_variable(name: &str, at: CodeLoc) -> Self {
        Self::runtime(format!("Undefined variable '{name}'."), at)
    }

    #[must_use]
    pub fn wrong_arity(expected: usize, got: usize, at: CodeLoc) -> Self {
        Self::runtime(format!("Expected {expected} arguments but got {got}."), at)
    }
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LoxError {}
