//! Callable values (§4.3): user-defined functions/methods and native callables.

use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::EnvId;
use crate::error::{CodeLoc, RunResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Declared arity. `AtLeast` models the "negative means variadic" contract of §4.3 as
/// an explicit lower bound rather than a signed-integer encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    AtLeast(usize),
}

impl Arity {
    #[must_use]
    pub fn accepts(self, got: usize) -> bool {
        match self {
            Self::Fixed(n) => got == n,
            Self::AtLeast(n) => got >= n,
        }
    }

    #[must_use]
    pub fn describe(self) -> String {
        match self {
            Self::Fixed(n) => n.to_string(),
            Self::AtLeast(n) => format!("at least {n}"),
        }
    }
}

/// A user-defined function or method. Method binding (§4.5) clones this with
/// `bound_this` set rather than introducing a separate heap variant, since a bound
/// method is exactly "this function, called with `this` pre-filled".
#[derive(Debug, Clone)]
pub struct Function {
    pub decl: Rc<FunctionDecl>,
    pub closure: EnvId,
    pub bound_this: Option<Value>,
    pub name: String,
}

impl Function {
    #[must_use]
    pub fn new(decl: Rc<FunctionDecl>, closure: EnvId) -> Self {
        Self { name: decl.name.clone(), decl, closure, bound_this: None }
    }

    #[must_use]
    pub fn bind(&self, this: Value) -> Self {
        Self { decl: self.decl.clone(), closure: self.closure, bound_this: Some(this), name: self.name.clone() }
    }

    #[must_use]
    pub fn arity(&self) -> Arity {
        Arity::Fixed(self.decl.params.len())
    }
}

/// A built-in callable implemented in Rust. Stored as an `Rc<dyn Fn>` rather than a
/// bare function pointer so that built-ins which close over configuration (e.g. a
/// pre-bound receiver, a captured class name for error messages) are representable
/// the same way user closures are. `owner` names the built-in class the method lives
/// on (`"String"`, `"Iterator"`, ...), empty for a free-standing global function; it
/// only feeds the `<native CLASS fn NAME at 0xADDR>` display form (§6).
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub owner: String,
    pub arity: Arity,
    #[allow(clippy::type_complexity)]
    pub func: Rc<dyn Fn(&mut Interpreter, &[Value], CodeLoc) -> RunResult<Value>>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        arity: Arity,
        func: impl Fn(&mut Interpreter, &[Value], CodeLoc) -> RunResult<Value> + 'static,
    ) -> Self {
        Self { name: name.into(), owner: String::new(), arity, func: Rc::new(func) }
    }

    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}
