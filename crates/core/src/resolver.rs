//! Static scope resolution (§4.2).
//!
//! Walks a parsed program once before evaluation and stamps every [`crate::ast::VarRef`]
//! with a `depth`: the number of enclosing [`crate::environment::EnvironmentArena`] frames
//! between the reference and the frame that declares it. The evaluator then uses
//! `get_at`/`assign_at` instead of walking the chain by name, falling back to a global
//! lookup when `depth` stays `None` (§4.2's "falling back to a name lookup only while
//! resolving").
//!
//! The scope stack pushed/popped here must mirror, one-for-one, every point where the
//! evaluator opens a fresh [`crate::environment::EnvId`] frame at runtime:
//! a block, a `for` loop's wrapping frame, and a call's params+body frame. A bound
//! method call additionally opens a `this`-binding frame ahead of its params+body frame
//! (because [`crate::function::Function::bind`] only sets `bound_this`, it never touches
//! `closure`) -- resolved here by pushing that extra scope around a method body.
//!
//! `this` and `super` are deliberately never resolved to a depth: [`crate::ast::Expr::This`]
//! carries no `VarRef` slot at all, and giving `Expr::Super`'s `VarRef` a depth would
//! require tracking an implicit per-class `super` scope in lockstep with the per-call
//! `this` scope, which is fragile. Both are instead looked up dynamically by the
//! evaluator via `get_unresolved`, which is always correct regardless of exact frame
//! depth, at a small, constant cost.

use std::collections::HashMap;

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::error::RunResult;

/// One resolver scope: names declared directly within it, value unused (a presence set).
type Scope = HashMap<String, ()>;

pub struct Resolver {
    scopes: Vec<Scope>,
}

/// Resolves every `VarRef` in `program` in place. Infallible in practice (this resolver
/// does not reject shadowing or use-before-declare); kept fallible to match the
/// evaluator's `RunResult`-everywhere convention and leave room for future checks.
pub fn resolve(program: &[Stmt]) -> RunResult<()> {
    let mut r = Resolver { scopes: Vec::new() };
    r.resolve_stmts(program)?;
    Ok(())
}

impl Resolver {
    fn push(&mut self) {
        self.scopes.push(Scope::new());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_owned(), ());
        }
    }

    /// Distance from the innermost scope to the scope that declares `name`, or `None`
    /// if not found in any active scope (meaning: look it up against globals at runtime).
    fn resolve_depth(&self, name: &str) -> Option<usize> {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                return Some(depth);
            }
        }
        None
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) -> RunResult<()> {
        for stmt in stmts {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> RunResult<()> {
        match stmt {
            Stmt::Expression(e) => self.resolve_expr(e)?,
            Stmt::Print(e, _) => self.resolve_expr(e)?,
            Stmt::VarDecl(name, init) => {
                if let Some(init) = init {
                    self.resolve_expr(init)?;
                }
                self.declare(name);
            }
            Stmt::Block(body) => {
                self.push();
                self.resolve_stmts(body)?;
                self.pop();
            }
            Stmt::If(cond, then_branch, else_branch) => {
                self.resolve_expr(cond)?;
                self.resolve_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch)?;
                }
            }
            Stmt::While(cond, body) => {
                self.resolve_expr(cond)?;
                self.resolve_stmt(body)?;
            }
            Stmt::For { init, condition, increment, body } => {
                // One wrapping scope for the whole loop, mirroring the interpreter's
                // single `loop_env` child frame created once before the loop begins.
                self.push();
                if let Some(init) = init {
                    self.resolve_stmt(init)?;
                }
                if let Some(condition) = condition {
                    self.resolve_expr(condition)?;
                }
                if let Some(increment) = increment {
                    self.resolve_expr(increment)?;
                }
                self.resolve_stmt(body)?;
                self.pop();
            }
            Stmt::FunctionDecl(decl) => {
                self.declare(&decl.name);
                self.resolve_function(decl);
            }
            Stmt::ClassDecl(decl) => {
                self.declare(&decl.name);
                // The superclass expression (a plain variable reference) resolves in the
                // enclosing scope, same as any other name use.
                if let Some(superclass) = &decl.superclass {
                    let depth = self.resolve_depth(&superclass.name);
                    superclass.depth.set(depth);
                }
                // `super` occupies its own frame, created once at class-declaration time
                // (not per call), so methods see exactly one extra enclosing scope
                // compared to resolving at the class's own scope depth.
                let has_super = decl.superclass.is_some();
                if has_super {
                    self.push();
                    self.declare("super");
                }
                for method in &decl.methods {
                    // Each method body gets its own `this` wrapper scope, matching the
                    // frame the evaluator synthesizes around `bound_this` at call time.
                    self.push();
                    self.declare("this");
                    self.resolve_function(method);
                    self.pop();
                }
                if has_super {
                    self.pop();
                }
            }
            Stmt::Return(value, _) => {
                if let Some(value) = value {
                    self.resolve_expr(value)?;
                }
            }
            Stmt::Break | Stmt::Continue => {}
        }
        Ok(())
    }

    fn resolve_function(&mut self, decl: &FunctionDecl) {
        self.push();
        for param in &decl.params {
            self.declare(param);
        }
        let _ = self.resolve_stmts(&decl.body);
        self.pop();
    }

    fn resolve_expr(&mut self, expr: &Expr) -> RunResult<()> {
        match expr {
            Expr::Literal(_) | Expr::This(_) => {}
            Expr::Variable(var, _) => {
                let depth = self.resolve_depth(&var.name);
                var.depth.set(depth);
            }
            Expr::Assign(var, value, _) => {
                self.resolve_expr(value)?;
                let depth = self.resolve_depth(&var.name);
                var.depth.set(depth);
            }
            Expr::Unary(_, operand, _) => self.resolve_expr(operand)?,
            Expr::Binary(_, lhs, rhs, _) => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)?;
            }
            Expr::Logical(_, lhs, rhs) => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)?;
            }
            Expr::Call(callee, args, _) => {
                self.resolve_expr(callee)?;
                for arg in args {
                    self.resolve_expr(arg)?;
                }
            }
            Expr::Get(recv, _, _) => self.resolve_expr(recv)?,
            Expr::Set(recv, _, value, _) => {
                self.resolve_expr(recv)?;
                self.resolve_expr(value)?;
            }
            Expr::Index(recv, idx, _) => {
                self.resolve_expr(recv)?;
                self.resolve_expr(idx)?;
            }
            Expr::IndexSet(recv, idx, value, _) => {
                self.resolve_expr(recv)?;
                self.resolve_expr(idx)?;
                self.resolve_expr(value)?;
            }
            // `super`'s VarRef is intentionally left unresolved (see module doc):
            // the evaluator always looks it up dynamically.
            Expr::Super(_, _, _) => {}
            Expr::ListLiteral(items, _) => {
                for item in items {
                    self.resolve_expr(item)?;
                }
            }
            Expr::DictLiteral(pairs, _) => {
                for (k, v) in pairs {
                    self.resolve_expr(k)?;
                    self.resolve_expr(v)?;
                }
            }
            Expr::Lambda(decl) => self.resolve_function(decl),
            Expr::Grouping(inner) => self.resolve_expr(inner)?,
        }
        Ok(())
    }
}
