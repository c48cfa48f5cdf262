//! The tree-walking evaluator (§2, §4.1-§4.5).
//!
//! Grounded on the teacher's evaluator shape: one struct owning every piece of mutable
//! runtime state (`heap`, `env`, `tracer`, resource accounting), walked by a pair of
//! mutually recursive functions (`exec_stmt`/`eval_expr`) rather than a `visit` trait
//! object per node, matching the teacher's own dispatch style for its bytecode loop.

use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, FunctionDecl, Literal, LogicalOp, Stmt, UnaryOp};
use crate::builtins::Builtins;
use crate::class::{Class, Instance};
use crate::environment::{EnvId, EnvironmentArena};
use crate::error::{CodeLoc, LoxError, RunResult};
use crate::function::{Arity, Function, NativeFunction};
use crate::heap::{Heap, HeapData, HeapId};
use crate::numeric;
use crate::print::{Sink, StdPrint};
use crate::property;
use crate::resource::{NoLimitTracker, ResourceTracker};
use crate::tracer::{NoopTracer, Tracer};
use crate::value::Value;

/// Statement execution result (§4.3 Rust shape): `Normal`/`Break`/`Continue` fall
/// through to the next statement or unwind a loop; `Return` unwinds to the nearest
/// callable boundary, where [`Interpreter::call_user_function`] unwraps it.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Alias matching `error.rs`'s forward reference: `Result<ControlFlow<Value>, LoxError>`
/// collapsed into one enum (`Flow`) instead of `std::ops::ControlFlow<Value, ()>`, since
/// this evaluator also needs `Break`/`Continue` variants `ControlFlow` has no room for.
pub type Exec = RunResult<Flow>;

/// Owns every piece of runtime state: the heap, the environment arena, global scope,
/// the built-in method/class tables, a source of randomness for `urandom`/`Rand`, the
/// execution tracer, the `print` sink, and the current call depth (checked against the
/// heap's resource tracker on every call, §4.10).
pub struct Interpreter {
    pub heap: Heap,
    pub env: EnvironmentArena,
    pub globals: EnvId,
    pub builtins: Builtins,
    pub rng: Box<dyn rand::RngCore>,
    pub tracer: Box<dyn Tracer>,
    pub sink: Box<dyn Sink>,
    call_depth: usize,
}

impl Interpreter {
    /// An interpreter with no resource ceiling, a no-op tracer, and stdout printing --
    /// the REPL/script-runner default (§4.10).
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(Box::new(NoLimitTracker), Box::new(NoopTracer), Box::new(StdPrint))
    }

    /// Builds an interpreter from explicit parts, letting an embedder sandbox resource
    /// use, attach a tracer, or capture printed output (e.g. the test harness's
    /// [`crate::print::CollectingPrint`]).
    #[must_use]
    pub fn with_parts(tracker: Box<dyn ResourceTracker>, tracer: Box<dyn Tracer>, sink: Box<dyn Sink>) -> Self {
        let heap = Heap::new(tracker);
        let mut env = EnvironmentArena::new();
        let globals = env.new_global();
        let rng: Box<dyn rand::RngCore> = Box::new(rand::rngs::OsRng);
        let mut interp = Self { heap, env, globals, builtins: Builtins::new(), rng, tracer, sink, call_depth: 0 };
        crate::builtins::install(&mut interp);
        interp
    }

    /// Parses and resolves `source`, then executes it as a whole program against the
    /// global environment.
    pub fn run(&mut self, source: &str) -> RunResult<()> {
        let program = crate::parser::parse(source)?;
        crate::resolver::resolve(&program)?;
        self.run_program(&program)
    }

    /// Executes an already-parsed-and-resolved program (used by callers that cache the
    /// AST, e.g. the golden-script test harness).
    pub fn run_program(&mut self, program: &[Stmt]) -> RunResult<()> {
        let globals = self.globals;
        for stmt in program {
            match self.exec_stmt(stmt, globals)? {
                Flow::Normal => {}
                // `break`/`continue`/`return` at top level have nowhere to unwind to;
                // treated as a no-op rather than a panic, matching the "no recovery
                // strategy is specified outside the core" framing (§1 Out of scope).
                _ => {}
            }
        }
        Ok(())
    }

    // --- statements -------------------------------------------------------------

    fn exec_stmt(&mut self, stmt: &Stmt, env: EnvId) -> Exec {
        match stmt {
            Stmt::Expression(expr) => {
                self.eval_expr(expr, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(expr, _at) => {
                let v = self.eval_expr(expr, env)?;
                let line = v.display(&self.heap, false);
                self.sink.write_line(&line);
                Ok(Flow::Normal)
            }
            Stmt::VarDecl(name, init) => {
                let value = match init {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Nil,
                };
                self.env.define(env, name, value);
                Ok(Flow::Normal)
            }
            Stmt::Block(body) => {
                let child = self.env.child_of(env);
                self.exec_block(body, child)
            }
            Stmt::If(cond, then_branch, else_branch) => {
                if self.eval_expr(cond, env)?.is_truthy(&self.heap) {
                    self.exec_stmt(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch, env)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(cond, body) => {
                while self.eval_expr(cond, env)?.is_truthy(&self.heap) {
                    match self.exec_stmt(body, env)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For { init, condition, increment, body } => {
                // One wrapping frame for the whole loop (init/condition/increment and
                // the body all share it), mirrored by the resolver's single scope push.
                let loop_env = self.env.child_of(env);
                if let Some(init) = init {
                    self.exec_stmt(init, loop_env)?;
                }
                loop {
                    if let Some(condition) = condition {
                        if !self.eval_expr(condition, loop_env)?.is_truthy(&self.heap) {
                            break;
                        }
                    }
                    match self.exec_stmt(body, loop_env)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                    if let Some(increment) = increment {
                        self.eval_expr(increment, loop_env)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::FunctionDecl(decl) => {
                let f = Function::new(decl.clone(), env);
                let id = self.heap.allocate(HeapData::Function(f), CodeLoc::synthetic())?;
                self.env.define(env, &decl.name, Value::Ref(id));
                Ok(Flow::Normal)
            }
            Stmt::ClassDecl(decl) => {
                self.exec_class_decl(decl, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(value, at) => {
                let v = match value {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Nil,
                };
                let _ = at;
                Ok(Flow::Return(v))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt], env: EnvId) -> Exec {
        for stmt in stmts {
            match self.exec_stmt(stmt, env)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_class_decl(&mut self, decl: &Rc<crate::ast::ClassDecl>, env: EnvId) -> RunResult<()> {
        let at = CodeLoc::synthetic();
        let superclass_id = match &decl.superclass {
            Some(var_ref) => {
                let v = self.lookup_variable(var_ref, env, at)?;
                match v {
                    Value::Ref(id) if matches!(self.heap.get(id), HeapData::Class(_)) => Some(id),
                    _ => return Err(LoxError::runtime("Superclass must be a class.", at)),
                }
            }
            None => None,
        };
        // `super` is bound once here, in a frame wrapping every method's own closure,
        // not per call -- mirrored by the resolver's once-per-class extra scope.
        let closure = if let Some(superclass_id) = superclass_id {
            let super_env = self.env.child_of(env);
            self.env.define(super_env, "super", Value::Ref(superclass_id));
            super_env
        } else {
            env
        };
        let mut class = Class::new(decl.name.clone(), superclass_id, closure);
        for method in &decl.methods {
            class.methods.insert(method.name.clone(), method.clone());
        }
        let id = self.heap.allocate(HeapData::Class(class), at)?;
        self.env.define(env, &decl.name, Value::Ref(id));
        Ok(())
    }

    // --- expressions --------------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr, env: EnvId) -> RunResult<Value> {
        match expr {
            Expr::Literal(lit) => self.eval_literal(lit),
            Expr::Variable(var_ref, at) => self.lookup_variable(var_ref, env, *at),
            Expr::Assign(var_ref, value, at) => {
                let v = self.eval_expr(value, env)?;
                match var_ref.depth.get() {
                    Some(depth) => self.env.assign_at(env, depth, &var_ref.name, v, *at)?,
                    None => self.env.assign_unresolved(env, &var_ref.name, v, *at)?,
                }
                Ok(v)
            }
            Expr::Unary(op, operand, at) => {
                let v = self.eval_expr(operand, env)?;
                match op {
                    UnaryOp::Neg => numeric::neg(self, v, *at),
                    UnaryOp::Not => Ok(Value::Bool(!v.is_truthy(&self.heap))),
                }
            }
            Expr::Binary(op, lhs, rhs, at) => {
                let l = self.eval_expr(lhs, env)?;
                let r = self.eval_expr(rhs, env)?;
                self.eval_binary(*op, l, r, *at)
            }
            Expr::Logical(op, lhs, rhs) => {
                let l = self.eval_expr(lhs, env)?;
                match op {
                    LogicalOp::Or if l.is_truthy(&self.heap) => Ok(l),
                    LogicalOp::And if !l.is_truthy(&self.heap) => Ok(l),
                    _ => self.eval_expr(rhs, env),
                }
            }
            Expr::Call(callee, args, at) => {
                let callee_v = self.eval_expr(callee, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_expr(arg, env)?);
                }
                self.call_value(callee_v, &arg_values, *at)
            }
            Expr::Get(recv, name, at) => {
                let receiver = self.eval_expr(recv, env)?;
                property::get_property(self, receiver, name, *at)
            }
            Expr::Set(recv, name, value, at) => {
                let receiver = self.eval_expr(recv, env)?;
                let v = self.eval_expr(value, env)?;
                property::set_property(self, receiver, name, v, *at)?;
                Ok(v)
            }
            Expr::Index(recv, idx, at) => {
                let receiver = self.eval_expr(recv, env)?;
                let index = self.eval_expr(idx, env)?;
                crate::builtins::index_get(self, receiver, index, *at)
            }
            Expr::IndexSet(recv, idx, value, at) => {
                let receiver = self.eval_expr(recv, env)?;
                let index = self.eval_expr(idx, env)?;
                let v = self.eval_expr(value, env)?;
                crate::builtins::index_set(self, receiver, index, v, *at)?;
                Ok(v)
            }
            Expr::This(at) => self.env.get_unresolved(env, "this", *at),
            Expr::Super(_var_ref, method, at) => {
                // `super`'s VarRef is never resolved (no stable depth survives a bound
                // method's extra `this` frame, see `resolver.rs`); both names are looked
                // up dynamically, always correct regardless of exact frame depth.
                let superclass = self.env.get_unresolved(env, "super", *at)?;
                let this = self.env.get_unresolved(env, "this", *at)?;
                let Value::Ref(super_id) = superclass else {
                    return Err(LoxError::runtime("'super' did not resolve to a class.", *at));
                };
                let Some(decl) = property::find_method(self, super_id, method) else {
                    return Err(LoxError::no_property("Super", method, *at));
                };
                let closure = { let HeapData::Class(c) = self.heap.get(super_id) else { unreachable!() }; c.closure };
                let bound = Function::new(decl, closure).bind(this);
                let id = self.heap.allocate(HeapData::Function(bound), *at)?;
                Ok(Value::Ref(id))
            }
            Expr::ListLiteral(items, at) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, env)?);
                }
                let id = self.heap.allocate(HeapData::List(values), *at)?;
                Ok(Value::Ref(id))
            }
            Expr::DictLiteral(pairs, at) => {
                let mut dict = crate::types::containers::Dict::new();
                for (k, v) in pairs {
                    let kv = self.eval_expr(k, env)?;
                    let vv = self.eval_expr(v, env)?;
                    dict.insert(kv, vv, &self.heap, *at)?;
                }
                let id = self.heap.allocate(HeapData::Dict(dict), *at)?;
                Ok(Value::Ref(id))
            }
            Expr::Lambda(decl) => {
                let f = Function::new(decl.clone(), env);
                let id = self.heap.allocate(HeapData::Function(f), CodeLoc::synthetic())?;
                Ok(Value::Ref(id))
            }
            Expr::Grouping(inner) => self.eval_expr(inner, env),
        }
    }

    fn eval_literal(&mut self, lit: &Literal) -> RunResult<Value> {
        Ok(match lit {
            Literal::Nil => Value::Nil,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Str(s) => {
                let id = self.heap.allocate(HeapData::Str(Rc::from(s.as_str()), '"'), CodeLoc::synthetic())?;
                Value::Ref(id)
            }
        })
    }

    fn lookup_variable(&self, var_ref: &crate::ast::VarRef, env: EnvId, at: CodeLoc) -> RunResult<Value> {
        match var_ref.depth.get() {
            Some(depth) => self.env.get_at(env, depth, &var_ref.name, at),
            None => self.env.get_global(self.globals, &var_ref.name, at),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, l: Value, r: Value, at: CodeLoc) -> RunResult<Value> {
        match op {
            BinaryOp::Add => self.eval_add(l, r, at),
            BinaryOp::Sub => numeric::sub(self, l, r, at),
            BinaryOp::Mul => numeric::mul(self, l, r, at),
            BinaryOp::Div => numeric::div(self, l, r, at),
            BinaryOp::Mod => numeric::rem(self, l, r, at),
            BinaryOp::Eq => Ok(Value::Bool(l.equals(&r, &self.heap))),
            BinaryOp::NotEq => Ok(Value::Bool(!l.equals(&r, &self.heap))),
            BinaryOp::Lt => Ok(Value::Bool(numeric::compare(self, l, r, at)?.is_lt())),
            BinaryOp::LtEq => Ok(Value::Bool(numeric::compare(self, l, r, at)?.is_le())),
            BinaryOp::Gt => Ok(Value::Bool(numeric::compare(self, l, r, at)?.is_gt())),
            BinaryOp::GtEq => Ok(Value::Bool(numeric::compare(self, l, r, at)?.is_ge())),
        }
    }

    /// `+` also concatenates strings/lists, so it does not delegate to `numeric::add`
    /// unconditionally the way `-`/`*` do.
    fn eval_add(&mut self, l: Value, r: Value, at: CodeLoc) -> RunResult<Value> {
        if let (Value::Ref(a), Value::Ref(b)) = (l, r) {
            match (self.heap.get(a), self.heap.get(b)) {
                (HeapData::Str(s1, q), HeapData::Str(s2, _)) => {
                    let joined = format!("{s1}{s2}");
                    let q = *q;
                    let id = self.heap.allocate(HeapData::Str(Rc::from(joined.as_str()), q), at)?;
                    return Ok(Value::Ref(id));
                }
                (HeapData::List(_), HeapData::List(_)) => {
                    let (HeapData::List(l1), HeapData::List(l2)) = self.heap.get_two_mut(a, b) else { unreachable!() };
                    let mut out = l1.clone();
                    out.extend_from_slice(l2);
                    let id = self.heap.allocate(HeapData::List(out), at)?;
                    return Ok(Value::Ref(id));
                }
                _ => {}
            }
        }
        numeric::add(self, l, r, at)
    }

    // --- callables ----------------------------------------------------------------

    /// Numeric `+`, exposed for `Iterator.accumulateAdd` (§4.6), which shares the same
    /// promotion rule as the `+` operator but never needs string/list concatenation.
    pub fn numeric_add(&mut self, a: Value, b: Value, at: CodeLoc) -> RunResult<Value> {
        numeric::add(self, a, b, at)
    }

    /// Invokes any callable value: a user function/method, a native built-in, or a
    /// class (construction, §4.5).
    pub fn call_value(&mut self, callee: Value, args: &[Value], at: CodeLoc) -> RunResult<Value> {
        let Value::Ref(id) = callee else {
            return Err(LoxError::runtime("Can only call functions and classes.", at));
        };
        match self.heap.get(id) {
            HeapData::Function(f) => {
                let f = f.clone();
                self.call_user_function(&f, args, at)
            }
            HeapData::Native(f) => {
                let f = f.clone();
                if !f.arity.accepts(args.len()) {
                    return Err(LoxError::wrong_arity(
                        match f.arity {
                            Arity::Fixed(n) => n,
                            Arity::AtLeast(n) => n,
                        },
                        args.len(),
                        at,
                    ));
                }
                self.tracer.on_call_enter(&f.name, args.len());
                let result = (f.func)(self, args, at);
                self.tracer.on_call_exit(&f.name);
                result
            }
            HeapData::Class(_) => property::instantiate(self, id, args, at),
            other => Err(LoxError::runtime(format!("'{}' is not callable.", other.type_name()), at)),
        }
    }

    /// Calls a user-defined function or bound method, synthesizing the extra `this`
    /// frame a bound method needs (`Function::bind` only sets `bound_this`; it never
    /// touches `closure`, so that frame must be built here, at call time -- mirrored in
    /// `resolver.rs`'s per-method scope push).
    pub fn call_user_function(&mut self, f: &Function, args: &[Value], at: CodeLoc) -> RunResult<Value> {
        if !f.arity().accepts(args.len()) {
            return Err(LoxError::wrong_arity(f.decl.params.len(), args.len(), at));
        }
        self.call_depth += 1;
        let check = self.heap.tracker().check_recursion_depth(self.call_depth);
        if let Err(e) = check {
            self.call_depth -= 1;
            return Err(LoxError::runtime(e.to_string(), at));
        }
        self.tracer.on_call_enter(&f.name, args.len());

        let call_env = match f.bound_this {
            Some(this) => {
                let this_env = self.env.child_of(f.closure);
                self.env.define(this_env, "this", this);
                self.env.child_of(this_env)
            }
            None => self.env.child_of(f.closure),
        };
        for (param, arg) in f.decl.params.iter().zip(args.iter()) {
            self.env.define(call_env, param, *arg);
        }

        let result = self.exec_function_body(&f.decl, call_env);

        self.tracer.on_call_exit(&f.name);
        self.call_depth -= 1;

        let flow = result?;
        // Calling an initializer always yields the bound instance, regardless of an
        // explicit `return` inside `init` (§4.3).
        if f.decl.is_initializer {
            return Ok(f.bound_this.unwrap_or(Value::Nil));
        }
        Ok(match flow {
            Flow::Return(v) => v,
            _ => Value::Nil,
        })
    }

    fn exec_function_body(&mut self, decl: &Rc<FunctionDecl>, env: EnvId) -> Exec {
        self.exec_block(&decl.body, env)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
