//! The uniform property-access protocol (§4.4).
//!
//! Every value answers `get(name)` through [`get_property`]; the evaluator's `Get`
//! expression handling is exactly "evaluate the receiver, call this, call the result if
//! it's being invoked" -- no type switch lives in the evaluator itself. Class/instance
//! lookups additionally consult [`crate::class`]'s field/method/superclass chain;
//! everything else dispatches to a per-type method table built once in
//! [`crate::builtins`] and looked up by name here.

use crate::class::Instance;
use crate::error::{CodeLoc, LoxError, RunResult};
use crate::function::NativeFunction;
use crate::heap::{HeapData, HeapId};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Resolves `receiver.name`, consulting instance fields/methods first, then the
/// receiver type's built-in method table.
pub fn get_property(interp: &mut Interpreter, receiver: Value, name: &str, at: CodeLoc) -> RunResult<Value> {
    if let Value::Ref(id) = receiver {
        match interp.heap.get(id) {
            HeapData::Instance(_) => return get_instance_property(interp, id, name, at),
            HeapData::Class(_) => return get_static_property(interp, id, name, at),
            _ => {}
        }
    }
    let type_name = receiver.type_name(&interp.heap).to_owned();
    match interp.builtins.lookup(&type_name, name) {
        Some(method) => bind_native(interp, method, receiver, at),
        None => Err(LoxError::no_property(&type_name, name, at)),
    }
}

/// Resolves `Class.name` for a class value itself (not an instance of it): a static
/// method or constant stashed in `Class::statics`, walked up the superclass chain the
/// same way instance methods are (§4.5, §6 "Built-in class surface"). Built-in
/// namespace classes like `bigint`/`Iterator`/`pqueue` are installed with
/// `is_builtin = true` and their entire surface in `statics`, so `bigint.new(5)`
/// resolves here rather than through the generic per-type builtins table.
fn get_static_property(interp: &mut Interpreter, class_id: HeapId, name: &str, at: CodeLoc) -> RunResult<Value> {
    let mut cursor = Some(class_id);
    while let Some(id) = cursor {
        let HeapData::Class(class) = interp.heap.get(id) else { break };
        if let Some(v) = class.statics.get(name) {
            return Ok(*v);
        }
        cursor = class.superclass;
    }
    let HeapData::Class(class) = interp.heap.get(class_id) else { unreachable!() };
    Err(LoxError::no_property(&class.name, name, at))
}

fn get_instance_property(interp: &mut Interpreter, id: HeapId, name: &str, at: CodeLoc) -> RunResult<Value> {
    {
        let HeapData::Instance(inst) = interp.heap.get(id) else { unreachable!() };
        if let Some(v) = inst.fields.get(name) {
            return Ok(*v);
        }
        if let Some(cached) = inst.method_cache.get(name) {
            return Ok(Value::Ref(*cached));
        }
    }
    let class_id = { let HeapData::Instance(inst) = interp.heap.get(id) else { unreachable!() }; inst.class };
    let Some(decl) = find_method(interp, class_id, name) else {
        let HeapData::Instance(inst) = interp.heap.get(id) else { unreachable!() };
        return Err(LoxError::no_property(&inst.class_name, name, at));
    };
    let closure = { let HeapData::Class(c) = interp.heap.get(class_id) else { unreachable!() }; c.closure };
    let bound = crate::function::Function::new(decl, closure).bind(Value::Ref(id));
    let bound_id = interp.heap.allocate(HeapData::Function(bound), at)?;
    if let HeapData::Instance(inst) = interp.heap.get_mut(id) {
        inst.method_cache.insert(name.to_owned(), bound_id);
    }
    Ok(Value::Ref(bound_id))
}

/// Walks `class_id`'s superclass chain looking for a method declaration named `name`.
pub fn find_method(interp: &Interpreter, class_id: HeapId, name: &str) -> Option<std::rc::Rc<crate::ast::FunctionDecl>> {
    let mut cursor = Some(class_id);
    while let Some(id) = cursor {
        let HeapData::Class(class) = interp.heap.get(id) else { return None };
        if let Some(decl) = class.own_method(name) {
            return Some(decl);
        }
        cursor = class.superclass;
    }
    None
}

/// Sets `receiver.name = value`. Only instances support field assignment; every other
/// type fails with the same `no property called` message used by `get` (§4.4).
pub fn set_property(interp: &mut Interpreter, receiver: Value, name: &str, value: Value, at: CodeLoc) -> RunResult<()> {
    if let Value::Ref(id) = receiver {
        if let HeapData::Instance(inst) = interp.heap.get_mut(id) {
            inst.fields.insert(name.to_owned(), value);
            return Ok(());
        }
    }
    Err(LoxError::no_property(receiver.type_name(&interp.heap), name, at))
}

/// Wraps a built-in method table entry with its receiver, producing a callable bound
/// the same way a user method is bound (§4.4).
fn bind_native(interp: &mut Interpreter, method: NativeFunction, receiver: Value, at: CodeLoc) -> RunResult<Value> {
    let NativeFunction { name, owner, arity, func } = method;
    let bound = NativeFunction::new(name, arity, move |interp, args, at| {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(receiver);
        full.extend_from_slice(args);
        func(interp, &full, at)
    })
    .with_owner(owner);
    let id = interp.heap.allocate(HeapData::Native(bound), at)?;
    Ok(Value::Ref(id))
}

/// Constructs a fresh instance via its class's `init` method, if any (§4.5).
pub fn instantiate(interp: &mut Interpreter, class_id: HeapId, args: &[Value], at: CodeLoc) -> RunResult<Value> {
    let HeapData::Class(class) = interp.heap.get(class_id) else {
        return Err(LoxError::runtime("Only classes can be instantiated.", at));
    };
    let class_name = class.name.clone();
    let instance = Instance::new(class_id, class_name);
    let inst_id = interp.heap.allocate(HeapData::Instance(instance), at)?;
    if let Some(init) = find_method(interp, class_id, "init") {
        let closure = { let HeapData::Class(c) = interp.heap.get(class_id) else { unreachable!() }; c.closure };
        let bound = crate::function::Function::new(init, closure).bind(Value::Ref(inst_id));
        interp.call_user_function(&bound, args, at)?;
    }
    Ok(Value::Ref(inst_id))
}
