//! The built-in integration layer (§4.4, §6 "Built-in class surface").
//!
//! One flat method table per built-in type name, populated once at interpreter
//! construction by this module's `install`. [`crate::property::get_property`] looks a
//! method up here only after ruling out instance fields/methods, so a user class named
//! `list` would shadow nothing here -- the two namespaces never collide because
//! `Instance`s are intercepted first.

use std::rc::Rc;

use ahash::AHashMap;

use crate::error::{CodeLoc, LoxError, RunResult};
use crate::function::{Arity, NativeFunction};
use crate::heap::{HeapData, HeapId};
use crate::interpreter::Interpreter;
use crate::value::Value;

mod bignum;
mod buffer;
mod datetime;
mod deque;
mod dict;
mod globals;
mod host;
mod iterator;
mod list;
mod pqueue;
mod range;
mod set;
mod string;

/// A type-name-keyed table of native methods, cloned out to the caller on lookup (the
/// `Rc` inside [`NativeFunction`] makes that cheap).
#[derive(Default)]
pub struct Builtins {
    tables: AHashMap<String, AHashMap<String, NativeFunction>>,
}

impl Builtins {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lookup(&self, type_name: &str, name: &str) -> Option<NativeFunction> {
        self.tables.get(type_name)?.get(name).cloned()
    }

    fn register(
        &mut self,
        owner: &'static str,
        name: &'static str,
        arity: Arity,
        f: impl Fn(&mut Interpreter, &[Value], CodeLoc) -> RunResult<Value> + 'static,
    ) {
        let func = NativeFunction::new(name, arity, f).with_owner(owner);
        self.tables.entry(owner.to_owned()).or_default().insert(name.to_owned(), func);
    }
}

/// Populates every built-in type's method table and installs the global namespace
/// classes/functions (`bigint`, `bigfloat`, `Iterator`, `pqueue`, `Rand`, `os`, ...).
pub fn install(interp: &mut Interpreter) {
    string::register(&mut interp.builtins);
    buffer::register(&mut interp.builtins);
    list::register(&mut interp.builtins);
    dict::register(&mut interp.builtins);
    set::register(&mut interp.builtins);
    range::register(&mut interp.builtins);
    deque::register(&mut interp.builtins);
    bignum::register(&mut interp.builtins);
    iterator::register(&mut interp.builtins);
    pqueue::register(&mut interp.builtins);
    datetime::register(&mut interp.builtins);
    host::register(&mut interp.builtins);
    globals::install(interp);
}

// --- shared argument-extraction helpers, used across every builtins submodule --------

pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).copied().unwrap_or(Value::Nil)
}

pub(crate) fn expect_int(_interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<i64> {
    match v {
        Value::Int(i) => Ok(i),
        Value::Float(f) => Ok(f as i64),
        _ => Err(LoxError::bad_argument(owner, method, "int", at)),
    }
}

pub(crate) fn expect_str(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<Rc<str>> {
    if let Value::Ref(id) = v {
        if let HeapData::Str(s, _) = interp.heap.get(id) {
            return Ok(s.clone());
        }
    }
    Err(LoxError::bad_argument(owner, method, "string", at))
}

pub(crate) fn expect_list(interp: &mut Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::List(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(owner, method, "list", at))
}

/// Coerces any iterable value to an iterator heap id: an already-constructed iterator
/// passes straight through, anything else (list, range, dict, set, deque, ...) is asked
/// for its own `iterator()` via the property protocol (§4.4) and the result taken. Backs
/// the `Iterator.<combinator>(iterable, ...)` namespace statics (§6, §8 scenarios 2-4),
/// which take plain iterables directly rather than requiring the caller to iterate first.
pub(crate) fn coerce_iter(interp: &mut Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Iterator(_)) {
            return Ok(id);
        }
    }
    let iter_fn = crate::property::get_property(interp, v, "iterator", at)
        .map_err(|_| LoxError::bad_argument(owner, method, "iterable", at))?;
    match interp.call_value(iter_fn, &[], at)? {
        Value::Ref(id) if matches!(interp.heap.get(id), HeapData::Iterator(_)) => Ok(id),
        _ => Err(LoxError::bad_argument(owner, method, "iterable", at)),
    }
}

pub(crate) fn expect_dict(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Dict(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(owner, method, "dict", at))
}

pub(crate) fn expect_set(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Set(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(owner, method, "set", at))
}

pub(crate) fn expect_range(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Range(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(owner, method, "range", at))
}

pub(crate) fn expect_deque(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Deque(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(owner, method, "deque", at))
}

pub(crate) fn expect_pqueue(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::PriorityQueue(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(owner, method, "priorityQueue", at))
}

pub(crate) fn expect_float(v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<f64> {
    match v {
        Value::Int(i) => Ok(i as f64),
        Value::Float(f) => Ok(f),
        _ => Err(LoxError::bad_argument(owner, method, "float", at)),
    }
}

pub(crate) fn expect_bigint(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<num_bigint::BigInt> {
    match v {
        Value::Int(i) => Ok(num_bigint::BigInt::from(i)),
        Value::Ref(id) => match interp.heap.get(id) {
            HeapData::BigInt(b) => Ok(b.clone()),
            _ => Err(LoxError::bad_argument(owner, method, "bigint", at)),
        },
        _ => Err(LoxError::bad_argument(owner, method, "bigint", at)),
    }
}

pub(crate) fn expect_callable(v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<Value> {
    match v {
        Value::Ref(_) => Ok(v),
        _ => Err(LoxError::bad_argument(owner, method, "function", at)),
    }
}

/// Allocates a fresh `string` value with the default double-quote display style.
pub(crate) fn alloc_str(interp: &mut Interpreter, s: impl Into<Rc<str>>, at: CodeLoc) -> RunResult<Value> {
    Ok(Value::Ref(interp.heap.allocate(HeapData::Str(s.into(), '"'), at)?))
}

pub(crate) fn alloc_list(interp: &mut Interpreter, items: Vec<Value>, at: CodeLoc) -> RunResult<Value> {
    Ok(Value::Ref(interp.heap.allocate(HeapData::List(items), at)?))
}

/// Allocates a fresh `iterator` value wrapping `state`.
pub(crate) fn alloc_iter(interp: &mut Interpreter, state: crate::types::iterator::IterState, at: CodeLoc) -> RunResult<Value> {
    Ok(Value::Ref(interp.heap.allocate(HeapData::Iterator(state), at)?))
}

/// Clamps/normalizes a (possibly negative, Python-style) index against `len`, erroring
/// on out-of-range rather than silently wrapping.
pub(crate) fn normalize_index(i: i64, len: usize, at: CodeLoc) -> RunResult<usize> {
    let i = if i < 0 { i + len as i64 } else { i };
    if i < 0 || i as usize >= len {
        return Err(LoxError::runtime("Index out of range.", at));
    }
    Ok(i as usize)
}

// --- the `[]` operator, shared by every indexable built-in type ----------------------

pub fn index_get(interp: &mut Interpreter, receiver: Value, index: Value, at: CodeLoc) -> RunResult<Value> {
    let Value::Ref(id) = receiver else {
        return Err(LoxError::runtime(format!("'{}' is not indexable.", receiver.type_name(&interp.heap)), at));
    };
    match interp.heap.get(id) {
        HeapData::List(items) => {
            let idx = normalize_index(index.as_index(&interp.heap, at)?, items.len(), at)?;
            let HeapData::List(items) = interp.heap.get(id) else { unreachable!() };
            Ok(items[idx])
        }
        HeapData::Str(s, quote) => {
            let quote = *quote;
            let chars: Vec<char> = s.chars().collect();
            let idx = normalize_index(index.as_index(&interp.heap, at)?, chars.len(), at)?;
            let ch = chars[idx].to_string();
            alloc_str_quoted(interp, &ch, quote, at)
        }
        HeapData::Buffer(b) => {
            let idx = normalize_index(index.as_index(&interp.heap, at)?, b.len(), at)?;
            Ok(Value::Int(i64::from(b[idx])))
        }
        HeapData::Dict(d) => d.get(&index, &interp.heap, at)?.ok_or_else(|| LoxError::runtime("Key not found.", at)),
        HeapData::Range(r) => {
            let idx = normalize_index(index.as_index(&interp.heap, at)?, r.len(), at)?;
            if r.is_big {
                let n = r.nth_big(idx);
                Ok(Value::Ref(interp.heap.allocate(HeapData::BigInt(n), at)?))
            } else {
                Ok(Value::Int(r.nth_small(idx)))
            }
        }
        other => Err(LoxError::runtime(format!("'{}' is not indexable.", other.type_name()), at)),
    }
}

pub fn index_set(interp: &mut Interpreter, receiver: Value, index: Value, value: Value, at: CodeLoc) -> RunResult<()> {
    let Value::Ref(id) = receiver else {
        return Err(LoxError::runtime(format!("'{}' does not support index assignment.", receiver.type_name(&interp.heap)), at));
    };
    match interp.heap.get_mut(id) {
        HeapData::List(items) => {
            let idx = normalize_index(index.as_index(&interp.heap, at)?, items.len(), at)?;
            let HeapData::List(items) = interp.heap.get_mut(id) else { unreachable!() };
            items[idx] = value;
            Ok(())
        }
        HeapData::Dict(_) => {
            let hk = crate::types::containers::hash_key(&index, &interp.heap, at)?;
            let HeapData::Dict(d) = interp.heap.get_mut(id) else { unreachable!() };
            d.insert_hashed(hk, index, value);
            Ok(())
        }
        HeapData::Buffer(b) => {
            let idx = normalize_index(index.as_index(&interp.heap, at)?, b.len(), at)?;
            let byte = match value {
                Value::Int(i) if (0..=255).contains(&i) => i as u8,
                _ => return Err(LoxError::runtime("Buffer bytes must be ints in 0..255.", at)),
            };
            let HeapData::Buffer(b) = interp.heap.get_mut(id) else { unreachable!() };
            b[idx] = byte;
            Ok(())
        }
        other => Err(LoxError::runtime(format!("'{}' does not support index assignment.", other.type_name()), at)),
    }
}

fn alloc_str_quoted(interp: &mut Interpreter, s: &str, quote: char, at: CodeLoc) -> RunResult<Value> {
    Ok(Value::Ref(interp.heap.allocate(HeapData::Str(Rc::from(s), quote), at)?))
}
