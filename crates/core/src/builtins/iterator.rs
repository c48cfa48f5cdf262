//! `iterator` instance method table (§4.6).
//!
//! Constructors that don't take an existing iterator as their receiver (`countInt`,
//! `countFloat`, `repeat`, `zeroes`, `urandom`) live on the `Iterator` namespace class in
//! `globals.rs`; everything here operates on an already-constructed iterator value.
//! `globals.rs` additionally re-exposes every combinator registered here as an
//! `Iterator.<name>(iterable, ...)` namespace static that coerces a plain iterable (a
//! list, range, ...) to an iterator first, so `Iterator.zip([1,2,3], ["x","y"])` works
//! without the caller calling `.iterator()` themselves first (§8 scenarios 2-4).

use super::{alloc_iter, alloc_list, arg, expect_callable, expect_list, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::iterator::{self, IterState};
use crate::value::Value;

const OWNER: &str = "iterator";

fn expect_iter(interp: &crate::interpreter::Interpreter, v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<crate::heap::HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Iterator(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(OWNER, method, "iterator", at))
}

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "next", Arity::Fixed(1), |interp, args, at| {
        let id = expect_iter(interp, arg(args, 0), "next", at)?;
        iterator::pull(interp, id, at)?.ok_or_else(|| LoxError::stop_iteration(at))
    });
    b.register(OWNER, "hasNext", Arity::Fixed(1), |interp, args, at| {
        let id = expect_iter(interp, arg(args, 0), "hasNext", at)?;
        Ok(Value::Bool(iterator::has_next(interp, id, at)?))
    });
    b.register(OWNER, "toList", Arity::Fixed(1), |interp, args, at| {
        let id = expect_iter(interp, arg(args, 0), "toList", at)?;
        let items = iterator::collect_all(interp, id, at)?;
        alloc_list(interp, items, at)
    });
    b.register(OWNER, "count", Arity::AtLeast(1), |interp, args, at| {
        let id = expect_iter(interp, arg(args, 0), "count", at)?;
        let pred = match arg(args, 1) {
            Value::Nil => None,
            f => Some(expect_callable(f, OWNER, "count", at)?),
        };
        let mut n: i64 = 0;
        while let Some(v) = iterator::pull(interp, id, at)? {
            let keep = match pred {
                None => true,
                Some(f) => interp.call_value(f, &[v], at)?.is_truthy(&interp.heap),
            };
            if keep {
                n = n.saturating_add(1);
            }
        }
        Ok(Value::Int(n))
    });
    b.register(OWNER, "length", Arity::Fixed(1), |interp, args, at| {
        let id = expect_iter(interp, arg(args, 0), "length", at)?;
        let mut n: i64 = 0;
        while iterator::pull(interp, id, at)?.is_some() {
            n = n.saturating_add(1);
        }
        Ok(Value::Int(n))
    });
    b.register(OWNER, "map", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "map", at)?;
        let f = expect_callable(arg(args, 1), OWNER, "map", at)?;
        alloc_iter(interp, IterState::Map { source, f }, at)
    });
    b.register(OWNER, "filter", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "filter", at)?;
        let f = expect_callable(arg(args, 1), OWNER, "filter", at)?;
        alloc_iter(interp, IterState::Filter { source, f, keep_when: true }, at)
    });
    b.register(OWNER, "filterFalse", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "filterFalse", at)?;
        let f = expect_callable(arg(args, 1), OWNER, "filterFalse", at)?;
        alloc_iter(interp, IterState::Filter { source, f, keep_when: false }, at)
    });
    b.register(OWNER, "accumulate", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "accumulate", at)?;
        let f = arg(args, 1);
        let f = if f.is_nil() { None } else { Some(expect_callable(f, OWNER, "accumulate", at)?) };
        alloc_iter(interp, IterState::Accumulate { source, f, state: None, add_mode: false }, at)
    });
    b.register(OWNER, "accumulateAdd", Arity::Fixed(1), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "accumulateAdd", at)?;
        alloc_iter(interp, IterState::Accumulate { source, f: None, state: None, add_mode: true }, at)
    });
    b.register(OWNER, "dropWhile", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "dropWhile", at)?;
        let pred = expect_callable(arg(args, 1), OWNER, "dropWhile", at)?;
        alloc_iter(interp, IterState::DropWhile { source, pred, until_mode: false, dropping: true }, at)
    });
    b.register(OWNER, "dropUntil", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "dropUntil", at)?;
        let pred = expect_callable(arg(args, 1), OWNER, "dropUntil", at)?;
        alloc_iter(interp, IterState::DropWhile { source, pred, until_mode: true, dropping: true }, at)
    });
    b.register(OWNER, "getWhile", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "getWhile", at)?;
        let pred = expect_callable(arg(args, 1), OWNER, "getWhile", at)?;
        alloc_iter(interp, IterState::GetWhile { source, pred, until_mode: false, include_last: false, done: false }, at)
    });
    b.register(OWNER, "getUntil", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "getUntil", at)?;
        let pred = expect_callable(arg(args, 1), OWNER, "getUntil", at)?;
        alloc_iter(interp, IterState::GetWhile { source, pred, until_mode: true, include_last: false, done: false }, at)
    });
    b.register(OWNER, "getWhileLast", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "getWhileLast", at)?;
        let pred = expect_callable(arg(args, 1), OWNER, "getWhileLast", at)?;
        alloc_iter(interp, IterState::GetWhile { source, pred, until_mode: false, include_last: true, done: false }, at)
    });
    b.register(OWNER, "getUntilLast", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "getUntilLast", at)?;
        let pred = expect_callable(arg(args, 1), OWNER, "getUntilLast", at)?;
        alloc_iter(interp, IterState::GetWhile { source, pred, until_mode: true, include_last: true, done: false }, at)
    });
    b.register(OWNER, "chain", Arity::Fixed(2), |interp, args, at| {
        let first = expect_iter(interp, arg(args, 0), "chain", at)?;
        let others = expect_list(interp, arg(args, 1), OWNER, "chain", at)?;
        let HeapData::List(items) = interp.heap.get(others) else { unreachable!() };
        let mut sources = vec![first];
        for item in items.clone() {
            sources.push(expect_iter(interp, item, "chain", at)?);
        }
        alloc_iter(interp, IterState::Chain { sources, idx: 0 }, at)
    });
    b.register(OWNER, "zip", Arity::Fixed(2), |interp, args, at| {
        let first = expect_iter(interp, arg(args, 0), "zip", at)?;
        let others = expect_list(interp, arg(args, 1), OWNER, "zip", at)?;
        let HeapData::List(items) = interp.heap.get(others) else { unreachable!() };
        let mut sources = vec![first];
        for item in items.clone() {
            sources.push(expect_iter(interp, item, "zip", at)?);
        }
        alloc_iter(interp, IterState::Zip { sources }, at)
    });
    b.register(OWNER, "batched", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "batched", at)?;
        let n = super::expect_int(interp, arg(args, 1), OWNER, "batched", at)?.max(1) as usize;
        alloc_iter(interp, IterState::Batched { source, n }, at)
    });
    b.register(OWNER, "pairwise", Arity::Fixed(1), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "pairwise", at)?;
        alloc_iter(interp, IterState::Pairwise { source, prev: None }, at)
    });
    b.register(OWNER, "cycle", Arity::Fixed(1), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "cycle", at)?;
        alloc_iter(interp, IterState::Cycle { source, buffer: Vec::new(), pos: 0, filled: false }, at)
    });
    b.register(OWNER, "enumerate", Arity::Fixed(2), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "enumerate", at)?;
        let start = super::expect_int(interp, arg(args, 1), OWNER, "enumerate", at)?;
        alloc_iter(interp, IterState::Enumerate { source, start, idx: start }, at)
    });
    b.register(OWNER, "reduce", Arity::Fixed(3), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "reduce", at)?;
        let f = expect_callable(arg(args, 1), OWNER, "reduce", at)?;
        iterator::reduce(interp, source, f, arg(args, 2), at)
    });
    b.register(OWNER, "reduceRight", Arity::Fixed(3), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "reduceRight", at)?;
        let f = expect_callable(arg(args, 1), OWNER, "reduceRight", at)?;
        iterator::reduce_right(interp, source, f, arg(args, 2), at)
    });
    b.register(OWNER, "reversed", Arity::Fixed(1), |interp, args, at| {
        let source = expect_iter(interp, arg(args, 0), "reversed", at)?;
        let state = iterator::reversed_of(interp, source, at)?;
        alloc_iter(interp, state, at)
    });
}
