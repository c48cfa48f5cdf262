//! `list` method table (§3 `list`).

use super::{alloc_iter, alloc_list, arg, expect_callable, expect_int, normalize_index, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::iterator::IterState;
use crate::value::Value;

const OWNER: &str = "list";

fn items_of(interp: &crate::interpreter::Interpreter, v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<Vec<Value>> {
    if let Value::Ref(id) = v {
        if let HeapData::List(items) = interp.heap.get(id) {
            return Ok(items.clone());
        }
    }
    Err(LoxError::bad_argument(OWNER, method, "list", at))
}

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "len", Arity::Fixed(1), |interp, args, at| {
        let items = items_of(interp, arg(args, 0), "len", at)?;
        Ok(Value::Int(items.len() as i64))
    });
    b.register(OWNER, "push", Arity::Fixed(2), |interp, args, at| {
        let Value::Ref(id) = arg(args, 0) else { return Err(LoxError::bad_argument(OWNER, "push", "list", at)) };
        let HeapData::List(items) = interp.heap.get_mut(id) else { return Err(LoxError::bad_argument(OWNER, "push", "list", at)) };
        items.push(arg(args, 1));
        Ok(Value::Nil)
    });
    b.register(OWNER, "pop", Arity::Fixed(1), |interp, args, at| {
        let Value::Ref(id) = arg(args, 0) else { return Err(LoxError::bad_argument(OWNER, "pop", "list", at)) };
        let HeapData::List(items) = interp.heap.get_mut(id) else { return Err(LoxError::bad_argument(OWNER, "pop", "list", at)) };
        items.pop().ok_or_else(|| LoxError::runtime("Cannot pop from an empty list.", at))
    });
    b.register(OWNER, "insert", Arity::Fixed(3), |interp, args, at| {
        let Value::Ref(id) = arg(args, 0) else { return Err(LoxError::bad_argument(OWNER, "insert", "list", at)) };
        let idx = expect_int(interp, arg(args, 1), OWNER, "insert", at)?;
        let HeapData::List(items) = interp.heap.get_mut(id) else { return Err(LoxError::bad_argument(OWNER, "insert", "list", at)) };
        let len = items.len();
        let idx = if idx < 0 { 0 } else { (idx as usize).min(len) };
        items.insert(idx, arg(args, 2));
        Ok(Value::Nil)
    });
    b.register(OWNER, "removeAt", Arity::Fixed(2), |interp, args, at| {
        let Value::Ref(id) = arg(args, 0) else { return Err(LoxError::bad_argument(OWNER, "removeAt", "list", at)) };
        let idx = expect_int(interp, arg(args, 1), OWNER, "removeAt", at)?;
        let len = { let HeapData::List(items) = interp.heap.get(id) else { unreachable!() }; items.len() };
        let idx = normalize_index(idx, len, at)?;
        let HeapData::List(items) = interp.heap.get_mut(id) else { unreachable!() };
        Ok(items.remove(idx))
    });
    b.register(OWNER, "contains", Arity::Fixed(2), |interp, args, at| {
        let items = items_of(interp, arg(args, 0), "contains", at)?;
        let needle = arg(args, 1);
        Ok(Value::Bool(items.iter().any(|v| v.equals(&needle, &interp.heap))))
    });
    b.register(OWNER, "indexOf", Arity::Fixed(2), |interp, args, at| {
        let items = items_of(interp, arg(args, 0), "indexOf", at)?;
        let needle = arg(args, 1);
        Ok(items
            .iter()
            .position(|v| v.equals(&needle, &interp.heap))
            .map_or(Value::Int(-1), |i| Value::Int(i as i64)))
    });
    b.register(OWNER, "slice", Arity::Fixed(3), |interp, args, at| {
        let items = items_of(interp, arg(args, 0), "slice", at)?;
        let start = expect_int(interp, arg(args, 1), OWNER, "slice", at)?.max(0) as usize;
        let end = expect_int(interp, arg(args, 2), OWNER, "slice", at)?.max(0) as usize;
        let end = end.min(items.len());
        let start = start.min(end);
        alloc_list(interp, items[start..end].to_vec(), at)
    });
    b.register(OWNER, "reverse", Arity::Fixed(1), |interp, args, at| {
        let mut items = items_of(interp, arg(args, 0), "reverse", at)?;
        items.reverse();
        alloc_list(interp, items, at)
    });
    b.register(OWNER, "clear", Arity::Fixed(1), |interp, args, at| {
        let Value::Ref(id) = arg(args, 0) else { return Err(LoxError::bad_argument(OWNER, "clear", "list", at)) };
        let HeapData::List(items) = interp.heap.get_mut(id) else { return Err(LoxError::bad_argument(OWNER, "clear", "list", at)) };
        items.clear();
        Ok(Value::Nil)
    });
    b.register(OWNER, "sort", Arity::Fixed(1), |interp, args, at| {
        let Value::Ref(id) = arg(args, 0) else { return Err(LoxError::bad_argument(OWNER, "sort", "list", at)) };
        let mut items = { let HeapData::List(items) = interp.heap.get(id) else { unreachable!() }; items.clone() };
        let mut err = None;
        items.sort_by(|a, b| match crate::numeric::compare(interp, *a, *b, at) {
            Ok(ord) => ord,
            Err(e) => { err.get_or_insert(e); std::cmp::Ordering::Equal }
        });
        if let Some(e) = err { return Err(e); }
        let HeapData::List(slot) = interp.heap.get_mut(id) else { unreachable!() };
        *slot = items;
        Ok(arg(args, 0))
    });
    b.register(OWNER, "sortBy", Arity::Fixed(2), |interp, args, at| {
        let Value::Ref(id) = arg(args, 0) else { return Err(LoxError::bad_argument(OWNER, "sortBy", "list", at)) };
        let key_fn = expect_callable(arg(args, 1), OWNER, "sortBy", at)?;
        let items = { let HeapData::List(items) = interp.heap.get(id) else { unreachable!() }; items.clone() };
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            let key = interp.call_value(key_fn, &[item], at)?;
            keyed.push((key, item));
        }
        let mut err = None;
        keyed.sort_by(|a, b| match crate::numeric::compare(interp, a.0, b.0, at) {
            Ok(ord) => ord,
            Err(e) => { err.get_or_insert(e); std::cmp::Ordering::Equal }
        });
        if let Some(e) = err { return Err(e); }
        let sorted: Vec<Value> = keyed.into_iter().map(|(_, v)| v).collect();
        let HeapData::List(slot) = interp.heap.get_mut(id) else { unreachable!() };
        *slot = sorted;
        Ok(arg(args, 0))
    });
    b.register(OWNER, "map", Arity::Fixed(2), |interp, args, at| {
        let f = expect_callable(arg(args, 1), OWNER, "map", at)?;
        let list_id = super::expect_list(interp, arg(args, 0), OWNER, "map", at)?;
        let source = interp.heap.allocate(HeapData::Iterator(IterState::FromList { list: list_id, idx: 0 }), at)?;
        alloc_iter(interp, IterState::Map { source, f }, at)
    });
    b.register(OWNER, "filter", Arity::Fixed(2), |interp, args, at| {
        let f = expect_callable(arg(args, 1), OWNER, "filter", at)?;
        let list_id = super::expect_list(interp, arg(args, 0), OWNER, "filter", at)?;
        let source = interp.heap.allocate(HeapData::Iterator(IterState::FromList { list: list_id, idx: 0 }), at)?;
        alloc_iter(interp, IterState::Filter { source, f, keep_when: true }, at)
    });
    b.register(OWNER, "iterator", Arity::Fixed(1), |interp, args, at| {
        let list_id = super::expect_list(interp, arg(args, 0), OWNER, "iterator", at)?;
        alloc_iter(interp, IterState::FromList { list: list_id, idx: 0 }, at)
    });
    b.register(OWNER, "join", Arity::Fixed(2), |interp, args, at| {
        let items = items_of(interp, arg(args, 0), "join", at)?;
        let sep = super::expect_str(interp, arg(args, 1), OWNER, "join", at)?;
        let parts: Vec<String> = items.iter().map(|v| v.display(&interp.heap, false)).collect();
        super::alloc_str(interp, parts.join(sep.as_ref()), at)
    });
    b.register(OWNER, "reduce", Arity::Fixed(3), |interp, args, at| {
        let f = expect_callable(arg(args, 1), OWNER, "reduce", at)?;
        let init = arg(args, 2);
        let list_id = super::expect_list(interp, arg(args, 0), OWNER, "reduce", at)?;
        let source = interp.heap.allocate(HeapData::Iterator(IterState::FromList { list: list_id, idx: 0 }), at)?;
        crate::types::iterator::reduce(interp, source, f, init, at)
    });
}
