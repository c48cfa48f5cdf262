//! `set` method table (§3 `set`).

use super::{alloc_iter, alloc_list, arg, expect_set, Builtins};
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::containers::hash_key;
use crate::types::iterator::IterState;
use crate::value::Value;

const OWNER: &str = "set";

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "len", Arity::Fixed(1), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "len", at)?;
        let HeapData::Set(s) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(s.len() as i64))
    });
    b.register(OWNER, "isEmpty", Arity::Fixed(1), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "isEmpty", at)?;
        let HeapData::Set(s) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(s.is_empty()))
    });
    b.register(OWNER, "add", Arity::Fixed(2), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "add", at)?;
        let value = arg(args, 1);
        let hk = hash_key(&value, &interp.heap, at)?;
        let HeapData::Set(s) = interp.heap.get_mut(id) else { unreachable!() };
        Ok(Value::Bool(s.add_hashed(hk, value)))
    });
    b.register(OWNER, "remove", Arity::Fixed(2), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "remove", at)?;
        let value = arg(args, 1);
        let hk = hash_key(&value, &interp.heap, at)?;
        let HeapData::Set(s) = interp.heap.get_mut(id) else { unreachable!() };
        Ok(Value::Bool(s.remove_hashed(&hk)))
    });
    b.register(OWNER, "contains", Arity::Fixed(2), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "contains", at)?;
        let value = arg(args, 1);
        let HeapData::Set(s) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(s.contains(&value, &interp.heap, at)?))
    });
    b.register(OWNER, "clear", Arity::Fixed(1), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "clear", at)?;
        let HeapData::Set(s) = interp.heap.get_mut(id) else { unreachable!() };
        s.clear();
        Ok(Value::Nil)
    });
    b.register(OWNER, "toList", Arity::Fixed(1), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "toList", at)?;
        let HeapData::Set(s) = interp.heap.get(id) else { unreachable!() };
        let items: Vec<Value> = s.iter_values().collect();
        alloc_list(interp, items, at)
    });
    b.register(OWNER, "iterator", Arity::Fixed(1), |interp, args, at| {
        let id = expect_set(interp, arg(args, 0), OWNER, "iterator", at)?;
        alloc_iter(interp, IterState::FromSet { set: id, idx: 0 }, at)
    });
    b.register(OWNER, "union", Arity::Fixed(2), |interp, args, at| {
        let a = expect_set(interp, arg(args, 0), OWNER, "union", at)?;
        let other = expect_set(interp, arg(args, 1), OWNER, "union", at)?;
        let mut values: Vec<Value> = { let HeapData::Set(s) = interp.heap.get(a) else { unreachable!() }; s.iter_values().collect() };
        let other_values: Vec<Value> = { let HeapData::Set(s) = interp.heap.get(other) else { unreachable!() }; s.iter_values().collect() };
        let mut out = crate::types::containers::LoxSet::new();
        for v in values.drain(..).chain(other_values) {
            out.add(v, &interp.heap, at)?;
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Set(out), at)?))
    });
    b.register(OWNER, "intersection", Arity::Fixed(2), |interp, args, at| {
        let a = expect_set(interp, arg(args, 0), OWNER, "intersection", at)?;
        let other = expect_set(interp, arg(args, 1), OWNER, "intersection", at)?;
        let mine: Vec<Value> = { let HeapData::Set(s) = interp.heap.get(a) else { unreachable!() }; s.iter_values().collect() };
        let mut out = crate::types::containers::LoxSet::new();
        for v in mine {
            let keep = { let HeapData::Set(s) = interp.heap.get(other) else { unreachable!() }; s.contains(&v, &interp.heap, at)? };
            if keep {
                out.add(v, &interp.heap, at)?;
            }
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Set(out), at)?))
    });
    b.register(OWNER, "difference", Arity::Fixed(2), |interp, args, at| {
        let a = expect_set(interp, arg(args, 0), OWNER, "difference", at)?;
        let other = expect_set(interp, arg(args, 1), OWNER, "difference", at)?;
        let mine: Vec<Value> = { let HeapData::Set(s) = interp.heap.get(a) else { unreachable!() }; s.iter_values().collect() };
        let mut out = crate::types::containers::LoxSet::new();
        for v in mine {
            let skip = { let HeapData::Set(s) = interp.heap.get(other) else { unreachable!() }; s.contains(&v, &interp.heap, at)? };
            if !skip {
                out.add(v, &interp.heap, at)?;
            }
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Set(out), at)?))
    });
}
