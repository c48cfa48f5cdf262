//! `dict` method table (§3 `dict`).

use super::{alloc_iter, alloc_list, arg, expect_dict, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::containers::hash_key;
use crate::types::iterator::{DictIterMode, IterState};
use crate::value::Value;

const OWNER: &str = "dict";

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "len", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "len", at)?;
        let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(d.len() as i64))
    });
    b.register(OWNER, "isEmpty", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "isEmpty", at)?;
        let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(d.is_empty()))
    });
    b.register(OWNER, "get", Arity::Fixed(2), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "get", at)?;
        let key = arg(args, 1);
        let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() };
        Ok(d.get(&key, &interp.heap, at)?.unwrap_or(Value::Nil))
    });
    b.register(OWNER, "getOr", Arity::Fixed(3), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "getOr", at)?;
        let key = arg(args, 1);
        let default = arg(args, 2);
        let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() };
        Ok(d.get(&key, &interp.heap, at)?.unwrap_or(default))
    });
    b.register(OWNER, "set", Arity::Fixed(3), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "set", at)?;
        let key = arg(args, 1);
        let value = arg(args, 2);
        let hk = hash_key(&key, &interp.heap, at)?;
        let HeapData::Dict(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.insert_hashed(hk, key, value);
        Ok(Value::Nil)
    });
    b.register(OWNER, "contains", Arity::Fixed(2), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "contains", at)?;
        let key = arg(args, 1);
        let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(d.contains_key(&key, &interp.heap, at)?))
    });
    b.register(OWNER, "remove", Arity::Fixed(2), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "remove", at)?;
        let key = arg(args, 1);
        let hk = hash_key(&key, &interp.heap, at)?;
        let HeapData::Dict(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.remove_hashed(&hk).ok_or_else(|| LoxError::runtime("Key not found.", at))
    });
    b.register(OWNER, "clear", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "clear", at)?;
        let HeapData::Dict(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.clear();
        Ok(Value::Nil)
    });
    b.register(OWNER, "keys", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "keys", at)?;
        let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() };
        let keys: Vec<Value> = d.keys().collect();
        alloc_list(interp, keys, at)
    });
    b.register(OWNER, "values", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "values", at)?;
        let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() };
        let values: Vec<Value> = d.values().collect();
        alloc_list(interp, values, at)
    });
    b.register(OWNER, "items", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "items", at)?;
        let pairs = { let HeapData::Dict(d) = interp.heap.get(id) else { unreachable!() }; d.items().collect::<Vec<_>>() };
        let mut out = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            out.push(Value::Ref(interp.heap.allocate(HeapData::List(vec![k, v]), at)?));
        }
        alloc_list(interp, out, at)
    });
    b.register(OWNER, "keysIterator", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "keysIterator", at)?;
        alloc_iter(interp, IterState::FromDict { dict: id, idx: 0, mode: DictIterMode::Keys }, at)
    });
    b.register(OWNER, "valuesIterator", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "valuesIterator", at)?;
        alloc_iter(interp, IterState::FromDict { dict: id, idx: 0, mode: DictIterMode::Values }, at)
    });
    b.register(OWNER, "iterator", Arity::Fixed(1), |interp, args, at| {
        let id = expect_dict(interp, arg(args, 0), OWNER, "iterator", at)?;
        alloc_iter(interp, IterState::FromDict { dict: id, idx: 0, mode: DictIterMode::Items }, at)
    });
}
