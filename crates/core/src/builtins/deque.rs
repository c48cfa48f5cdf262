//! `deque`/`queue`/`ring` method table (§3).
//!
//! All three share one backing [`crate::types::containers::Deque`] (see that module's
//! doc comment); this registers the same method set under all three type names since
//! the surface exposed to the user differs only by convention (a `queue` is meant to be
//! used FIFO, a `ring` with a fixed capacity), not by a different table of operations.

use super::{alloc_iter, alloc_list, arg, expect_deque, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::iterator::IterState;
use crate::value::Value;

pub fn register(b: &mut Builtins) {
    for owner in ["deque", "queue", "ring"] {
        register_for(b, owner);
    }
}

fn register_for(b: &mut Builtins, owner: &'static str) {
    b.register(owner, "pushBack", Arity::Fixed(2), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "pushBack", at)?;
        let HeapData::Deque(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.push_back(arg(args, 1));
        Ok(Value::Nil)
    });
    b.register(owner, "pushFront", Arity::Fixed(2), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "pushFront", at)?;
        let HeapData::Deque(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.push_front(arg(args, 1));
        Ok(Value::Nil)
    });
    b.register(owner, "popBack", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "popBack", at)?;
        let HeapData::Deque(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.pop_back().ok_or_else(|| LoxError::runtime(format!("Cannot pop from an empty {owner}."), at))
    });
    b.register(owner, "popFront", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "popFront", at)?;
        let HeapData::Deque(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.pop_front().ok_or_else(|| LoxError::runtime(format!("Cannot pop from an empty {owner}."), at))
    });
    b.register(owner, "len", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "len", at)?;
        let HeapData::Deque(d) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(d.len() as i64))
    });
    b.register(owner, "isEmpty", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "isEmpty", at)?;
        let HeapData::Deque(d) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(d.is_empty()))
    });
    b.register(owner, "clear", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "clear", at)?;
        let HeapData::Deque(d) = interp.heap.get_mut(id) else { unreachable!() };
        d.clear();
        Ok(Value::Nil)
    });
    b.register(owner, "toList", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "toList", at)?;
        let HeapData::Deque(d) = interp.heap.get(id) else { unreachable!() };
        let items: Vec<Value> = d.iter().copied().collect();
        alloc_list(interp, items, at)
    });
    b.register(owner, "iterator", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "iterator", at)?;
        alloc_iter(interp, IterState::FromDeque { deque: id, idx: 0, reverse: false }, at)
    });
    b.register(owner, "reversedIterator", Arity::Fixed(1), move |interp, args, at| {
        let id = expect_deque(interp, arg(args, 0), owner, "reversedIterator", at)?;
        alloc_iter(interp, IterState::FromDeque { deque: id, idx: 0, reverse: true }, at)
    });
}
