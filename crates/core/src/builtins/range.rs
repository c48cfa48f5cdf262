//! `range`/`bigrange` method table (§3 `range`).

use num_bigint::BigInt;

use super::{alloc_iter, alloc_list, arg, expect_range, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::iterator::IterState;
use crate::value::Value;

const OWNER: &str = "range";

fn nth(interp: &mut crate::interpreter::Interpreter, range_id: crate::heap::HeapId, i: usize, at: crate::error::CodeLoc) -> crate::error::RunResult<Value> {
    let HeapData::Range(r) = interp.heap.get(range_id) else { unreachable!() };
    if r.is_big {
        let n = r.nth_big(i);
        Ok(Value::Ref(interp.heap.allocate(HeapData::BigInt(n), at)?))
    } else {
        Ok(Value::Int(r.nth_small(i)))
    }
}

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "len", Arity::Fixed(1), |interp, args, at| {
        let id = expect_range(interp, arg(args, 0), OWNER, "len", at)?;
        let HeapData::Range(r) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(r.len() as i64))
    });
    b.register(OWNER, "isEmpty", Arity::Fixed(1), |interp, args, at| {
        let id = expect_range(interp, arg(args, 0), OWNER, "isEmpty", at)?;
        let HeapData::Range(r) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(r.is_empty()))
    });
    b.register(OWNER, "contains", Arity::Fixed(2), |interp, args, at| {
        let id = expect_range(interp, arg(args, 0), OWNER, "contains", at)?;
        let needle = arg(args, 1);
        let n = match needle {
            Value::Int(i) => BigInt::from(i),
            Value::Ref(nid) => match interp.heap.get(nid) {
                HeapData::BigInt(b) => b.clone(),
                _ => return Err(LoxError::bad_argument(OWNER, "contains", "int", at)),
            },
            _ => return Err(LoxError::bad_argument(OWNER, "contains", "int", at)),
        };
        let HeapData::Range(r) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(r.contains(&n)))
    });
    b.register(OWNER, "toList", Arity::Fixed(1), |interp, args, at| {
        let id = expect_range(interp, arg(args, 0), OWNER, "toList", at)?;
        let len = { let HeapData::Range(r) = interp.heap.get(id) else { unreachable!() }; r.len() };
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            out.push(nth(interp, id, i, at)?);
        }
        alloc_list(interp, out, at)
    });
    b.register(OWNER, "iterator", Arity::Fixed(1), |interp, args, at| {
        let id = expect_range(interp, arg(args, 0), OWNER, "iterator", at)?;
        alloc_iter(interp, IterState::FromRange { range: id, idx: 0 }, at)
    });
    b.register(OWNER, "reversedIterator", Arity::Fixed(1), |interp, args, at| {
        let id = expect_range(interp, arg(args, 0), OWNER, "reversedIterator", at)?;
        let len = { let HeapData::Range(r) = interp.heap.get(id) else { unreachable!() }; r.len() };
        let mut out = Vec::with_capacity(len);
        for i in (0..len).rev() {
            out.push(nth(interp, id, i, at)?);
        }
        alloc_iter(interp, IterState::FromVec { items: std::rc::Rc::new(out), idx: 0 }, at)
    });
}
