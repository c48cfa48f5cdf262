//! `priorityQueue`/`priorityQueueBuilder` method tables (§4.7).

use super::{alloc_list, arg, expect_pqueue, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::pqueue::{priority_key, PriorityKey, PriorityQueueBuilder};
use crate::value::Value;

const OWNER: &str = "priorityQueue";
const BUILDER: &str = "priorityQueueBuilder";

fn priority_to_value(interp: &mut crate::interpreter::Interpreter, key: &PriorityKey, at: crate::error::CodeLoc) -> crate::error::RunResult<Value> {
    Ok(match key {
        PriorityKey::Int(i) => Value::Int(*i),
        PriorityKey::Float(f) => Value::Float(*f),
        PriorityKey::Str(s) => super::alloc_str(interp, s.clone(), at)?,
    })
}

fn expect_builder(interp: &crate::interpreter::Interpreter, v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<crate::heap::HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::PriorityQueueBuilder(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(BUILDER, method, "priorityQueueBuilder", at))
}

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "len", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "len", at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(q.len() as i64))
    });
    b.register(OWNER, "isEmpty", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "isEmpty", at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(q.is_empty()))
    });
    b.register(OWNER, "enqueue", Arity::Fixed(3), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "enqueue", at)?;
        let priority = priority_key(&arg(args, 1), &interp.heap, at)?;
        let value = arg(args, 2);
        let HeapData::PriorityQueue(q) = interp.heap.get_mut(id) else { unreachable!() };
        q.enqueue(value, priority, at)?;
        Ok(Value::Nil)
    });
    b.register(OWNER, "dequeue", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "dequeue", at)?;
        let popped = { let HeapData::PriorityQueue(q) = interp.heap.get_mut(id) else { unreachable!() }; q.dequeue() };
        match popped {
            None => Ok(Value::Nil),
            Some((value, priority)) => {
                let priority = priority_to_value(interp, &priority, at)?;
                alloc_list(interp, vec![value, priority], at)
            }
        }
    });
    b.register(OWNER, "dequeueErr", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "dequeueErr", at)?;
        let (value, priority) = { let HeapData::PriorityQueue(q) = interp.heap.get_mut(id) else { unreachable!() }; q.dequeue_err(at)? };
        let priority = priority_to_value(interp, &priority, at)?;
        alloc_list(interp, vec![value, priority], at)
    });
    b.register(OWNER, "peek", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "peek", at)?;
        let peeked = { let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() }; q.peek().map(|(v, k)| (*v, k.clone())) };
        match peeked {
            None => Ok(Value::Nil),
            Some((value, priority)) => {
                let priority = priority_to_value(interp, &priority, at)?;
                alloc_list(interp, vec![value, priority], at)
            }
        }
    });
    b.register(OWNER, "clear", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "clear", at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get_mut(id) else { unreachable!() };
        q.clear();
        Ok(Value::Nil)
    });
    b.register(OWNER, "reset", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "reset", at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get_mut(id) else { unreachable!() };
        q.reset();
        Ok(Value::Nil)
    });
    b.register(OWNER, "resetReversed", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "resetReversed", at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get_mut(id) else { unreachable!() };
        q.reset_reversed();
        Ok(Value::Nil)
    });
    b.register(OWNER, "contains", Arity::Fixed(3), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "contains", at)?;
        let value = arg(args, 1);
        let key = priority_key(&arg(args, 2), &interp.heap, at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(q.contains(&value, &key, &interp.heap)))
    });
    b.register(OWNER, "containsPriority", Arity::Fixed(2), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "containsPriority", at)?;
        let key = priority_key(&arg(args, 1), &interp.heap, at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(q.contains_priority(&key)))
    });
    b.register(OWNER, "containsValue", Arity::Fixed(2), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "containsValue", at)?;
        let value = arg(args, 1);
        let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(q.contains_value(&value, &interp.heap)))
    });
    b.register(OWNER, "getValueByPriority", Arity::Fixed(2), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "getValueByPriority", at)?;
        let key = priority_key(&arg(args, 1), &interp.heap, at)?;
        let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() };
        match q.value_by_priority(&key) {
            None => Ok(Value::Nil),
            Some([single]) => Ok(*single),
            Some(bag) => {
                let items = bag.to_vec();
                alloc_list(interp, items, at)
            }
        }
    });
    b.register(OWNER, "getPriorityByValue", Arity::Fixed(2), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "getPriorityByValue", at)?;
        let needle = arg(args, 1);
        let found = { let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() }; q.priority_of_value(&needle, &interp.heap) };
        match found {
            Some(key) => priority_to_value(interp, &key, at),
            None => Ok(Value::Nil),
        }
    });
    b.register(OWNER, "prioritiesListAny", Arity::Fixed(1), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "prioritiesListAny", at)?;
        let keys = { let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() }; q.priorities_list() };
        let mut out = Vec::with_capacity(keys.len());
        for key in &keys {
            out.push(priority_to_value(interp, key, at)?);
        }
        alloc_list(interp, out, at)
    });
    b.register(OWNER, "forEach", Arity::Fixed(2), |interp, args, at| {
        let id = expect_pqueue(interp, arg(args, 0), OWNER, "forEach", at)?;
        let f = super::expect_callable(arg(args, 1), OWNER, "forEach", at)?;
        let entries = { let HeapData::PriorityQueue(q) = interp.heap.get(id) else { unreachable!() }; q.for_each_in_heap_order() };
        for (value, priority) in entries {
            let priority_val = priority_to_value(interp, &priority, at)?;
            interp.call_value(f, &[value, priority_val], at)?;
        }
        Ok(Value::Nil)
    });
    b.register(OWNER, "equals", Arity::Fixed(2), |interp, args, at| {
        let a = expect_pqueue(interp, arg(args, 0), OWNER, "equals", at)?;
        let other = expect_pqueue(interp, arg(args, 1), OWNER, "equals", at)?;
        let HeapData::PriorityQueue(l) = interp.heap.get(a) else { unreachable!() };
        let HeapData::PriorityQueue(r) = interp.heap.get(other) else { unreachable!() };
        Ok(Value::Bool(l.equals(r, &interp.heap)))
    });
    b.register(OWNER, "equalsPriorities", Arity::Fixed(2), |interp, args, at| {
        let a = expect_pqueue(interp, arg(args, 0), OWNER, "equalsPriorities", at)?;
        let other = expect_pqueue(interp, arg(args, 1), OWNER, "equalsPriorities", at)?;
        let HeapData::PriorityQueue(l) = interp.heap.get(a) else { unreachable!() };
        let HeapData::PriorityQueue(r_owned) = interp.heap.get(other) else { unreachable!() };
        Ok(Value::Bool(l.equals_priorities(r_owned)))
    });
    b.register(OWNER, "equalsValues", Arity::Fixed(2), |interp, args, at| {
        let a = expect_pqueue(interp, arg(args, 0), OWNER, "equalsValues", at)?;
        let other = expect_pqueue(interp, arg(args, 1), OWNER, "equalsValues", at)?;
        let HeapData::PriorityQueue(l) = interp.heap.get(a) else { unreachable!() };
        let HeapData::PriorityQueue(r) = interp.heap.get(other) else { unreachable!() };
        Ok(Value::Bool(l.equals_values(r, &interp.heap)))
    });

    b.register(BUILDER, "reversed", Arity::Fixed(1), |interp, args, at| {
        let id = expect_builder(interp, arg(args, 0), "reversed", at)?;
        let HeapData::PriorityQueueBuilder(builder) = interp.heap.get_mut(id) else { unreachable!() };
        builder.reversed = true;
        Ok(arg(args, 0))
    });
    b.register(BUILDER, "allowDuplicates", Arity::Fixed(1), |interp, args, at| {
        let id = expect_builder(interp, arg(args, 0), "allowDuplicates", at)?;
        let HeapData::PriorityQueueBuilder(builder) = interp.heap.get_mut(id) else { unreachable!() };
        builder.allow_duplicates = true;
        Ok(arg(args, 0))
    });
    b.register(BUILDER, "build", Arity::Fixed(1), |interp, args, at| {
        let id = expect_builder(interp, arg(args, 0), "build", at)?;
        let HeapData::PriorityQueueBuilder(builder) = interp.heap.get(id) else { unreachable!() };
        let queue = builder.build();
        Ok(Value::Ref(interp.heap.allocate(HeapData::PriorityQueue(queue), at)?))
    });
    b.register(BUILDER, "buildArgs", Arity::AtLeast(1), |interp, args, at| {
        let id = expect_builder(interp, arg(args, 0), "buildArgs", at)?;
        let HeapData::PriorityQueueBuilder(builder) = interp.heap.get(id) else { unreachable!() };
        let builder: PriorityQueueBuilder = *builder;
        let mut queue = builder.build();
        let pairs = &args[1..];
        if pairs.len() % 2 != 0 {
            return Err(LoxError::runtime("buildArgs expects (priority, value) pairs.", at));
        }
        let mut i = 0;
        while i < pairs.len() {
            let priority = priority_key(&pairs[i], &interp.heap, at)?;
            let value = pairs[i + 1];
            queue.enqueue(value, priority, at)?;
            i += 2;
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::PriorityQueue(queue), at)?))
    });
    b.register(BUILDER, "buildDict", Arity::Fixed(2), |interp, args, at| {
        let id = expect_builder(interp, arg(args, 0), "buildDict", at)?;
        let HeapData::PriorityQueueBuilder(builder) = interp.heap.get(id) else { unreachable!() };
        let builder: PriorityQueueBuilder = *builder;
        let dict_id = super::expect_dict(interp, arg(args, 1), BUILDER, "buildDict", at)?;
        let pairs = { let HeapData::Dict(d) = interp.heap.get(dict_id) else { unreachable!() }; d.items().collect::<Vec<_>>() };
        let mut queue = builder.build();
        for (value, priority_val) in pairs {
            let priority = priority_key(&priority_val, &interp.heap, at)?;
            queue.enqueue(value, priority, at)?;
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::PriorityQueue(queue), at)?))
    });
}
