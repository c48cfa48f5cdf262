//! The iterator protocol and its lazy combinators (§4.6).
//!
//! Grounded on the teacher's `types/iter.rs` (`OurosIter`), adapted to this crate's
//! heap-indirection model: rather than each combinator owning a `Box<dyn Iterator>`
//! (which would fight the borrow checker the moment a callback needs `&mut Heap`),
//! every combinator holds the `HeapId` of its source iterator and pulls through
//! [`pull`], which temporarily detaches the iterator state from its heap slot before
//! calling back into the interpreter (so a callback invocation -- which may itself
//! allocate, or pull another iterator -- never aliases the slot it was read from).

use num_bigint::BigInt;

use crate::error::{CodeLoc, LoxError, RunResult};
use crate::heap::{HeapData, HeapId};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// One step of iteration: either a value, or exhaustion.
pub type PullResult = RunResult<Option<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictIterMode {
    Keys,
    Values,
    Items,
}

/// The state machine behind every `iterator`-valued heap object.
#[derive(Debug)]
pub enum IterState {
    FromList { list: HeapId, idx: usize },
    FromBuffer { buffer: HeapId, idx: usize },
    FromRange { range: HeapId, idx: usize },
    FromDeque { deque: HeapId, idx: usize, reverse: bool },
    FromSet { set: HeapId, idx: usize },
    FromDict { dict: HeapId, idx: usize, mode: DictIterMode },

    CountInt { next: i64, step: i64 },
    /// §9 Open Question (a): the first emission preserves the caller's starting type
    /// (int or bigint); every subsequent step is `start + n*step` computed in `f64`.
    CountFloat { start_int: Option<i64>, start_big: Option<BigInt>, start_f: f64, step: f64, n: u64, emitted_first: bool },
    Repeat { value: Value, remaining: Option<u64> },
    Zeroes,
    Urandom,

    Map { source: HeapId, f: Value },
    Filter { source: HeapId, f: Value, keep_when: bool },
    Accumulate { source: HeapId, f: Option<Value>, state: Option<Value>, add_mode: bool },
    DropWhile { source: HeapId, pred: Value, until_mode: bool, dropping: bool },
    GetWhile { source: HeapId, pred: Value, until_mode: bool, include_last: bool, done: bool },
    Chain { sources: Vec<HeapId>, idx: usize },
    Zip { sources: Vec<HeapId> },
    Batched { source: HeapId, n: usize },
    Pairwise { source: HeapId, prev: Option<Value> },
    Cycle { source: HeapId, buffer: Vec<Value>, pos: usize, filled: bool },
    Enumerate { source: HeapId, start: i64, idx: i64 },

    /// A fully materialized, already-ordered sequence (the teacher's `OurosIter::Vec`
    /// leaf node). Backs `Iterator.reversed()`: rather than teaching every combinator
    /// how to run backwards, `reversed()` eagerly drains its source once and replays the
    /// reversed buffer lazily, which is why §4.6 documents combinator outputs as
    /// "generally not reverse-iterable until collected".
    FromVec { items: std::rc::Rc<Vec<Value>>, idx: usize },

    /// Transient placeholder used only while a state is detached from its heap slot
    /// for the duration of one [`pull`] call. Never observed as a "real" iterator
    /// state by any combinator.
    Taken,

    /// One value pulled ahead of demand, backing `hasNext` (§4.6): the plain iterator
    /// protocol has no way to ask "is there a next value" without pulling one, so
    /// `hasNext` pulls eagerly and stashes the result here for the following `pull`/
    /// `next` to replay before resuming `inner`.
    Peeked { value: Value, inner: Box<IterState> },
}

/// Pulls the next element from the iterator stored at `id`, detaching its state from
/// the heap slot for the duration of the call so the interpreter can be freely
/// borrowed mutably inside (callbacks, nested pulls, allocation).
pub fn pull(interp: &mut Interpreter, id: HeapId, at: CodeLoc) -> PullResult {
    let mut state = match interp.heap.get_mut(id) {
        HeapData::Iterator(s) => std::mem::replace(s, IterState::Taken),
        other => {
            return Err(LoxError::runtime(format!("'{}' is not an iterator.", other.type_name()), at));
        }
    };
    let result = state.advance(interp, at);
    if let HeapData::Iterator(slot) = interp.heap.get_mut(id) {
        *slot = state;
    }
    interp.tracer.on_iterator_pull(matches!(result, Ok(None)));
    result
}

/// Collects every remaining element into a `Vec`, guarding against user code handing
/// in an infinite iterator by deferring entirely to the caller's own bound (this is
/// only ever invoked by built-ins that document a finite-source requirement, e.g.
/// `Iterator.toList`).
pub fn collect_all(interp: &mut Interpreter, id: HeapId, at: CodeLoc) -> RunResult<Vec<Value>> {
    let mut out = Vec::new();
    while let Some(v) = pull(interp, id, at)? {
        out.push(v);
    }
    Ok(out)
}

impl IterState {
    fn advance(&mut self, interp: &mut Interpreter, at: CodeLoc) -> PullResult {
        match self {
            Self::FromList { list, idx } => {
                let HeapData::List(items) = interp.heap.get(*list) else {
                    return Err(LoxError::runtime("list backing an iterator was replaced.", at));
                };
                if *idx >= items.len() {
                    return Ok(None);
                }
                let v = items[*idx];
                *idx += 1;
                Ok(Some(v))
            }
            Self::FromBuffer { buffer, idx } => {
                let HeapData::Buffer(bytes) = interp.heap.get(*buffer) else {
                    return Err(LoxError::runtime("buffer backing an iterator was replaced.", at));
                };
                if *idx >= bytes.len() {
                    return Ok(None);
                }
                let v = Value::Int(i64::from(bytes[*idx]));
                *idx += 1;
                Ok(Some(v))
            }
            Self::FromRange { range, idx } => {
                let HeapData::Range(r) = interp.heap.get(*range) else {
                    return Err(LoxError::runtime("range backing an iterator was replaced.", at));
                };
                if *idx >= r.len() {
                    return Ok(None);
                }
                let v = if r.is_big {
                    let n = r.nth_big(*idx);
                    Value::Ref(interp.heap.allocate(HeapData::BigInt(n), at)?)
                } else {
                    Value::Int(r.nth_small(*idx))
                };
                *idx += 1;
                Ok(Some(v))
            }
            Self::FromDeque { deque, idx, reverse } => {
                let HeapData::Deque(d) = interp.heap.get(*deque) else {
                    return Err(LoxError::runtime("deque backing an iterator was replaced.", at));
                };
                let v = if *reverse { d.iter_rev().nth(*idx) } else { d.iter().nth(*idx) };
                match v {
                    Some(v) => {
                        *idx += 1;
                        Ok(Some(*v))
                    }
                    None => Ok(None),
                }
            }
            Self::FromSet { set, idx } => {
                let HeapData::Set(s) = interp.heap.get(*set) else {
                    return Err(LoxError::runtime("set backing an iterator was replaced.", at));
                };
                let v = s.iter_values().nth(*idx);
                match v {
                    Some(v) => {
                        *idx += 1;
                        Ok(Some(v))
                    }
                    None => Ok(None),
                }
            }
            Self::FromDict { dict, idx, mode } => {
                let HeapData::Dict(d) = interp.heap.get(*dict) else {
                    return Err(LoxError::runtime("dict backing an iterator was replaced.", at));
                };
                let entry = match mode {
                    DictIterMode::Keys => d.keys().nth(*idx).map(|k| k),
                    DictIterMode::Values => d.values().nth(*idx),
                    DictIterMode::Items => {
                        if let Some((k, v)) = d.items().nth(*idx) {
                            let pair = interp.heap.allocate(HeapData::List(vec![k, v]), at)?;
                            Some(Value::Ref(pair))
                        } else {
                            None
                        }
                    }
                };
                match entry {
                    Some(v) => {
                        *idx += 1;
                        Ok(Some(v))
                    }
                    None => Ok(None),
                }
            }

            Self::CountInt { next, step } => {
                let v = Value::Int(*next);
                *next = next.saturating_add(*step);
                Ok(Some(v))
            }
            Self::CountFloat { start_int, start_big, start_f, step, n, emitted_first } => {
                if !*emitted_first {
                    *emitted_first = true;
                    *n += 1;
                    if let Some(i) = start_int {
                        return Ok(Some(Value::Int(*i)));
                    }
                    if let Some(b) = start_big.take() {
                        let id = interp.heap.allocate(HeapData::BigInt(b), at)?;
                        return Ok(Some(Value::Ref(id)));
                    }
                    return Ok(Some(Value::Float(*start_f)));
                }
                let v = *start_f + (*n as f64) * *step;
                *n += 1;
                Ok(Some(Value::Float(v)))
            }
            Self::Repeat { value, remaining } => match remaining {
                Some(0) => Ok(None),
                Some(n) => {
                    *n -= 1;
                    Ok(Some(*value))
                }
                None => Ok(Some(*value)),
            },
            Self::Zeroes => Ok(Some(Value::Int(0))),
            Self::Urandom => {
                use rand::RngCore;
                Ok(Some(Value::Int(i64::from(interp.rng.next_u32()))))
            }

            Self::Map { source, f } => {
                let source = *source;
                let f = *f;
                match pull(interp, source, at)? {
                    Some(v) => Ok(Some(interp.call_value(f, &[v], at)?)),
                    None => Ok(None),
                }
            }
            Self::Filter { source, f, keep_when } => {
                let source = *source;
                let f = *f;
                let keep_when = *keep_when;
                loop {
                    match pull(interp, source, at)? {
                        Some(v) => {
                            let keep = interp.call_value(f, &[v], at)?.is_truthy(&interp.heap);
                            if keep == keep_when {
                                return Ok(Some(v));
                            }
                        }
                        None => return Ok(None),
                    }
                }
            }
            Self::Accumulate { source, f, state, add_mode } => {
                let source = *source;
                let f = f.clone();
                let add_mode = *add_mode;
                let Some(next) = pull(interp, source, at)? else { return Ok(None) };
                let combined = match (&state, &f) {
                    (None, _) => next,
                    (Some(acc), Some(func)) => interp.call_value(*func, &[*acc, next], at)?,
                    (Some(acc), None) => {
                        if add_mode {
                            interp.numeric_add(*acc, next, at)?
                        } else {
                            next
                        }
                    }
                };
                *state = Some(combined);
                Ok(Some(combined))
            }
            Self::DropWhile { source, pred, until_mode, dropping } => {
                let source = *source;
                let pred = *pred;
                let until_mode = *until_mode;
                while *dropping {
                    match pull(interp, source, at)? {
                        Some(v) => {
                            let hit = interp.call_value(pred, &[v], at)?.is_truthy(&interp.heap);
                            let should_drop = if until_mode { !hit } else { hit };
                            if !should_drop {
                                *dropping = false;
                                return Ok(Some(v));
                            }
                        }
                        None => return Ok(None),
                    }
                }
                pull(interp, source, at)
            }
            Self::GetWhile { source, pred, until_mode, include_last, done } => {
                if *done {
                    return Ok(None);
                }
                let source = *source;
                let pred = *pred;
                let until_mode = *until_mode;
                let include_last = *include_last;
                match pull(interp, source, at)? {
                    Some(v) => {
                        let hit = interp.call_value(pred, &[v], at)?.is_truthy(&interp.heap);
                        let keep_going = if until_mode { !hit } else { hit };
                        if keep_going {
                            Ok(Some(v))
                        } else {
                            *done = true;
                            if include_last {
                                Ok(Some(v))
                            } else {
                                Ok(None)
                            }
                        }
                    }
                    None => {
                        *done = true;
                        Ok(None)
                    }
                }
            }
            Self::Chain { sources, idx } => loop {
                if *idx >= sources.len() {
                    return Ok(None);
                }
                let current = sources[*idx];
                match pull(interp, current, at)? {
                    Some(v) => return Ok(Some(v)),
                    None => *idx += 1,
                }
            },
            Self::Zip { sources } => {
                let mut out = Vec::with_capacity(sources.len());
                for src in sources.iter() {
                    match pull(interp, *src, at)? {
                        Some(v) => out.push(v),
                        None => return Ok(None),
                    }
                }
                let id = interp.heap.allocate(HeapData::List(out), at)?;
                Ok(Some(Value::Ref(id)))
            }
            Self::Batched { source, n } => {
                let source = *source;
                let n = *n;
                let mut batch = Vec::with_capacity(n);
                for _ in 0..n {
                    match pull(interp, source, at)? {
                        Some(v) => batch.push(v),
                        None => break,
                    }
                }
                if batch.is_empty() {
                    return Ok(None);
                }
                let id = interp.heap.allocate(HeapData::List(batch), at)?;
                Ok(Some(Value::Ref(id)))
            }
            Self::Pairwise { source, prev } => {
                let source = *source;
                if prev.is_none() {
                    *prev = pull(interp, source, at)?;
                    if prev.is_none() {
                        return Ok(None);
                    }
                }
                match pull(interp, source, at)? {
                    Some(cur) => {
                        let pair = interp.heap.allocate(HeapData::List(vec![prev.unwrap(), cur]), at)?;
                        *prev = Some(cur);
                        Ok(Some(Value::Ref(pair)))
                    }
                    None => Ok(None),
                }
            }
            Self::Cycle { source, buffer, pos, filled } => {
                let source = *source;
                if !*filled {
                    match pull(interp, source, at)? {
                        Some(v) => {
                            buffer.push(v);
                            return Ok(Some(v));
                        }
                        None => {
                            *filled = true;
                            if buffer.is_empty() {
                                return Ok(None);
                            }
                        }
                    }
                }
                if buffer.is_empty() {
                    return Ok(None);
                }
                let v = buffer[*pos % buffer.len()];
                *pos += 1;
                Ok(Some(v))
            }
            Self::Enumerate { source, idx, .. } => {
                let source = *source;
                match pull(interp, source, at)? {
                    Some(v) => {
                        let pair = interp.heap.allocate(HeapData::List(vec![Value::Int(*idx), v]), at)?;
                        *idx += 1;
                        Ok(Some(Value::Ref(pair)))
                    }
                    None => Ok(None),
                }
            }
            Self::FromVec { items, idx } => {
                if *idx >= items.len() {
                    return Ok(None);
                }
                let v = items[*idx];
                *idx += 1;
                Ok(Some(v))
            }
            Self::Taken => Err(LoxError::runtime("internal: pulled a detached iterator state.", at)),
            Self::Peeked { value, inner } => {
                let v = *value;
                let inner = std::mem::replace(inner, Box::new(IterState::Taken));
                *self = *inner;
                Ok(Some(v))
            }
        }
    }
}

/// Returns whether a subsequent `pull` would yield a value, without consuming it
/// (§4.6 `hasNext`). Pulls eagerly and re-wraps the result as [`IterState::Peeked`] so
/// the next `pull`/`next` replays it before resuming the source.
pub fn has_next(interp: &mut Interpreter, id: HeapId, at: CodeLoc) -> RunResult<bool> {
    if let HeapData::Iterator(IterState::Peeked { .. }) = interp.heap.get(id) {
        return Ok(true);
    }
    match pull(interp, id, at)? {
        None => Ok(false),
        Some(v) => {
            let HeapData::Iterator(slot) = interp.heap.get_mut(id) else { unreachable!() };
            let resumed = std::mem::replace(slot, IterState::Taken);
            *slot = IterState::Peeked { value: v, inner: Box::new(resumed) };
            Ok(true)
        }
    }
}

/// Eager fold over a finite source, left-to-right.
pub fn reduce(interp: &mut Interpreter, source: HeapId, f: Value, init: Value, at: CodeLoc) -> RunResult<Value> {
    let mut acc = init;
    while let Some(v) = pull(interp, source, at)? {
        acc = interp.call_value(f, &[acc, v], at)?;
    }
    Ok(acc)
}

/// Eager fold over a finite source, right-to-left: drains `source` fully, then folds
/// the reversed buffer. Satisfies §8's `reduce(it, f, z) == reduceRight(it.reversed(), f, z)`.
pub fn reduce_right(interp: &mut Interpreter, source: HeapId, f: Value, init: Value, at: CodeLoc) -> RunResult<Value> {
    let mut items = collect_all(interp, source, at)?;
    items.reverse();
    let mut acc = init;
    for v in items {
        acc = interp.call_value(f, &[acc, v], at)?;
    }
    Ok(acc)
}

/// Drains `source` fully and allocates a fresh iterator that replays it back to front.
pub fn reversed_of(interp: &mut Interpreter, source: HeapId, at: CodeLoc) -> RunResult<IterState> {
    let mut items = collect_all(interp, source, at)?;
    items.reverse();
    Ok(IterState::FromVec { items: std::rc::Rc::new(items), idx: 0 })
}
