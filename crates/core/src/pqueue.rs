//! Priority-queue engine (§4.7).
//!
//! Grounded on the teacher's `modules/heapq.rs`: a binary heap keyed by priority, plus
//! an auxiliary priority -> value(s) index so `getValueByPriority`/`containsPriority`
//! are O(1)/O(1)-amortized instead of a heap scan. Values are compared by a caller-
//! supplied `Value` priority reduced to an orderable key the same way dict/set keys are
//! reduced (see [`crate::types::containers::hash_key`]); `NaN`-bearing float priorities
//! are rejected at `enqueue` rather than silently breaking heap order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{CodeLoc, LoxError, RunResult};
use crate::heap::Heap;
use crate::value::Value;

/// A totally-ordered reduction of a priority value. Only numeric and string priorities
/// are supported (matching the built-in's documented argument types); anything else is
/// a runtime error at `enqueue` time.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorityKey {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Eq for PriorityKey {}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

pub fn priority_key(v: &Value, heap: &Heap, at: CodeLoc) -> RunResult<PriorityKey> {
    match v {
        Value::Int(i) => Ok(PriorityKey::Int(*i)),
        Value::Float(f) => {
            if f.is_nan() {
                return Err(LoxError::runtime("Priority must not be NaN.", at));
            }
            Ok(PriorityKey::Float(*f))
        }
        Value::Ref(id) => match heap.get(*id) {
            crate::heap::HeapData::Str(s, _) => Ok(PriorityKey::Str(s.to_string())),
            other => Err(LoxError::runtime(format!("Priority must be numeric or a string, got {}.", other.type_name()), at)),
        },
        _ => Err(LoxError::runtime("Priority must be numeric or a string.", at)),
    }
}

/// One heap slot: a priority plus the value(s) inserted at that priority (a bag, in
/// insertion order, when duplicates are allowed -- §9 Decision c).
#[derive(Debug)]
struct Entry {
    priority: PriorityKey,
    reversed: bool,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        let ord = self.priority.cmp(&other.priority);
        if self.reversed { ord } else { ord.reverse() }
    }
}

/// Binary-heap-backed priority queue with an auxiliary priority index (§4.7).
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<Entry>,
    /// Bag of values per priority, insertion-ordered. `BinaryHeap` only orders `Entry`
    /// by priority, so duplicate priorities push multiple `Entry`s and this map tracks
    /// which values belong to which priority for O(1) `getValueByPriority`.
    by_priority: ahash::AHashMap<PriorityKeyBits, Vec<Value>>,
    pub reversed: bool,
    pub allow_duplicates: bool,
}

/// `PriorityKey` does not implement `Hash` directly (float priorities would need a
/// bit-pattern key); this newtype is the hashable form used only as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PriorityKeyBits {
    Int(i64),
    FloatBits(u64),
    Str(String),
}

impl From<&PriorityKey> for PriorityKeyBits {
    fn from(k: &PriorityKey) -> Self {
        match k {
            PriorityKey::Int(i) => Self::Int(*i),
            PriorityKey::Float(f) => Self::FloatBits(f.to_bits()),
            PriorityKey::Str(s) => Self::Str(s.clone()),
        }
    }
}

impl PriorityQueue {
    #[must_use]
    pub fn new(reversed: bool, allow_duplicates: bool) -> Self {
        Self { heap: BinaryHeap::new(), by_priority: ahash::AHashMap::new(), reversed, allow_duplicates }
    }

    pub fn enqueue(&mut self, value: Value, priority: PriorityKey, at: CodeLoc) -> RunResult<()> {
        let key = PriorityKeyBits::from(&priority);
        if !self.allow_duplicates && self.by_priority.contains_key(&key) {
            return Err(LoxError::runtime("Priority queue already contains that priority.", at));
        }
        let is_new = !self.by_priority.contains_key(&key);
        self.by_priority.entry(key).or_default().push(value);
        if is_new {
            self.heap.push(Entry { priority, reversed: self.reversed });
        }
        Ok(())
    }

    /// The plain variant (§4.7): empty queue yields `None` rather than failing.
    pub fn dequeue(&mut self) -> Option<(Value, PriorityKey)> {
        let top = self.heap.pop()?;
        let key = PriorityKeyBits::from(&top.priority);
        let bag = self.by_priority.get_mut(&key).expect("heap/index desync");
        let value = bag.remove(0);
        if bag.is_empty() {
            self.by_priority.remove(&key);
        } else {
            self.heap.push(Entry { priority: top.priority.clone(), reversed: self.reversed });
        }
        Some((value, top.priority))
    }

    /// The `Err` variant (§4.7): empty queue fails instead of returning `None`.
    pub fn dequeue_err(&mut self, at: CodeLoc) -> RunResult<(Value, PriorityKey)> {
        self.dequeue().ok_or_else(|| LoxError::runtime("Cannot remove from empty priority queue.", at))
    }

    #[must_use]
    pub fn peek(&self) -> Option<(&Value, &PriorityKey)> {
        let top = self.heap.peek()?;
        let key = PriorityKeyBits::from(&top.priority);
        let bag = self.by_priority.get(&key)?;
        Some((bag.first()?, &top.priority))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_priority.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.by_priority.clear();
    }

    #[must_use]
    pub fn value_by_priority(&self, priority: &PriorityKey) -> Option<&[Value]> {
        self.by_priority.get(&PriorityKeyBits::from(priority)).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains_priority(&self, priority: &PriorityKey) -> bool {
        self.by_priority.contains_key(&PriorityKeyBits::from(priority))
    }

    /// Linear scan for the exact (value, priority) pair (§4.7 `contains`).
    #[must_use]
    pub fn contains(&self, value: &Value, priority: &PriorityKey, heap: &Heap) -> bool {
        let key = PriorityKeyBits::from(priority);
        self.by_priority.get(&key).is_some_and(|bag| bag.iter().any(|v| v.equals(value, heap)))
    }

    /// Linear scan for a value at any priority (§4.7 `containsValue`).
    #[must_use]
    pub fn contains_value(&self, value: &Value, heap: &Heap) -> bool {
        self.priority_of_value(value, heap).is_some()
    }

    /// Visits every (value, priority) pair in heap order (§4.7 `forEach`).
    pub fn for_each_in_heap_order(&self) -> Vec<(Value, PriorityKey)> {
        let mut entries: Vec<&Entry> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        let mut out = Vec::new();
        for e in entries {
            let key = PriorityKeyBits::from(&e.priority);
            if let Some(bag) = self.by_priority.get(&key) {
                for v in bag {
                    out.push((*v, e.priority.clone()));
                }
            }
        }
        out
    }

    /// Every priority currently present, in heap-dequeue order (`prioritiesListAny`).
    #[must_use]
    pub fn priorities_list(&self) -> Vec<PriorityKey> {
        self.for_each_in_heap_order().into_iter().map(|(_, p)| p).collect()
    }

    /// Linear scan for the priority a value was enqueued under, by value equality.
    #[must_use]
    pub fn priority_of_value(&self, value: &Value, heap: &Heap) -> Option<PriorityKey> {
        for e in &self.heap {
            let key = PriorityKeyBits::from(&e.priority);
            if let Some(bag) = self.by_priority.get(&key) {
                if bag.iter().any(|v| v.equals(value, heap)) {
                    return Some(e.priority.clone());
                }
            }
        }
        None
    }

    /// Empties the queue and resets it to a fresh min-heap with no duplicate priorities.
    pub fn reset(&mut self) {
        *self = Self::new(false, false);
    }

    /// Empties the queue and resets it to a fresh max-heap with no duplicate priorities.
    pub fn reset_reversed(&mut self) {
        *self = Self::new(true, false);
    }

    /// Structural equality: same priorities, same values (in the same per-priority
    /// bag order), regardless of internal heap layout.
    #[must_use]
    pub fn equals(&self, other: &Self, heap: &Heap) -> bool {
        self.equals_priorities(other) && self.equals_values(other, heap)
    }

    /// Equality over priorities alone (ignores which values sit at each priority).
    #[must_use]
    pub fn equals_priorities(&self, other: &Self) -> bool {
        let mut mine: Vec<PriorityKeyBits> = self.by_priority.keys().cloned().collect();
        let mut theirs: Vec<PriorityKeyBits> = other.by_priority.keys().cloned().collect();
        mine.sort_by_key(priority_bits_sort_key);
        theirs.sort_by_key(priority_bits_sort_key);
        mine == theirs
    }

    /// Equality over values alone, flattened across all priorities (order-insensitive
    /// per priority bucket, matching `equalsValues`'s "same multiset of values").
    #[must_use]
    pub fn equals_values(&self, other: &Self, heap: &Heap) -> bool {
        let mine: Vec<Value> = self.by_priority.values().flatten().copied().collect();
        let mut theirs: Vec<Value> = other.by_priority.values().flatten().copied().collect();
        if mine.len() != theirs.len() {
            return false;
        }
        for v in &mine {
            let Some(pos) = theirs.iter().position(|o| o.equals(v, heap)) else { return false };
            theirs.remove(pos);
        }
        true
    }
}

fn priority_bits_sort_key(k: &PriorityKeyBits) -> String {
    format!("{k:?}")
}

/// Accumulates configuration before producing a fresh [`PriorityQueue`] (§4.7 builder).
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityQueueBuilder {
    pub reversed: bool,
    pub allow_duplicates: bool,
}

impl PriorityQueueBuilder {
    #[must_use]
    pub fn build(&self) -> PriorityQueue {
        PriorityQueue::new(self.reversed, self.allow_duplicates)
    }
}
