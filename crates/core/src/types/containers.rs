//! Dict, set, range and deque/ring (§3).
//!
//! Grounded on the teacher's `types/` dict/set implementations (`indexmap`-backed, to
//! preserve insertion order the way the teacher's `Dict`/`Set` do), adapted to this
//! crate's heap-indirection model: since a `Value` needs the heap to compute a deep
//! hash (a heap-resident string's content, not its `HeapId`), every hashable key is
//! first reduced to a self-contained [`HashKey`] that owns its data.

use std::collections::VecDeque;

use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::error::{CodeLoc, LoxError, RunResult};
use crate::heap::{Heap, HeapData};
use crate::value::Value;

/// A self-contained, hashable reduction of a `Value`, used as dict/set keys. Values
/// that cannot be reduced (lists, dicts, sets, other mutable containers) are rejected
/// at insertion time with a runtime error, matching the dynamic language's "unhashable
/// type" contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Nil,
    Bool(bool),
    Int(i64),
    FloatBits(u64),
    Str(Box<str>),
    BigInt(BigInt),
}

/// Converts a `Value` into a [`HashKey`], or fails if the value's type is unhashable.
pub fn hash_key(v: &Value, heap: &Heap, at: CodeLoc) -> RunResult<HashKey> {
    Ok(match v {
        Value::Nil => HashKey::Nil,
        Value::Bool(b) => HashKey::Bool(*b),
        Value::Int(i) => HashKey::Int(*i),
        Value::Float(f) => HashKey::FloatBits(f.to_bits()),
        Value::Ref(id) => match heap.get(*id) {
            HeapData::Str(s, _) => HashKey::Str(s.as_ref().into()),
            HeapData::BigInt(b) => HashKey::BigInt(b.clone()),
            other => {
                return Err(LoxError::runtime(
                    format!("unhashable type: '{}'", other.type_name()),
                    at,
                ));
            }
        },
    })
}

/// Insertion-ordered mapping from hashable values to values.
#[derive(Debug, Default)]
pub struct Dict {
    entries: IndexMap<HashKey, (Value, Value)>,
}

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: Value,
        value: Value,
        heap: &Heap,
        at: CodeLoc,
    ) -> RunResult<Option<Value>> {
        let hk = hash_key(&key, heap, at)?;
        Ok(self.insert_hashed(hk, key, value))
    }

    /// Same as [`Dict::insert`] but takes an already-computed key, for call sites where
    /// the dict is itself borrowed out of the heap that would otherwise need to be
    /// borrowed again to hash the key.
    pub fn insert_hashed(&mut self, hk: HashKey, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(hk, (key, value)).map(|(_, v)| v)
    }

    pub fn get(&self, key: &Value, heap: &Heap, at: CodeLoc) -> RunResult<Option<Value>> {
        let hk = hash_key(key, heap, at)?;
        Ok(self.entries.get(&hk).map(|(_, v)| *v))
    }

    pub fn remove(&mut self, key: &Value, heap: &Heap, at: CodeLoc) -> RunResult<Option<Value>> {
        let hk = hash_key(key, heap, at)?;
        Ok(self.remove_hashed(&hk))
    }

    /// Same as [`Dict::remove`] but takes an already-computed key; see
    /// [`Dict::insert_hashed`].
    pub fn remove_hashed(&mut self, hk: &HashKey) -> Option<Value> {
        self.entries.shift_remove(hk).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Value, heap: &Heap, at: CodeLoc) -> RunResult<bool> {
        let hk = hash_key(key, heap, at)?;
        Ok(self.entries.contains_key(&hk))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = Value> + '_ {
        self.entries.values().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.entries.values().map(|(_, v)| *v)
    }

    pub fn items(&self) -> impl Iterator<Item = (Value, Value)> + '_ {
        self.entries.values().copied()
    }

    #[must_use]
    pub fn equals(&self, other: &Self, heap: &Heap) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries.iter().all(|(k, (_, v))| {
            other.entries.get(k).is_some_and(|(_, ov)| v.equals(ov, heap))
        })
    }

    #[must_use]
    pub fn display(&self, heap: &Heap) -> String {
        let body: Vec<String> = self
            .entries
            .values()
            .map(|(k, v)| format!("{}: {}", k.display(heap, true), v.display(heap, true)))
            .collect();
        format!("{{{}}}", body.join(", "))
    }
}

/// Insertion-ordered collection of unique hashable values.
#[derive(Debug, Default)]
pub struct LoxSet {
    entries: IndexMap<HashKey, Value>,
}

impl LoxSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the value was newly inserted (mirrors §8: repeated `add` of the
    /// same element leaves size unchanged).
    pub fn add(&mut self, value: Value, heap: &Heap, at: CodeLoc) -> RunResult<bool> {
        let hk = hash_key(&value, heap, at)?;
        Ok(self.add_hashed(hk, value))
    }

    /// Same as [`LoxSet::add`] but takes an already-computed key; see
    /// [`Dict::insert_hashed`].
    pub fn add_hashed(&mut self, hk: HashKey, value: Value) -> bool {
        let was_new = !self.entries.contains_key(&hk);
        self.entries.entry(hk).or_insert(value);
        was_new
    }

    pub fn remove(&mut self, value: &Value, heap: &Heap, at: CodeLoc) -> RunResult<bool> {
        let hk = hash_key(value, heap, at)?;
        Ok(self.remove_hashed(&hk))
    }

    /// Same as [`LoxSet::remove`] but takes an already-computed key; see
    /// [`Dict::insert_hashed`].
    pub fn remove_hashed(&mut self, hk: &HashKey) -> bool {
        self.entries.shift_remove(hk).is_some()
    }

    pub fn contains(&self, value: &Value, heap: &Heap, at: CodeLoc) -> RunResult<bool> {
        let hk = hash_key(value, heap, at)?;
        Ok(self.entries.contains_key(&hk))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.entries.values().copied()
    }

    #[must_use]
    pub fn equals(&self, other: &Self, heap: &Heap) -> bool {
        self.entries.len() == other.entries.len() && self.entries.keys().all(|k| other.entries.contains_key(k))
    }

    #[must_use]
    pub fn display(&self, heap: &Heap) -> String {
        let body: Vec<String> = self.entries.values().map(|v| v.display(heap, true)).collect();
        format!("{{{}}}", body.join(", "))
    }
}

impl HashKey {
    fn display(&self, _heap: &Heap, quoted: bool) -> String {
        match self {
            Self::Nil => "nil".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::FloatBits(bits) => f64::from_bits(*bits).to_string(),
            Self::Str(s) => {
                if quoted {
                    format!("\"{s}\"")
                } else {
                    s.to_string()
                }
            }
            Self::BigInt(b) => b.to_string(),
        }
    }
}

/// A lazy arithmetic progression. `is_big` selects the bigint-backed slow path used
/// once any of start/stop/step overflows `i64` (the language's `bigrange`).
#[derive(Debug, Clone)]
pub struct Range {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
    pub is_big: bool,
    pub big_start: BigInt,
    pub big_stop: BigInt,
    pub big_step: BigInt,
}

impl Range {
    #[must_use]
    pub fn new(start: i64, stop: i64, step: i64) -> Self {
        Self {
            start,
            stop,
            step,
            is_big: false,
            big_start: BigInt::from(start),
            big_stop: BigInt::from(stop),
            big_step: BigInt::from(step),
        }
    }

    #[must_use]
    pub fn new_big(start: BigInt, stop: BigInt, step: BigInt) -> Self {
        Self {
            start: 0,
            stop: 0,
            step: 0,
            is_big: true,
            big_start: start,
            big_stop: stop,
            big_step: step,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        use num_integer::Integer;
        if self.is_big {
            if self.big_step.sign() == num_bigint::Sign::NoSign {
                return 0;
            }
            let diff = &self.big_stop - &self.big_start;
            let (q, r) = diff.div_mod_floor(&self.big_step);
            let q = if r.sign() != num_bigint::Sign::NoSign && diff.sign() == self.big_step.sign() {
                q + 1
            } else {
                q
            };
            use num_traits::ToPrimitive;
            q.max(BigInt::from(0)).to_usize().unwrap_or(0)
        } else {
            if self.step == 0 {
                return 0;
            }
            let diff = self.stop - self.start;
            if (diff > 0) != (self.step > 0) && diff != 0 {
                return 0;
            }
            ((diff.abs() + self.step.abs() - 1) / self.step.abs()).max(0) as usize
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, n: &BigInt) -> bool {
        if self.is_big {
            if self.big_step.sign() == num_bigint::Sign::NoSign {
                return false;
            }
            let offset = n - &self.big_start;
            let in_range = if self.big_step.sign() == num_bigint::Sign::Plus {
                n >= &self.big_start && n < &self.big_stop
            } else {
                n <= &self.big_start && n > &self.big_stop
            };
            in_range && (offset % &self.big_step) == BigInt::from(0)
        } else {
            use num_traits::ToPrimitive;
            let Some(n) = n.to_i64() else { return false };
            let in_range = if self.step > 0 { n >= self.start && n < self.stop } else { n <= self.start && n > self.stop };
            in_range && (n - self.start) % self.step == 0
        }
    }

    /// The `i`th element of the progression, in bigint form -- callers on the non-big
    /// path convert back to `i64`/`Value::Int` themselves since that case never
    /// allocates; callers on the big path allocate a `HeapData::BigInt` from this.
    #[must_use]
    pub fn nth_big(&self, i: usize) -> BigInt {
        &self.big_start + &self.big_step * BigInt::from(i)
    }

    #[must_use]
    pub fn nth_small(&self, i: usize) -> i64 {
        self.start + self.step * i as i64
    }

    #[must_use]
    pub fn display(&self) -> String {
        if self.is_big {
            format!("bigrange({}, {}, {})", self.big_start, self.big_stop, self.big_step)
        } else {
            format!("range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

/// Distinguishes the three `VecDeque`-backed surface types (§3): a plain `deque`
/// supports both ends, a `queue` only exposes FIFO push-back/pop-front, and a `ring`
/// is a `deque` with a fixed capacity that evicts from the opposite end on overflow.
/// All three share one backing structure since the only real difference is which
/// operations the property table exposes and the type name reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeKind {
    Deque,
    Queue,
    Ring,
}

impl DequeKind {
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Deque => "deque",
            Self::Queue => "queue",
            Self::Ring => "ring",
        }
    }
}

/// A growable double-ended queue, also used to back the fixed-capacity "ring" variant
/// (`max_len.is_some()` drops the oldest element on overflow instead of growing).
#[derive(Debug)]
pub struct Deque {
    items: VecDeque<Value>,
    pub max_len: Option<usize>,
    pub kind: DequeKind,
}

impl Default for Deque {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Deque {
    #[must_use]
    pub fn new(max_len: Option<usize>) -> Self {
        Self { items: VecDeque::new(), max_len, kind: DequeKind::Deque }
    }

    #[must_use]
    pub fn new_kind(max_len: Option<usize>, kind: DequeKind) -> Self {
        Self { items: VecDeque::new(), max_len, kind }
    }

    pub fn push_back(&mut self, v: Value) {
        self.items.push_back(v);
        self.enforce_cap_back();
    }

    pub fn push_front(&mut self, v: Value) {
        self.items.push_front(v);
        self.enforce_cap_front();
    }

    pub fn pop_back(&mut self) -> Option<Value> {
        self.items.pop_back()
    }

    pub fn pop_front(&mut self) -> Option<Value> {
        self.items.pop_front()
    }

    fn enforce_cap_back(&mut self) {
        if let Some(cap) = self.max_len {
            while self.items.len() > cap {
                self.items.pop_front();
            }
        }
    }

    fn enforce_cap_front(&mut self) {
        if let Some(cap) = self.max_len {
            while self.items.len() > cap {
                self.items.pop_back();
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    pub fn iter_rev(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().rev()
    }

    #[must_use]
    pub fn display(&self, heap: &Heap) -> String {
        let body: Vec<String> = self.items.iter().map(|v| v.display(heap, true)).collect();
        format!("[{}]", body.join(", "))
    }
}
