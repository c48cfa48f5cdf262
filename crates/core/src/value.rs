//! The runtime value type (§3, §4.1).
//!
//! Grounded on the teacher's `value.rs`: a tagged enum with small immediates stored
//! inline and everything else funneled through `Ref(HeapId)`. Unlike the teacher, this
//! `Value` has no interning variants (`InternString`, `InternLongInt`, ...) -- those
//! exist in the teacher to dodge a bytecode constant pool's allocation cost, which has
//! no equivalent here, so every string and big-int is heap-resident uniformly. `Value`
//! is `Copy`: every variant is either inline or a plain index handle, so passing a
//! `Value` around the evaluator never touches the allocator.

use std::fmt;

use crate::error::{CodeLoc, RunResult};
use crate::heap::{Heap, HeapData, HeapId};

/// Runtime value. See module docs and spec §3 for the full variant catalogue; only
/// `nil`/`bool`/`int`/`float` are inline, everything else lives behind `Ref`.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Ref(HeapId),
}

impl Value {
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Truthiness per §3 invariant 2: nil/false/zero are falsy, everything else
    /// (including empty containers) is truthy.
    #[must_use]
    pub fn is_truthy(&self, heap: &Heap) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Ref(id) => match heap.get(*id) {
                HeapData::BigInt(b) => !num_traits::Zero::is_zero(b),
                _ => true,
            },
        }
    }

    /// The type name surfaced to `Type()` / error messages.
    #[must_use]
    pub fn type_name(&self, heap: &Heap) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Ref(id) => heap.get(*id).type_name(),
        }
    }

    /// Structural equality per §3 invariant 1: identity for heap refs to the same slot,
    /// numeric promotion across int/bigint/float, deep-equal otherwise.
    #[must_use]
    pub fn equals(&self, other: &Self, heap: &Heap) -> bool {
        use num_traits::ToPrimitive;
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::Ref(a), Self::Ref(b)) if a == b => true,
            (Self::Ref(id), Self::Int(n)) | (Self::Int(n), Self::Ref(id)) => match heap.get(*id) {
                HeapData::BigInt(b) => b == &num_bigint::BigInt::from(*n),
                HeapData::BigFloat(b) => b.to_f64() == *n as f64,
                _ => false,
            },
            (Self::Ref(id), Self::Float(f)) | (Self::Float(f), Self::Ref(id)) => {
                matches!(heap.get(*id), HeapData::BigInt(b) if b.to_f64() == Some(*f))
                    || matches!(heap.get(*id), HeapData::BigFloat(b) if b.to_f64() == *f)
            }
            (Self::Ref(a), Self::Ref(b)) => match (heap.get(*a), heap.get(*b)) {
                (HeapData::Str(s1, _), HeapData::Str(s2, _)) => s1 == s2,
                (HeapData::Buffer(b1), HeapData::Buffer(b2)) => b1 == b2,
                (HeapData::BigInt(b1), HeapData::BigInt(b2)) => b1 == b2,
                (HeapData::BigFloat(b1), HeapData::BigFloat(b2)) => b1 == b2,
                (HeapData::BigInt(b1), HeapData::BigFloat(b2)) | (HeapData::BigFloat(b2), HeapData::BigInt(b1)) => {
                    crate::types::bignum::BigFloat::from_bigint(b1.clone()) == *b2
                }
                (HeapData::List(l1), HeapData::List(l2)) => {
                    l1.len() == l2.len() && l1.iter().zip(l2.iter()).all(|(x, y)| x.equals(y, heap))
                }
                (HeapData::Set(s1), HeapData::Set(s2)) => s1.equals(s2, heap),
                (HeapData::Dict(d1), HeapData::Dict(d2)) => d1.equals(d2, heap),
                (HeapData::EnumMember(m1), HeapData::EnumMember(m2)) => m1 == m2,
                _ => false,
            },
            _ => false,
        }
    }

    /// Display form used by `print` (plain) and nested container rendering (quoted).
    #[must_use]
    pub fn display(&self, heap: &Heap, quoted: bool) -> String {
        match self {
            Self::Nil => "nil".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Ref(id) => display_heap(*id, heap, quoted),
        }
    }

    #[must_use]
    pub fn as_heap_id(&self) -> Option<HeapId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Converts to `i64` when the value is an int, a whole float, or a small-enough
    /// bigint -- used by index/length arithmetic across the stdlib.
    pub fn as_index(&self, heap: &Heap, at: CodeLoc) -> RunResult<i64> {
        use num_traits::ToPrimitive;
        match self {
            Self::Int(i) => Ok(*i),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::BigInt(b) => b
                    .to_i64()
                    .ok_or_else(|| crate::error::LoxError::runtime("Index out of range.", at)),
                _ => Err(crate::error::LoxError::runtime("Expected an integer index.", at)),
            },
            _ => Err(crate::error::LoxError::runtime("Expected an integer index.", at)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Mirrors Lox's historical float formatting: integral floats still show a `.0`.
fn format_float(f: f64) -> String {
    if f.is_infinite() {
        return if f > 0.0 { "inf".to_owned() } else { "-inf".to_owned() };
    }
    if f.is_nan() {
        return "nan".to_owned();
    }
    let mut buf = ryu::Buffer::new();
    let s = buf.format(f);
    s.to_owned()
}

fn display_heap(id: HeapId, heap: &Heap, quoted: bool) -> String {
    match heap.get(id) {
        HeapData::Str(s, quote) => {
            if quoted {
                format!("{quote}{s}{quote}")
            } else {
                s.to_string()
            }
        }
        HeapData::Buffer(b) => {
            let body: Vec<String> = b.iter().map(u8::to_string).collect();
            format!("[{}]", body.join(", "))
        }
        HeapData::List(items) => {
            let body: Vec<String> = items.iter().map(|v| v.display(heap, true)).collect();
            format!("[{}]", body.join(", "))
        }
        HeapData::Dict(d) => d.display(heap),
        HeapData::Set(s) => s.display(heap),
        HeapData::Range(r) => r.display(),
        HeapData::Deque(d) => d.display(heap),
        HeapData::PriorityQueue(q) => {
            let mut flags = Vec::new();
            if q.reversed {
                flags.push("reversed");
            }
            if q.allow_duplicates {
                flags.push("duplicate priorities");
            }
            let suffix = if flags.is_empty() { String::new() } else { format!(" ({})", flags.join(", ")) };
            format!("<priority queue{suffix} at {}>", address(id))
        }
        HeapData::PriorityQueueBuilder(_) => format!("<priority queue builder at {}>", address(id)),
        HeapData::Iterator(_) => format!("<iterator at {}>", address(id)),
        HeapData::Date(d) => d.display(),
        HeapData::Duration(d) => d.display(),
        HeapData::Stopwatch(_) => format!("<stopwatch at {}>", address(id)),
        HeapData::Function(f) => {
            if f.bound_this.is_some() {
                format!("<bound method {} at {}>", f.name, address(id))
            } else {
                format!("<fn {} at {}>", f.name, address(id))
            }
        }
        HeapData::Native(f) => {
            if f.owner.is_empty() {
                format!("<native fn {} at {}>", f.name, address(id))
            } else {
                format!("<native {} fn {} at {}>", f.owner, f.name, address(id))
            }
        }
        HeapData::Class(c) => format!("<class {}>", c.name),
        HeapData::Instance(i) => format!("<{} instance at {}>", i.class_name, address(id)),
        HeapData::BigInt(b) => b.to_string(),
        HeapData::BigFloat(b) => b.to_string(),
        HeapData::Enum(e) => format!("<enum {}>", e.name),
        HeapData::EnumMember(m) => m.display(),
        HeapData::Host(h) => h.display(),
    }
}

/// A stable, address-shaped identifier for display purposes (§6): the `HeapId` index
/// formatted as hex, unique among concurrently-live objects without exposing a real
/// pointer.
fn address(id: HeapId) -> String {
    format!("{:#014x}", id.index())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(fl) => f.write_str(&format_float(*fl)),
            Self::Ref(id) => write!(f, "<ref #{}>", id.index()),
        }
    }
}
