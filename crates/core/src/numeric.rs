//! Numeric promotion and binary arithmetic (§4.1).
//!
//! Grounded on the teacher's numeric-tower dispatch (`object.rs`'s arithmetic match
//! ladders promoting `int -> float` etc.): this crate's tower has two extra rungs,
//! `bigint` and `bigfloat`, promoting along `int -> bigint -> float -> bigfloat`
//! (mixing a float with a bigint promotes all the way to bigfloat, per §4.1).

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::error::{CodeLoc, LoxError, RunResult};
use crate::heap::{HeapData, HeapId};
use crate::interpreter::Interpreter;
use crate::types::bignum::BigFloat;
use crate::value::Value;

/// A value's position in the numeric tower, used to decide the common type two
/// operands promote to before an arithmetic op is applied.
#[derive(Debug, Clone)]
enum Num {
    Int(i64),
    Big(BigInt),
    Float(f64),
    BigFloat(BigFloat),
}

fn classify(v: Value, heap: &crate::heap::Heap) -> Option<Num> {
    match v {
        Value::Int(i) => Some(Num::Int(i)),
        Value::Float(f) => Some(Num::Float(f)),
        Value::Ref(id) => match heap.get(id) {
            HeapData::BigInt(b) => Some(Num::Big(b.clone())),
            HeapData::BigFloat(b) => Some(Num::BigFloat(b.clone())),
            _ => None,
        },
        _ => None,
    }
}

/// Rank in the promotion chain; the pair promotes to the operand with the higher rank.
fn rank(n: &Num) -> u8 {
    match n {
        Num::Int(_) => 0,
        Num::Big(_) => 1,
        Num::Float(_) => 2,
        Num::BigFloat(_) => 3,
    }
}

enum Promoted {
    Int(i64, i64),
    Big(BigInt, BigInt),
    Float(f64, f64),
    BigFloat(BigFloat, BigFloat),
}

fn promote(a: Num, b: Num) -> Promoted {
    let target = rank(&a).max(rank(&b));
    match target {
        0 => {
            let (Num::Int(a), Num::Int(b)) = (a, b) else { unreachable!() };
            Promoted::Int(a, b)
        }
        1 => Promoted::Big(to_big(a), to_big(b)),
        2 => {
            // A float mixed with a bigint promotes to bigfloat (§4.1), so rank 2 only
            // stays plain-float when *both* sides are int/float.
            if matches!(a, Num::Big(_)) || matches!(b, Num::Big(_)) {
                Promoted::BigFloat(to_bigfloat(a), to_bigfloat(b))
            } else {
                Promoted::Float(to_f64(&a), to_f64(&b))
            }
        }
        _ => Promoted::BigFloat(to_bigfloat(a), to_bigfloat(b)),
    }
}

fn to_big(n: Num) -> BigInt {
    match n {
        Num::Int(i) => BigInt::from(i),
        Num::Big(b) => b,
        Num::Float(f) => BigInt::from(f as i64),
        Num::BigFloat(b) => BigInt::from(b.to_f64() as i64),
    }
}

fn to_f64(n: &Num) -> f64 {
    match n {
        Num::Int(i) => *i as f64,
        Num::Big(b) => b.to_f64().unwrap_or(f64::NAN),
        Num::Float(f) => *f,
        Num::BigFloat(b) => b.to_f64(),
    }
}

fn to_bigfloat(n: Num) -> BigFloat {
    match n {
        Num::Int(i) => BigFloat::from_bigint(BigInt::from(i)),
        Num::Big(b) => BigFloat::from_bigint(b),
        Num::Float(f) => BigFloat::from_f64(f),
        Num::BigFloat(b) => b,
    }
}

fn wrap_big(interp: &mut Interpreter, b: BigInt, at: CodeLoc) -> RunResult<Value> {
    Ok(Value::Ref(interp.heap.allocate(HeapData::BigInt(b), at)?))
}

fn wrap_bigfloat(interp: &mut Interpreter, b: BigFloat, at: CodeLoc) -> RunResult<Value> {
    Ok(Value::Ref(interp.heap.allocate(HeapData::BigFloat(b), at)?))
}

/// `a + b` with the promotion tower applied. Used both by the `+` operator and by
/// `Iterator.accumulateAdd` (§4.6) so both share one promotion rule.
pub fn add(interp: &mut Interpreter, a: Value, b: Value, at: CodeLoc) -> RunResult<Value> {
    binop(interp, a, b, at, "+", |x, y| x.saturating_add(y), |x, y| x + y, |x, y| x + y, |x, y| x.add(y))
}

pub fn sub(interp: &mut Interpreter, a: Value, b: Value, at: CodeLoc) -> RunResult<Value> {
    binop(interp, a, b, at, "-", |x, y| x.saturating_sub(y), |x, y| x - y, |x, y| x - y, |x, y| x.sub(y))
}

pub fn mul(interp: &mut Interpreter, a: Value, b: Value, at: CodeLoc) -> RunResult<Value> {
    binop(interp, a, b, at, "*", |x, y| x.saturating_mul(y), |x, y| x * y, |x, y| x * y, |x, y| x.mul(y))
}

/// Division always yields a float-ish result (never truncates like integer `/` in C).
pub fn div(interp: &mut Interpreter, a: Value, b: Value, at: CodeLoc) -> RunResult<Value> {
    let an = classify(a, &interp.heap);
    let bn = classify(b, &interp.heap);
    let (Some(an), Some(bn)) = (an, bn) else {
        return Err(LoxError::runtime("Operands to '/' must be numeric.", at));
    };
    match promote(an, bn) {
        Promoted::Int(x, y) => {
            if y == 0 {
                return Err(LoxError::runtime("Division by zero.", at));
            }
            Ok(Value::Float(x as f64 / y as f64))
        }
        Promoted::Big(x, y) => {
            if y == BigInt::from(0) {
                return Err(LoxError::runtime("Division by zero.", at));
            }
            wrap_bigfloat(interp, BigFloat::from_bigint(x).div(&BigFloat::from_bigint(y)), at)
        }
        Promoted::Float(x, y) => {
            if y == 0.0 {
                return Err(LoxError::runtime("Division by zero.", at));
            }
            Ok(Value::Float(x / y))
        }
        Promoted::BigFloat(x, y) => {
            if y.is_zero() {
                return Err(LoxError::runtime("Division by zero.", at));
            }
            wrap_bigfloat(interp, x.div(&y), at)
        }
    }
}

fn binop(
    interp: &mut Interpreter,
    a: Value,
    b: Value,
    at: CodeLoc,
    op: &str,
    int_op: impl Fn(i64, i64) -> i64,
    big_op: impl Fn(BigInt, BigInt) -> BigInt,
    float_op: impl Fn(f64, f64) -> f64,
    bigfloat_op: impl Fn(&BigFloat, &BigFloat) -> BigFloat,
) -> RunResult<Value> {
    let an = classify(a, &interp.heap);
    let bn = classify(b, &interp.heap);
    let (Some(an), Some(bn)) = (an, bn) else {
        return Err(LoxError::runtime(format!("Operands to '{op}' must be numeric."), at));
    };
    match promote(an, bn) {
        Promoted::Int(x, y) => Ok(Value::Int(int_op(x, y))),
        Promoted::Big(x, y) => wrap_big(interp, big_op(x, y), at),
        Promoted::Float(x, y) => Ok(Value::Float(float_op(x, y))),
        Promoted::BigFloat(x, y) => wrap_bigfloat(interp, bigfloat_op(&x, &y), at),
    }
}

/// Numeric comparison (`<`, `<=`, `>`, `>=`), promoting the same way arithmetic does.
pub fn compare(interp: &Interpreter, a: Value, b: Value, at: CodeLoc) -> RunResult<std::cmp::Ordering> {
    let an = classify(a, &interp.heap);
    let bn = classify(b, &interp.heap);
    let (Some(an), Some(bn)) = (an, bn) else {
        return Err(LoxError::runtime("Operands must be numeric to compare.", at));
    };
    Ok(match promote(an, bn) {
        Promoted::Int(x, y) => x.cmp(&y),
        Promoted::Big(x, y) => x.cmp(&y),
        Promoted::Float(x, y) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        Promoted::BigFloat(x, y) => x.cmp(&y),
    })
}

/// Remainder (`%`); bigfloat/float use `f64::rem`, ints use Rust's truncating `%`
/// matching the teacher's integer modulo (no Python-style floor-mod adjustment).
pub fn rem(interp: &mut Interpreter, a: Value, b: Value, at: CodeLoc) -> RunResult<Value> {
    let an = classify(a, &interp.heap);
    let bn = classify(b, &interp.heap);
    let (Some(an), Some(bn)) = (an, bn) else {
        return Err(LoxError::runtime("Operands to '%' must be numeric.", at));
    };
    match promote(an, bn) {
        Promoted::Int(x, y) => {
            if y == 0 {
                return Err(LoxError::runtime("Division by zero.", at));
            }
            Ok(Value::Int(x.wrapping_rem(y)))
        }
        Promoted::Big(x, y) => {
            if y == BigInt::from(0) {
                return Err(LoxError::runtime("Division by zero.", at));
            }
            wrap_big(interp, x % y, at)
        }
        Promoted::Float(x, y) => Ok(Value::Float(x % y)),
        Promoted::BigFloat(x, y) => {
            let r = x.to_f64() % y.to_f64();
            wrap_bigfloat(interp, BigFloat::from_f64(r), at)
        }
    }
}

/// Arithmetic negation (`-x`).
pub fn neg(interp: &mut Interpreter, v: Value, at: CodeLoc) -> RunResult<Value> {
    match v {
        Value::Int(i) => Ok(Value::Int(i.saturating_neg())),
        Value::Float(f) => Ok(Value::Float(-f)),
        Value::Ref(id) => match interp.heap.get(id) {
            HeapData::BigInt(b) => {
                let b = -b.clone();
                wrap_big(interp, b, at)
            }
            HeapData::BigFloat(b) => {
                let b = b.neg();
                wrap_bigfloat(interp, b, at)
            }
            other => Err(LoxError::runtime(format!("Cannot negate a {}.", other.type_name()), at)),
        },
        _ => Err(LoxError::runtime("Cannot negate a non-numeric value.", at)),
    }
}

/// Whether `id` refers to a numeric heap value (`bigint`/`bigfloat`), used by
/// `Value::is_truthy`/display call sites that need a quick numeric test.
#[must_use]
pub fn is_numeric_heap(id: HeapId, heap: &crate::heap::Heap) -> bool {
    matches!(heap.get(id), HeapData::BigInt(_) | HeapData::BigFloat(_))
}
