//! `bigint`/`bigfloat` instance method tables (§3 `bigint`, `big-float`).
//!
//! The `bigint`/`bigfloat`/`Float` *namespace classes* (constructors, `parse`) are
//! installed as static builtin classes in `globals.rs`; this table covers the
//! operations available on an already-constructed value, looked up by
//! [`crate::property::get_property`] through `HeapData::type_name` ("bigint"/"bigfloat").

use num_traits::ToPrimitive;

use super::{arg, expect_bigint, alloc_str, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::bignum::BigFloat;
use crate::value::Value;

const BIGINT: &str = "bigint";
const BIGFLOAT: &str = "bigfloat";

pub fn register(b: &mut Builtins) {
    b.register(BIGINT, "toString", Arity::Fixed(1), |interp, args, at| {
        let n = expect_bigint(interp, arg(args, 0), BIGINT, "toString", at)?;
        alloc_str(interp, n.to_string(), at)
    });
    b.register(BIGINT, "toInt", Arity::Fixed(1), |interp, args, at| {
        let n = expect_bigint(interp, arg(args, 0), BIGINT, "toInt", at)?;
        n.to_i64().map(Value::Int).ok_or_else(|| LoxError::runtime("bigint is too large to convert to int.", at))
    });
    b.register(BIGINT, "toFloat", Arity::Fixed(1), |interp, args, at| {
        let n = expect_bigint(interp, arg(args, 0), BIGINT, "toFloat", at)?;
        Ok(Value::Float(n.to_f64().unwrap_or(f64::NAN)))
    });
    b.register(BIGINT, "plus", Arity::Fixed(2), |interp, args, at| crate::numeric::add(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGINT, "minus", Arity::Fixed(2), |interp, args, at| crate::numeric::sub(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGINT, "times", Arity::Fixed(2), |interp, args, at| crate::numeric::mul(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGINT, "dividedBy", Arity::Fixed(2), |interp, args, at| crate::numeric::div(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGINT, "mod", Arity::Fixed(2), |interp, args, at| crate::numeric::rem(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGINT, "negate", Arity::Fixed(1), |interp, args, at| crate::numeric::neg(interp, arg(args, 0), at));
    b.register(BIGINT, "abs", Arity::Fixed(1), |interp, args, at| {
        let n = expect_bigint(interp, arg(args, 0), BIGINT, "abs", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::BigInt(n.magnitude().clone().into()), at)?))
    });
    b.register(BIGINT, "compareTo", Arity::Fixed(2), |interp, args, at| {
        let ord = crate::numeric::compare(interp, arg(args, 0), arg(args, 1), at)?;
        Ok(Value::Int(ord as i64))
    });
    b.register(BIGINT, "equals", Arity::Fixed(2), |interp, args, at| {
        Ok(Value::Bool(arg(args, 0).equals(&arg(args, 1), &interp.heap)))
    });

    b.register(BIGFLOAT, "toString", Arity::Fixed(1), |interp, args, at| {
        let f = expect_bigfloat(interp, arg(args, 0), at)?;
        alloc_str(interp, f.to_string(), at)
    });
    b.register(BIGFLOAT, "toFloat", Arity::Fixed(1), |interp, args, at| {
        let f = expect_bigfloat(interp, arg(args, 0), at)?;
        Ok(Value::Float(f.to_f64()))
    });
    b.register(BIGFLOAT, "plus", Arity::Fixed(2), |interp, args, at| crate::numeric::add(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGFLOAT, "minus", Arity::Fixed(2), |interp, args, at| crate::numeric::sub(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGFLOAT, "times", Arity::Fixed(2), |interp, args, at| crate::numeric::mul(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGFLOAT, "dividedBy", Arity::Fixed(2), |interp, args, at| crate::numeric::div(interp, arg(args, 0), arg(args, 1), at));
    b.register(BIGFLOAT, "negate", Arity::Fixed(1), |interp, args, at| crate::numeric::neg(interp, arg(args, 0), at));
    b.register(BIGFLOAT, "compareTo", Arity::Fixed(2), |interp, args, at| {
        let ord = crate::numeric::compare(interp, arg(args, 0), arg(args, 1), at)?;
        Ok(Value::Int(ord as i64))
    });
}

fn expect_bigfloat(interp: &crate::interpreter::Interpreter, v: Value, at: crate::error::CodeLoc) -> crate::error::RunResult<BigFloat> {
    if let Value::Ref(id) = v {
        if let HeapData::BigFloat(f) = interp.heap.get(id) {
            return Ok(f.clone());
        }
    }
    Err(LoxError::bad_argument(BIGFLOAT, "operation", "bigfloat", at))
}
