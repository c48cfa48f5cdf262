//! `date`/`duration`/`stopwatch` instance method tables (§3).

use super::{alloc_str, arg, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::types::date::{Date, Duration};
use crate::value::Value;

const DATE: &str = "date";
const DURATION: &str = "duration";
const STOPWATCH: &str = "stopwatch";

fn expect_date(interp: &crate::interpreter::Interpreter, v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<Date> {
    if let Value::Ref(id) = v {
        if let HeapData::Date(d) = interp.heap.get(id) {
            return Ok(*d);
        }
    }
    Err(LoxError::bad_argument(DATE, method, "date", at))
}

fn expect_duration(interp: &crate::interpreter::Interpreter, v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<Duration> {
    if let Value::Ref(id) = v {
        if let HeapData::Duration(d) = interp.heap.get(id) {
            return Ok(*d);
        }
    }
    Err(LoxError::bad_argument(DURATION, method, "duration", at))
}

pub fn register(b: &mut Builtins) {
    b.register(DATE, "toString", Arity::Fixed(1), |interp, args, at| {
        let d = expect_date(interp, arg(args, 0), "toString", at)?;
        alloc_str(interp, d.display(), at)
    });
    b.register(DATE, "epochMillis", Arity::Fixed(1), |interp, args, at| {
        let d = expect_date(interp, arg(args, 0), "epochMillis", at)?;
        Ok(Value::Int(d.epoch_millis()))
    });
    b.register(DATE, "plus", Arity::Fixed(2), |interp, args, at| {
        let d = expect_date(interp, arg(args, 0), "plus", at)?;
        let dur = expect_duration(interp, arg(args, 1), "plus", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Date(d.plus(&dur)), at)?))
    });
    b.register(DATE, "minus", Arity::Fixed(2), |interp, args, at| {
        let d = expect_date(interp, arg(args, 0), "minus", at)?;
        let dur = expect_duration(interp, arg(args, 1), "minus", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Date(d.minus(&dur)), at)?))
    });
    b.register(DATE, "diff", Arity::Fixed(2), |interp, args, at| {
        let d = expect_date(interp, arg(args, 0), "diff", at)?;
        let other = expect_date(interp, arg(args, 1), "diff", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Duration(d.diff(&other)), at)?))
    });
    b.register(DATE, "isBefore", Arity::Fixed(2), |interp, args, at| {
        let d = expect_date(interp, arg(args, 0), "isBefore", at)?;
        let other = expect_date(interp, arg(args, 1), "isBefore", at)?;
        Ok(Value::Bool(d < other))
    });
    b.register(DATE, "isAfter", Arity::Fixed(2), |interp, args, at| {
        let d = expect_date(interp, arg(args, 0), "isAfter", at)?;
        let other = expect_date(interp, arg(args, 1), "isAfter", at)?;
        Ok(Value::Bool(d > other))
    });
    b.register(DATE, "loopUntil", Arity::Fixed(2), |interp, args, at| {
        let deadline = expect_date(interp, arg(args, 0), "loopUntil", at)?;
        let f = arg(args, 1);
        loop {
            if Date::now() >= deadline {
                break;
            }
            let keep_going = interp.call_value(f, &[], at)?.is_truthy(&interp.heap);
            if !keep_going {
                break;
            }
        }
        Ok(Value::Nil)
    });

    b.register(DURATION, "toString", Arity::Fixed(1), |interp, args, at| {
        let d = expect_duration(interp, arg(args, 0), "toString", at)?;
        alloc_str(interp, d.display(), at)
    });
    b.register(DURATION, "asMillis", Arity::Fixed(1), |interp, args, at| {
        let d = expect_duration(interp, arg(args, 0), "asMillis", at)?;
        Ok(Value::Int(d.as_millis()))
    });
    b.register(DURATION, "asSeconds", Arity::Fixed(1), |interp, args, at| {
        let d = expect_duration(interp, arg(args, 0), "asSeconds", at)?;
        Ok(Value::Float(d.as_seconds()))
    });
    b.register(DURATION, "plus", Arity::Fixed(2), |interp, args, at| {
        let d = expect_duration(interp, arg(args, 0), "plus", at)?;
        let other = expect_duration(interp, arg(args, 1), "plus", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Duration(d.plus(&other)), at)?))
    });
    b.register(DURATION, "minus", Arity::Fixed(2), |interp, args, at| {
        let d = expect_duration(interp, arg(args, 0), "minus", at)?;
        let other = expect_duration(interp, arg(args, 1), "minus", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Duration(d.minus(&other)), at)?))
    });
    b.register(DURATION, "dividedBy", Arity::Fixed(2), |interp, args, at| {
        let d = expect_duration(interp, arg(args, 0), "dividedBy", at)?;
        let other = expect_duration(interp, arg(args, 1), "dividedBy", at)?;
        Ok(Value::Float(d.divide(&other, at)?))
    });
    b.register(DURATION, "sleep", Arity::Fixed(1), |interp, args, at| {
        let d = expect_duration(interp, arg(args, 0), "sleep", at)?;
        d.sleep();
        Ok(Value::Nil)
    });

    b.register(STOPWATCH, "stop", Arity::Fixed(1), |interp, args, at| {
        let id = expect_stopwatch_id(interp, arg(args, 0), "stop", at)?;
        let HeapData::Stopwatch(s) = interp.heap.get_mut(id) else { unreachable!() };
        s.stop();
        Ok(Value::Nil)
    });
    b.register(STOPWATCH, "resume", Arity::Fixed(1), |interp, args, at| {
        let id = expect_stopwatch_id(interp, arg(args, 0), "resume", at)?;
        let HeapData::Stopwatch(s) = interp.heap.get_mut(id) else { unreachable!() };
        s.resume();
        Ok(Value::Nil)
    });
    b.register(STOPWATCH, "reset", Arity::Fixed(1), |interp, args, at| {
        let id = expect_stopwatch_id(interp, arg(args, 0), "reset", at)?;
        let HeapData::Stopwatch(s) = interp.heap.get_mut(id) else { unreachable!() };
        s.reset();
        Ok(Value::Nil)
    });
    b.register(STOPWATCH, "elapsed", Arity::Fixed(1), |interp, args, at| {
        let id = expect_stopwatch_id(interp, arg(args, 0), "elapsed", at)?;
        let HeapData::Stopwatch(s) = interp.heap.get(id) else { unreachable!() };
        let d = s.elapsed();
        Ok(Value::Ref(interp.heap.allocate(HeapData::Duration(d), at)?))
    });
}

fn expect_stopwatch_id(interp: &crate::interpreter::Interpreter, v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<crate::heap::HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Stopwatch(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(STOPWATCH, method, "stopwatch", at))
}
