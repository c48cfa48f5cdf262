//! `string` method table (§3 `string`).

use std::rc::Rc;

use super::{alloc_list, alloc_str, arg, expect_int, expect_str, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::value::Value;

const OWNER: &str = "string";

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "len", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "len", at)?;
        Ok(Value::Int(s.chars().count() as i64))
    });
    b.register(OWNER, "upper", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "upper", at)?;
        alloc_str(interp, s.to_uppercase(), at)
    });
    b.register(OWNER, "lower", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "lower", at)?;
        alloc_str(interp, s.to_lowercase(), at)
    });
    b.register(OWNER, "trim", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "trim", at)?;
        alloc_str(interp, s.trim(), at)
    });
    b.register(OWNER, "split", Arity::Fixed(2), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "split", at)?;
        let sep = expect_str(interp, arg(args, 1), OWNER, "split", at)?;
        let mut out = Vec::new();
        for part in s.split(sep.as_ref()) {
            out.push(alloc_str(interp, part, at)?);
        }
        alloc_list(interp, out, at)
    });
    b.register(OWNER, "contains", Arity::Fixed(2), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "contains", at)?;
        let needle = expect_str(interp, arg(args, 1), OWNER, "contains", at)?;
        Ok(Value::Bool(s.contains(needle.as_ref())))
    });
    b.register(OWNER, "startsWith", Arity::Fixed(2), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "startsWith", at)?;
        let prefix = expect_str(interp, arg(args, 1), OWNER, "startsWith", at)?;
        Ok(Value::Bool(s.starts_with(prefix.as_ref())))
    });
    b.register(OWNER, "endsWith", Arity::Fixed(2), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "endsWith", at)?;
        let suffix = expect_str(interp, arg(args, 1), OWNER, "endsWith", at)?;
        Ok(Value::Bool(s.ends_with(suffix.as_ref())))
    });
    b.register(OWNER, "replace", Arity::Fixed(3), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "replace", at)?;
        let from = expect_str(interp, arg(args, 1), OWNER, "replace", at)?;
        let to = expect_str(interp, arg(args, 2), OWNER, "replace", at)?;
        alloc_str(interp, s.replace(from.as_ref(), &to), at)
    });
    b.register(OWNER, "slice", Arity::Fixed(3), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "slice", at)?;
        let start = expect_int(interp, arg(args, 1), OWNER, "slice", at)?.max(0) as usize;
        let end = expect_int(interp, arg(args, 2), OWNER, "slice", at)?.max(0) as usize;
        let chars: Vec<char> = s.chars().collect();
        let end = end.min(chars.len());
        let start = start.min(end);
        let slice: String = chars[start..end].iter().collect();
        alloc_str(interp, slice, at)
    });
    b.register(OWNER, "repeat", Arity::Fixed(2), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "repeat", at)?;
        let n = expect_int(interp, arg(args, 1), OWNER, "repeat", at)?.max(0) as usize;
        alloc_str(interp, s.repeat(n), at)
    });
    b.register(OWNER, "charAt", Arity::Fixed(2), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "charAt", at)?;
        let idx = expect_int(interp, arg(args, 1), OWNER, "charAt", at)?;
        let idx = super::normalize_index(idx, s.chars().count(), at)?;
        let ch = s.chars().nth(idx).unwrap();
        alloc_str(interp, ch.to_string(), at)
    });
    b.register(OWNER, "toInt", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "toInt", at)?;
        s.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| LoxError::bad_argument(OWNER, "toInt", "parseable int", at))
    });
    b.register(OWNER, "toFloat", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "toFloat", at)?;
        s.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| LoxError::bad_argument(OWNER, "toFloat", "parseable float", at))
    });
    b.register(OWNER, "chars", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "chars", at)?;
        let mut out = Vec::new();
        for c in s.chars() {
            out.push(alloc_str(interp, c.to_string(), at)?);
        }
        alloc_list(interp, out, at)
    });
    b.register(OWNER, "join", Arity::Fixed(2), |interp, args, at| {
        let sep = expect_str(interp, arg(args, 0), OWNER, "join", at)?;
        let list_id = super::expect_list(interp, arg(args, 1), OWNER, "join", at)?;
        let HeapData::List(items) = interp.heap.get(list_id) else { unreachable!() };
        let parts: Vec<String> = items.iter().map(|v| v.display(&interp.heap, false)).collect();
        alloc_str(interp, parts.join(sep.as_ref()), at)
    });
    b.register(OWNER, "toBuffer", Arity::Fixed(1), |interp, args, at| {
        let s = expect_str(interp, arg(args, 0), OWNER, "toBuffer", at)?;
        let bytes = s.as_bytes().to_vec();
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(bytes), at)?))
    });
}
