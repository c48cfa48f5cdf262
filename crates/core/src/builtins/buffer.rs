//! `buffer` method table (§3 `buffer`): an ordered sequence of bytes as ints 0-255.
//!
//! `len`/`isEmpty`/`get`/`set`/`toList`/`toString`/`slice`/`concat`/`equals` are always
//! on; `compress`/`decompress` are gated behind the `compression` feature and are the
//! only consumer of the `flate2` dependency, grounded the same way `stdlib::crypto` and
//! `stdlib::net` ground their feature-gated dependencies.

use super::{alloc_list, alloc_str, arg, expect_int, Builtins};
use crate::error::LoxError;
use crate::function::Arity;
use crate::heap::HeapData;
use crate::value::Value;

const OWNER: &str = "buffer";

fn expect_buffer(interp: &crate::interpreter::Interpreter, v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<crate::heap::HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Buffer(_)) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(OWNER, method, "buffer", at))
}

fn expect_byte(v: Value, method: &str, at: crate::error::CodeLoc) -> crate::error::RunResult<u8> {
    match v {
        Value::Int(i) if (0..=255).contains(&i) => Ok(i as u8),
        Value::Int(_) => Err(LoxError::bad_argument(OWNER, method, "int in 0..255", at)),
        _ => Err(LoxError::bad_argument(OWNER, method, "int", at)),
    }
}

pub fn register(b: &mut Builtins) {
    b.register(OWNER, "len", Arity::Fixed(1), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "len", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(buf.len() as i64))
    });
    b.register(OWNER, "isEmpty", Arity::Fixed(1), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "isEmpty", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(buf.is_empty()))
    });
    b.register(OWNER, "get", Arity::Fixed(2), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "get", at)?;
        let idx = expect_int(interp, arg(args, 1), OWNER, "get", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let idx = super::normalize_index(idx, buf.len(), at)?;
        Ok(Value::Int(i64::from(buf[idx])))
    });
    b.register(OWNER, "set", Arity::Fixed(3), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "set", at)?;
        let idx = expect_int(interp, arg(args, 1), OWNER, "set", at)?;
        let byte = expect_byte(arg(args, 2), "set", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let idx = super::normalize_index(idx, buf.len(), at)?;
        let HeapData::Buffer(buf) = interp.heap.get_mut(id) else { unreachable!() };
        buf[idx] = byte;
        Ok(Value::Nil)
    });
    b.register(OWNER, "toList", Arity::Fixed(1), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "toList", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let items: Vec<Value> = buf.iter().map(|b| Value::Int(i64::from(*b))).collect();
        alloc_list(interp, items, at)
    });
    b.register(OWNER, "toString", Arity::Fixed(1), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "toString", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let s = String::from_utf8_lossy(buf).into_owned();
        alloc_str(interp, s, at)
    });
    b.register(OWNER, "slice", Arity::Fixed(3), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "slice", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let len = buf.len();
        let start = expect_int(interp, arg(args, 1), OWNER, "slice", at)?.max(0) as usize;
        let end = expect_int(interp, arg(args, 2), OWNER, "slice", at)?.max(0) as usize;
        let end = end.min(len);
        let start = start.min(end);
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let bytes = buf[start..end].to_vec();
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(bytes), at)?))
    });
    b.register(OWNER, "concat", Arity::Fixed(2), |interp, args, at| {
        let a = expect_buffer(interp, arg(args, 0), "concat", at)?;
        let b = expect_buffer(interp, arg(args, 1), "concat", at)?;
        let HeapData::Buffer(a_bytes) = interp.heap.get(a) else { unreachable!() };
        let mut bytes = a_bytes.clone();
        let HeapData::Buffer(b_bytes) = interp.heap.get(b) else { unreachable!() };
        bytes.extend_from_slice(b_bytes);
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(bytes), at)?))
    });
    b.register(OWNER, "equals", Arity::Fixed(2), |interp, args, at| {
        let a = expect_buffer(interp, arg(args, 0), "equals", at)?;
        let b = expect_buffer(interp, arg(args, 1), "equals", at)?;
        let HeapData::Buffer(a_bytes) = interp.heap.get(a) else { unreachable!() };
        let HeapData::Buffer(b_bytes) = interp.heap.get(b) else { unreachable!() };
        Ok(Value::Bool(a_bytes == b_bytes))
    });

    #[cfg(feature = "compression")]
    register_compression(b);
}

#[cfg(feature = "compression")]
fn register_compression(b: &mut Builtins) {
    use std::io::{Read, Write};

    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    b.register(OWNER, "compress", Arity::Fixed(1), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "compress", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(buf).map_err(|e| LoxError::runtime(format!("Compression failed: {e}."), at))?;
        let bytes = encoder.finish().map_err(|e| LoxError::runtime(format!("Compression failed: {e}."), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(bytes), at)?))
    });
    b.register(OWNER, "decompress", Arity::Fixed(1), |interp, args, at| {
        let id = expect_buffer(interp, arg(args, 0), "decompress", at)?;
        let HeapData::Buffer(buf) = interp.heap.get(id) else { unreachable!() };
        let mut decoder = GzDecoder::new(&buf[..]);
        let mut bytes = Vec::new();
        decoder
            .read_to_end(&mut bytes)
            .map_err(|e| LoxError::runtime(format!("Decompression failed: not gzip data or corrupted ({e})."), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(bytes), at)?))
    });
}
