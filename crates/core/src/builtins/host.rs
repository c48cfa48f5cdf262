//! Host-backed leaf type method tables (§3 `file`, `process`, `process-result`,
//! `csv-writer`, `uuid`, `html-node`, `html-tokenizer`, and, feature-gated,
//! `url-values`, `connection`, `age-symmetric`).
//!
//! Constructors (`File.open`, `UUID.v4`, `HTML.parse`, `webbrowser.open`, ...) are
//! installed as static members of their namespace classes in `globals.rs`; this table
//! covers the operations available on an already-constructed handle.

use std::io::{Read, Write};

use super::{alloc_list, alloc_str, arg, expect_str, Builtins};
use crate::error::{CodeLoc, LoxError, RunResult};
use crate::heap::{HeapData, HeapId};
use crate::function::Arity;
use crate::interpreter::Interpreter;
use crate::stdlib::html::{HtmlChild, HtmlNode, HtmlToken};
use crate::stdlib::HostObject;
use crate::value::Value;

const UUID: &str = "uuid";
const HTML_NODE: &str = "htmlNode";
const HTML_TOKENIZER: &str = "htmlTokenizer";
const FILE: &str = "file";
const PROCESS: &str = "process";
const PROCESS_RESULT: &str = "processResult";
const CSV_WRITER: &str = "csvWriter";

fn expect_host(interp: &Interpreter, v: Value, owner: &str, method: &str, at: CodeLoc) -> RunResult<HeapId> {
    if let Value::Ref(id) = v {
        if matches!(interp.heap.get(id), HeapData::Host(h) if h.type_name() == owner) {
            return Ok(id);
        }
    }
    Err(LoxError::bad_argument(owner, method, owner, at))
}

fn alloc_html_node(interp: &mut Interpreter, node: HtmlNode, at: CodeLoc) -> RunResult<Value> {
    Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::HtmlNode(node)), at)?))
}

fn attrs_to_list(interp: &mut Interpreter, attrs: &[(String, String)], at: CodeLoc) -> RunResult<Value> {
    let mut out = Vec::with_capacity(attrs.len());
    for (k, v) in attrs {
        let key = alloc_str(interp, k.clone(), at)?;
        let val = alloc_str(interp, v.clone(), at)?;
        out.push(alloc_list(interp, vec![key, val], at)?);
    }
    alloc_list(interp, out, at)
}

fn children_to_list(interp: &mut Interpreter, children: &[HtmlChild], at: CodeLoc) -> RunResult<Value> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        out.push(match child {
            HtmlChild::Text(t) => alloc_str(interp, t.clone(), at)?,
            HtmlChild::Element(e) => alloc_html_node(interp, (**e).clone(), at)?,
        });
    }
    alloc_list(interp, out, at)
}

pub fn register(b: &mut Builtins) {
    // --- uuid ---------------------------------------------------------------------
    b.register(UUID, "toString", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), UUID, "toString", at)?;
        let HeapData::Host(HostObject::Uuid(u)) = interp.heap.get(id) else { unreachable!() };
        alloc_str(interp, u.to_string(), at)
    });
    b.register(UUID, "equals", Arity::Fixed(2), |interp, args, at| {
        Ok(Value::Bool(arg(args, 0).equals(&arg(args, 1), &interp.heap)))
    });

    // --- htmlNode -------------------------------------------------------------------
    b.register(HTML_NODE, "tagName", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_NODE, "tagName", at)?;
        let HeapData::Host(HostObject::HtmlNode(n)) = interp.heap.get(id) else { unreachable!() };
        alloc_str(interp, n.tag.clone(), at)
    });
    b.register(HTML_NODE, "attr", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_NODE, "attr", at)?;
        let key = expect_str(interp, arg(args, 1), HTML_NODE, "attr", at)?;
        let HeapData::Host(HostObject::HtmlNode(n)) = interp.heap.get(id) else { unreachable!() };
        match n.attr(&key) {
            Some(v) => alloc_str(interp, v.to_owned(), at),
            None => Ok(Value::Nil),
        }
    });
    b.register(HTML_NODE, "attrs", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_NODE, "attrs", at)?;
        let attrs = { let HeapData::Host(HostObject::HtmlNode(n)) = interp.heap.get(id) else { unreachable!() }; n.attrs.clone() };
        attrs_to_list(interp, &attrs, at)
    });
    b.register(HTML_NODE, "children", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_NODE, "children", at)?;
        let children = { let HeapData::Host(HostObject::HtmlNode(n)) = interp.heap.get(id) else { unreachable!() }; n.children.clone() };
        children_to_list(interp, &children, at)
    });
    b.register(HTML_NODE, "textContent", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_NODE, "textContent", at)?;
        let HeapData::Host(HostObject::HtmlNode(n)) = interp.heap.get(id) else { unreachable!() };
        alloc_str(interp, n.text_content(), at)
    });
    b.register(HTML_NODE, "findAll", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_NODE, "findAll", at)?;
        let tag = expect_str(interp, arg(args, 1), HTML_NODE, "findAll", at)?;
        let found: Vec<HtmlNode> = { let HeapData::Host(HostObject::HtmlNode(n)) = interp.heap.get(id) else { unreachable!() }; n.find_all(&tag).into_iter().cloned().collect() };
        let mut out = Vec::with_capacity(found.len());
        for node in found {
            out.push(alloc_html_node(interp, node, at)?);
        }
        alloc_list(interp, out, at)
    });

    // --- htmlTokenizer ----------------------------------------------------------------
    b.register(HTML_TOKENIZER, "hasNext", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_TOKENIZER, "hasNext", at)?;
        let HeapData::Host(HostObject::HtmlTokenizer(t)) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(t.has_next()))
    });
    b.register(HTML_TOKENIZER, "nextToken", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), HTML_TOKENIZER, "nextToken", at)?;
        let token = { let HeapData::Host(HostObject::HtmlTokenizer(t)) = interp.heap.get_mut(id) else { unreachable!() }; t.next_token() };
        let Some(token) = token else { return Ok(Value::Nil) };
        token_to_value(interp, token, at)
    });

    // --- file -------------------------------------------------------------------------
    b.register(FILE, "readAll", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), FILE, "readAll", at)?;
        let HeapData::Host(HostObject::File(f)) = interp.heap.get_mut(id) else { unreachable!() };
        if f.closed {
            return Err(LoxError::runtime("Cannot read from a closed file.", at));
        }
        let mut buf = String::new();
        f.file.as_mut().unwrap().read_to_string(&mut buf).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        alloc_str(interp, buf, at)
    });
    b.register(FILE, "writeLine", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), FILE, "writeLine", at)?;
        let line = expect_str(interp, arg(args, 1), FILE, "writeLine", at)?;
        let HeapData::Host(HostObject::File(f)) = interp.heap.get_mut(id) else { unreachable!() };
        if f.closed {
            return Err(LoxError::runtime("Cannot write to a closed file.", at));
        }
        let handle = f.file.as_mut().unwrap();
        handle.write_all(line.as_bytes()).and_then(|()| handle.write_all(b"\n")).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
    b.register(FILE, "write", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), FILE, "write", at)?;
        let text = expect_str(interp, arg(args, 1), FILE, "write", at)?;
        let HeapData::Host(HostObject::File(f)) = interp.heap.get_mut(id) else { unreachable!() };
        if f.closed {
            return Err(LoxError::runtime("Cannot write to a closed file.", at));
        }
        f.file.as_mut().unwrap().write_all(text.as_bytes()).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
    b.register(FILE, "close", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), FILE, "close", at)?;
        let HeapData::Host(HostObject::File(f)) = interp.heap.get_mut(id) else { unreachable!() };
        f.close();
        Ok(Value::Nil)
    });
    b.register(FILE, "isClosed", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), FILE, "isClosed", at)?;
        let HeapData::Host(HostObject::File(f)) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(f.closed))
    });
    b.register(FILE, "path", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), FILE, "path", at)?;
        let HeapData::Host(HostObject::File(f)) = interp.heap.get(id) else { unreachable!() };
        alloc_str(interp, f.path.clone(), at)
    });

    // --- process ------------------------------------------------------------------------
    b.register(PROCESS, "pid", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), PROCESS, "pid", at)?;
        let HeapData::Host(HostObject::Process(p)) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(i64::from(p.pid)))
    });
    b.register(PROCESS, "wait", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), PROCESS, "wait", at)?;
        let result = {
            let HeapData::Host(HostObject::Process(p)) = interp.heap.get_mut(id) else { unreachable!() };
            p.wait().map_err(|e| LoxError::runtime(e.to_string(), at))?
        };
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::ProcessResult(result)), at)?))
    });

    // --- processResult --------------------------------------------------------------------
    b.register(PROCESS_RESULT, "status", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), PROCESS_RESULT, "status", at)?;
        let HeapData::Host(HostObject::ProcessResult(r)) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Int(i64::from(r.status)))
    });
    b.register(PROCESS_RESULT, "stdout", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), PROCESS_RESULT, "stdout", at)?;
        let s = { let HeapData::Host(HostObject::ProcessResult(r)) = interp.heap.get(id) else { unreachable!() }; r.stdout.clone() };
        alloc_str(interp, s, at)
    });
    b.register(PROCESS_RESULT, "stderr", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), PROCESS_RESULT, "stderr", at)?;
        let s = { let HeapData::Host(HostObject::ProcessResult(r)) = interp.heap.get(id) else { unreachable!() }; r.stderr.clone() };
        alloc_str(interp, s, at)
    });

    // --- csvWriter ----------------------------------------------------------------------
    b.register(CSV_WRITER, "writeRow", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CSV_WRITER, "writeRow", at)?;
        let row_id = super::expect_list(interp, arg(args, 1), CSV_WRITER, "writeRow", at)?;
        let items = { let HeapData::List(items) = interp.heap.get(row_id) else { unreachable!() }; items.clone() };
        let mut fields = Vec::with_capacity(items.len());
        for item in items {
            fields.push(expect_str(interp, item, CSV_WRITER, "writeRow", at)?.to_string());
        }
        let HeapData::Host(HostObject::CsvWriter(w)) = interp.heap.get_mut(id) else { unreachable!() };
        w.write_row(&fields).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
    b.register(CSV_WRITER, "flush", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CSV_WRITER, "flush", at)?;
        let HeapData::Host(HostObject::CsvWriter(w)) = interp.heap.get_mut(id) else { unreachable!() };
        w.flush().map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
    b.register(CSV_WRITER, "close", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CSV_WRITER, "close", at)?;
        let HeapData::Host(HostObject::CsvWriter(w)) = interp.heap.get_mut(id) else { unreachable!() };
        w.close().map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });

    #[cfg(feature = "net")]
    register_net(b);
    #[cfg(feature = "crypto")]
    register_crypto(b);
}

fn token_to_value(interp: &mut Interpreter, token: HtmlToken, at: CodeLoc) -> RunResult<Value> {
    let (kind, name, text, attrs) = match token {
        HtmlToken::StartTag { name, attrs, .. } => ("startTag", name, String::new(), attrs),
        HtmlToken::EndTag { name } => ("endTag", name, String::new(), Vec::new()),
        HtmlToken::Text(t) => ("text", String::new(), t, Vec::new()),
        HtmlToken::Comment(c) => ("comment", String::new(), c, Vec::new()),
    };
    let kind = alloc_str(interp, kind.to_owned(), at)?;
    let name = alloc_str(interp, name, at)?;
    let text = alloc_str(interp, text, at)?;
    let attrs = attrs_to_list(interp, &attrs, at)?;
    alloc_list(interp, vec![kind, name, text, attrs], at)
}

#[cfg(feature = "net")]
fn register_net(b: &mut Builtins) {
    const URL_VALUES: &str = "urlValues";
    const CONNECTION: &str = "connection";

    b.register(URL_VALUES, "getFirst", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), URL_VALUES, "getFirst", at)?;
        let key = expect_str(interp, arg(args, 1), URL_VALUES, "getFirst", at)?;
        let HeapData::Host(HostObject::UrlValues(u)) = interp.heap.get(id) else { unreachable!() };
        match u.get_first(&key) {
            Some(v) => alloc_str(interp, v.to_owned(), at),
            None => Ok(Value::Nil),
        }
    });
    b.register(URL_VALUES, "getAll", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), URL_VALUES, "getAll", at)?;
        let key = expect_str(interp, arg(args, 1), URL_VALUES, "getAll", at)?;
        let values: Vec<String> = { let HeapData::Host(HostObject::UrlValues(u)) = interp.heap.get(id) else { unreachable!() }; u.get_all(&key).to_vec() };
        let mut out = Vec::with_capacity(values.len());
        for v in values {
            out.push(alloc_str(interp, v, at)?);
        }
        alloc_list(interp, out, at)
    });
    b.register(URL_VALUES, "add", Arity::Fixed(3), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), URL_VALUES, "add", at)?;
        let key = expect_str(interp, arg(args, 1), URL_VALUES, "add", at)?.to_string();
        let value = expect_str(interp, arg(args, 2), URL_VALUES, "add", at)?.to_string();
        let HeapData::Host(HostObject::UrlValues(u)) = interp.heap.get_mut(id) else { unreachable!() };
        u.add(key, value);
        Ok(Value::Nil)
    });
    b.register(URL_VALUES, "set", Arity::Fixed(3), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), URL_VALUES, "set", at)?;
        let key = expect_str(interp, arg(args, 1), URL_VALUES, "set", at)?.to_string();
        let value = expect_str(interp, arg(args, 2), URL_VALUES, "set", at)?.to_string();
        let HeapData::Host(HostObject::UrlValues(u)) = interp.heap.get_mut(id) else { unreachable!() };
        u.set(key, value);
        Ok(Value::Nil)
    });
    b.register(URL_VALUES, "remove", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), URL_VALUES, "remove", at)?;
        let key = expect_str(interp, arg(args, 1), URL_VALUES, "remove", at)?;
        let HeapData::Host(HostObject::UrlValues(u)) = interp.heap.get_mut(id) else { unreachable!() };
        Ok(Value::Bool(u.remove(&key)))
    });
    b.register(URL_VALUES, "contains", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), URL_VALUES, "contains", at)?;
        let key = expect_str(interp, arg(args, 1), URL_VALUES, "contains", at)?;
        let HeapData::Host(HostObject::UrlValues(u)) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(u.contains(&key)))
    });
    b.register(URL_VALUES, "toString", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), URL_VALUES, "toString", at)?;
        let HeapData::Host(HostObject::UrlValues(u)) = interp.heap.get(id) else { unreachable!() };
        alloc_str(interp, u.display(), at)
    });

    b.register(CONNECTION, "setReadDeadline", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CONNECTION, "setReadDeadline", at)?;
        let millis = super::expect_int(interp, arg(args, 1), CONNECTION, "setReadDeadline", at)?;
        let HeapData::Host(HostObject::Connection(c)) = interp.heap.get_mut(id) else { unreachable!() };
        c.set_deadline(millis.max(0) as u64).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
    b.register(CONNECTION, "setWriteDeadline", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CONNECTION, "setWriteDeadline", at)?;
        let millis = super::expect_int(interp, arg(args, 1), CONNECTION, "setWriteDeadline", at)?;
        let HeapData::Host(HostObject::Connection(c)) = interp.heap.get_mut(id) else { unreachable!() };
        c.set_deadline(millis.max(0) as u64).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
    b.register(CONNECTION, "write", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CONNECTION, "write", at)?;
        let text = expect_str(interp, arg(args, 1), CONNECTION, "write", at)?;
        let HeapData::Host(HostObject::Connection(c)) = interp.heap.get_mut(id) else { unreachable!() };
        if c.closed {
            return Err(LoxError::runtime("Cannot write to a closed connection.", at));
        }
        c.write_all(text.as_bytes()).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
    b.register(CONNECTION, "readAll", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CONNECTION, "readAll", at)?;
        let HeapData::Host(HostObject::Connection(c)) = interp.heap.get_mut(id) else { unreachable!() };
        if c.closed {
            return Err(LoxError::runtime("Cannot read from a closed connection.", at));
        }
        let bytes = c.read_to_end().map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(bytes), at)?))
    });
    b.register(CONNECTION, "close", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CONNECTION, "close", at)?;
        let HeapData::Host(HostObject::Connection(c)) = interp.heap.get_mut(id) else { unreachable!() };
        c.close();
        Ok(Value::Nil)
    });
    b.register(CONNECTION, "isClosed", Arity::Fixed(1), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), CONNECTION, "isClosed", at)?;
        let HeapData::Host(HostObject::Connection(c)) = interp.heap.get(id) else { unreachable!() };
        Ok(Value::Bool(c.closed))
    });
}

#[cfg(feature = "crypto")]
fn register_crypto(b: &mut Builtins) {
    const AGE_SYMMETRIC: &str = "ageSymmetric";

    b.register(AGE_SYMMETRIC, "encrypt", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), AGE_SYMMETRIC, "encrypt", at)?;
        let plaintext = expect_str(interp, arg(args, 1), AGE_SYMMETRIC, "encrypt", at)?;
        let HeapData::Host(HostObject::AgeSymmetric(a)) = interp.heap.get(id) else { unreachable!() };
        let ciphertext = a.encrypt(plaintext.as_bytes(), at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(ciphertext), at)?))
    });
    b.register(AGE_SYMMETRIC, "decrypt", Arity::Fixed(2), |interp, args, at| {
        let id = expect_host(interp, arg(args, 0), AGE_SYMMETRIC, "decrypt", at)?;
        let Value::Ref(buf_id) = arg(args, 1) else {
            return Err(LoxError::bad_argument(AGE_SYMMETRIC, "decrypt", "buffer", at));
        };
        let HeapData::Buffer(blob) = interp.heap.get(buf_id) else {
            return Err(LoxError::bad_argument(AGE_SYMMETRIC, "decrypt", "buffer", at));
        };
        let blob = blob.clone();
        let HeapData::Host(HostObject::AgeSymmetric(a)) = interp.heap.get(id) else { unreachable!() };
        let plaintext = a.decrypt(&blob, at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(plaintext), at)?))
    });
}
