//! Global namespace classes (§6 "Built-in class surface"): `bigint`, `Float`,
//! `Iterator`, `pqueue`, `Rand`, `os`, `HTML`, `process`, `webbrowser`, `UUID`,
//! `date`, `Duration`, `Stopwatch`, `csv`, `deque`/`queue`/`ring`, and, feature-gated,
//! `url`/`connection`/`age`.
//!
//! Every built-in *instance* method table lives on the flat per-type-name
//! [`Builtins`] lookup built by the rest of this directory; a namespace class's
//! *static* surface instead lives on [`crate::class::Class::statics`], consulted by
//! [`crate::property::get_static_property`], since there is no bound receiver for
//! e.g. `UUID.v4()`. This module allocates one `is_builtin: true` [`Class`] per
//! namespace and binds it into the global environment under its fixed name, mirroring
//! how the teacher's `random_mod.rs`/similar modules install one class per built-in
//! module at startup.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::class::Class;
use crate::error::{CodeLoc, LoxError, RunResult};
use crate::function::{Arity, NativeFunction};
use crate::heap::{HeapData, HeapId};
use crate::interpreter::Interpreter;
use crate::pqueue::PriorityQueueBuilder;
use crate::stdlib::html::{HtmlNode, HtmlTokenizer};
use crate::stdlib::io::{CsvWriter, FileHandle, ProcessHandle};
use crate::stdlib::HostObject;
use crate::types::bignum::BigFloat;
use crate::types::containers::{Deque, DequeKind, Range};
use crate::types::date::{Date, Duration, Stopwatch};
use crate::types::iterator::IterState;
use crate::value::Value;

#[cfg(feature = "crypto")]
use crate::stdlib::crypto::AgeSymmetric;
#[cfg(feature = "net")]
use crate::stdlib::net::{Connection, UrlValues};

/// Allocates a fresh, empty `is_builtin` namespace class and binds it into the global
/// environment under `name`. Callers add its static surface with [`add_static`].
fn new_namespace(interp: &mut Interpreter, name: &str) -> HeapId {
    let at = CodeLoc::synthetic();
    let mut class = Class::new(name.to_owned(), None, interp.globals);
    class.is_builtin = true;
    let id = interp.heap.allocate(HeapData::Class(class), at).expect("namespace class allocation during startup");
    interp.env.define(interp.globals, name, Value::Ref(id));
    id
}

/// Adds one native static function to a namespace class already installed by
/// [`new_namespace`].
fn add_static(
    interp: &mut Interpreter,
    class_id: HeapId,
    owner: &'static str,
    name: &'static str,
    arity: Arity,
    f: impl Fn(&mut Interpreter, &[Value], CodeLoc) -> RunResult<Value> + 'static,
) {
    let at = CodeLoc::synthetic();
    let native = NativeFunction::new(name, arity, f).with_owner(owner);
    let fn_id = interp.heap.allocate(HeapData::Native(native), at).expect("static member allocation during startup");
    let HeapData::Class(class) = interp.heap.get_mut(class_id) else { unreachable!() };
    class.statics.insert(name.to_owned(), Value::Ref(fn_id));
}

/// Binds one native function directly into the global environment under `name`, for the
/// handful of builtins (`range`, `bigrange`, `set`) that §3 calls as plain functions
/// rather than through a namespace (`range(0)`, not `Range.of(0)`).
fn define_global_fn(
    interp: &mut Interpreter,
    owner: &'static str,
    name: &'static str,
    arity: Arity,
    f: impl Fn(&mut Interpreter, &[Value], CodeLoc) -> RunResult<Value> + 'static,
) {
    let at = CodeLoc::synthetic();
    let native = NativeFunction::new(name, arity, f).with_owner(owner);
    let fn_id = interp.heap.allocate(HeapData::Native(native), at).expect("global function allocation during startup");
    interp.env.define(interp.globals, name, Value::Ref(fn_id));
}

pub fn install(interp: &mut Interpreter) {
    install_bigint(interp);
    install_float(interp);
    install_buffer(interp);
    install_iterator(interp);
    install_pqueue(interp);
    install_rand(interp);
    install_os(interp);
    install_html(interp);
    install_process(interp);
    install_webbrowser(interp);
    install_uuid(interp);
    install_date(interp);
    install_duration(interp);
    install_stopwatch(interp);
    install_csv(interp);
    install_deque_family(interp);
    install_range(interp);
    install_set_ctor(interp);
    #[cfg(feature = "net")]
    install_net(interp);
    #[cfg(feature = "crypto")]
    install_crypto(interp);
}

fn install_bigint(interp: &mut Interpreter) {
    let id = new_namespace(interp, "bigint");
    add_static(interp, id, "bigint", "parse", Arity::Fixed(1), |interp, args, at| {
        let s = super::expect_str(interp, super::arg(args, 0), "bigint", "parse", at)?;
        let n: num_bigint::BigInt =
            s.parse().map_err(|_| LoxError::runtime(format!("Invalid bigint literal: '{s}'."), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::BigInt(n), at)?))
    });
    add_static(interp, id, "bigint", "of", Arity::Fixed(1), |interp, args, at| {
        let n = super::expect_bigint(interp, super::arg(args, 0), "bigint", "of", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::BigInt(n), at)?))
    });
}

fn install_float(interp: &mut Interpreter) {
    let id = new_namespace(interp, "Float");
    add_static(interp, id, "Float", "parse", Arity::Fixed(1), |interp, args, at| {
        let s = super::expect_str(interp, super::arg(args, 0), "Float", "parse", at)?;
        let f = BigFloat::from_str(&s).ok_or_else(|| LoxError::runtime(format!("Invalid float literal: '{s}'."), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::BigFloat(f), at)?))
    });
    add_static(interp, id, "Float", "of", Arity::Fixed(1), |interp, args, at| {
        let f = super::expect_float(super::arg(args, 0), "Float", "of", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::BigFloat(BigFloat::from_f64(f)), at)?))
    });
}

/// `Buffer.ofSize`/`fromList`: the constructors that don't take an existing buffer as
/// their receiver (everything else lives in `builtins/buffer.rs`). `string.toBuffer` is
/// the other construction path.
fn install_buffer(interp: &mut Interpreter) {
    let id = new_namespace(interp, "Buffer");
    add_static(interp, id, "Buffer", "ofSize", Arity::Fixed(1), |interp, args, at| {
        let n = super::expect_int(interp, super::arg(args, 0), "Buffer", "ofSize", at)?;
        if n < 0 {
            return Err(LoxError::bad_argument("Buffer", "ofSize", "non-negative int", at));
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(vec![0u8; n as usize]), at)?))
    });
    add_static(interp, id, "Buffer", "fromList", Arity::Fixed(1), |interp, args, at| {
        let list_id = super::expect_list(interp, super::arg(args, 0), "Buffer", "fromList", at)?;
        let HeapData::List(items) = interp.heap.get(list_id) else { unreachable!() };
        let mut bytes = Vec::with_capacity(items.len());
        for item in items.clone() {
            match item {
                Value::Int(i) if (0..=255).contains(&i) => bytes.push(i as u8),
                _ => return Err(LoxError::bad_argument("Buffer", "fromList", "list of ints in 0..255", at)),
            }
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Buffer(bytes), at)?))
    });
}

/// Every lazy combinator registered in `builtins/iterator.rs`'s `iterator` instance
/// table, re-exposed as an `Iterator.<name>(iterable, ...)` namespace static: (static
/// name, instance method name to forward to, arity). `chain`/`zip` are not in this list
/// -- they take a variadic run of iterables rather than "first arg + fixed extras" and
/// get their own statics below. Static names follow §1/§4.6's own prose casing
/// (`dropwhile`, `getuntillast`, ...) rather than the instance table's camelCase, since
/// §8's scenarios spell them that way and "names are contract" (§6).
const ITERATOR_FORWARDED: &[(&str, &str, Arity)] = &[
    ("map", "map", Arity::Fixed(2)),
    ("filter", "filter", Arity::Fixed(2)),
    ("filterfalse", "filterFalse", Arity::Fixed(2)),
    ("accumulate", "accumulate", Arity::Fixed(2)),
    ("accumulateAdd", "accumulateAdd", Arity::Fixed(1)),
    ("dropwhile", "dropWhile", Arity::Fixed(2)),
    ("dropuntil", "dropUntil", Arity::Fixed(2)),
    ("getwhile", "getWhile", Arity::Fixed(2)),
    ("getuntil", "getUntil", Arity::Fixed(2)),
    ("getwhilelast", "getWhileLast", Arity::Fixed(2)),
    ("getuntillast", "getUntilLast", Arity::Fixed(2)),
    ("batched", "batched", Arity::Fixed(2)),
    ("pairwise", "pairwise", Arity::Fixed(1)),
    ("cycle", "cycle", Arity::Fixed(1)),
    ("enumerate", "enumerate", Arity::Fixed(2)),
    ("reduce", "reduce", Arity::Fixed(3)),
    ("reduceRight", "reduceRight", Arity::Fixed(3)),
    ("reversed", "reversed", Arity::Fixed(1)),
    ("count", "count", Arity::AtLeast(1)),
    ("length", "length", Arity::Fixed(1)),
];

/// Coerces `args[0]` to an iterator and dispatches to the `iterator` instance method
/// named `target`, with `args[0]` swapped for the coerced iterator and every other
/// argument passed through unchanged. Backs every entry in [`ITERATOR_FORWARDED`].
fn forward_to_iterator_method(
    interp: &mut Interpreter,
    static_name: &'static str,
    target: &'static str,
    args: &[Value],
    at: CodeLoc,
) -> RunResult<Value> {
    let source = super::coerce_iter(interp, super::arg(args, 0), "Iterator", static_name, at)?;
    let mut full = args.to_vec();
    if full.is_empty() {
        full.push(Value::Ref(source));
    } else {
        full[0] = Value::Ref(source);
    }
    let native = interp
        .builtins
        .lookup("iterator", target)
        .expect("iterator instance method table is fully populated at startup");
    (native.func)(interp, &full, at)
}

/// `Iterator.countInt`/`countFloat`/`repeat`/`zeroes`/`urandom`: the constructors that
/// don't take an existing iterable as their receiver. Every lazy combinator plus
/// `count`/`length` (§8: `Iterator.count(iter, f)`, `Iterator.length`) are installed via
/// [`ITERATOR_FORWARDED`]; `chain`/`zip` take a variadic run of iterables directly.
fn install_iterator(interp: &mut Interpreter) {
    let id = new_namespace(interp, "Iterator");
    add_static(interp, id, "Iterator", "countInt", Arity::AtLeast(0), |interp, args, at| {
        let start = match super::arg(args, 0) {
            Value::Nil => 0,
            v => super::expect_int(interp, v, "Iterator", "countInt", at)?,
        };
        let step = match super::arg(args, 1) {
            Value::Nil => 1,
            v => super::expect_int(interp, v, "Iterator", "countInt", at)?,
        };
        super::alloc_iter(interp, IterState::CountInt { next: start, step }, at)
    });
    add_static(interp, id, "Iterator", "countFloat", Arity::AtLeast(0), |interp, args, at| {
        let step = match super::arg(args, 1) {
            Value::Nil => 1.0,
            other => super::expect_float(other, "Iterator", "countFloat", at)?,
        };
        match super::arg(args, 0) {
            Value::Nil => super::alloc_iter(
                interp,
                IterState::CountFloat { start_int: None, start_big: None, start_f: 0.0, step, n: 0, emitted_first: false },
                at,
            ),
            Value::Int(s) => super::alloc_iter(
                interp,
                IterState::CountFloat { start_int: Some(s), start_big: None, start_f: s as f64, step, n: 0, emitted_first: false },
                at,
            ),
            Value::Float(s) => super::alloc_iter(
                interp,
                IterState::CountFloat { start_int: None, start_big: None, start_f: s, step, n: 0, emitted_first: false },
                at,
            ),
            start @ Value::Ref(_) => {
                let big = super::expect_bigint(interp, start, "Iterator", "countFloat", at)?;
                super::alloc_iter(
                    interp,
                    IterState::CountFloat { start_int: None, start_big: Some(big), start_f: 0.0, step, n: 0, emitted_first: false },
                    at,
                )
            }
            _ => Err(LoxError::bad_argument("Iterator", "countFloat", "int, float, or bigint", at)),
        }
    });
    add_static(interp, id, "Iterator", "repeat", Arity::AtLeast(1), |interp, args, at| {
        let value = super::arg(args, 0);
        let remaining = match super::arg(args, 1) {
            Value::Nil => None,
            v => Some(super::expect_int(interp, v, "Iterator", "repeat", at)?.max(0) as u64),
        };
        super::alloc_iter(interp, IterState::Repeat { value, remaining }, at)
    });
    add_static(interp, id, "Iterator", "zeroes", Arity::Fixed(0), |interp, _args, at| {
        super::alloc_iter(interp, IterState::Zeroes, at)
    });
    add_static(interp, id, "Iterator", "urandom", Arity::Fixed(0), |interp, _args, at| {
        super::alloc_iter(interp, IterState::Urandom, at)
    });

    for &(static_name, target, arity) in ITERATOR_FORWARDED {
        add_static(interp, id, "Iterator", static_name, arity, move |interp, args, at| {
            forward_to_iterator_method(interp, static_name, target, args, at)
        });
    }
    add_static(interp, id, "Iterator", "chain", Arity::AtLeast(1), |interp, args, at| {
        let mut sources = Vec::with_capacity(args.len());
        for &a in args {
            sources.push(super::coerce_iter(interp, a, "Iterator", "chain", at)?);
        }
        super::alloc_iter(interp, IterState::Chain { sources, idx: 0 }, at)
    });
    add_static(interp, id, "Iterator", "zip", Arity::AtLeast(1), |interp, args, at| {
        let mut sources = Vec::with_capacity(args.len());
        for &a in args {
            sources.push(super::coerce_iter(interp, a, "Iterator", "zip", at)?);
        }
        super::alloc_iter(interp, IterState::Zip { sources }, at)
    });
}

fn install_pqueue(interp: &mut Interpreter) {
    let id = new_namespace(interp, "pqueue");
    add_static(interp, id, "pqueue", "new", Arity::AtLeast(0), |interp, args, at| {
        let reversed = matches!(super::arg(args, 0), Value::Bool(true));
        let allow_duplicates = matches!(super::arg(args, 1), Value::Bool(true));
        let builder = PriorityQueueBuilder { reversed, allow_duplicates };
        Ok(Value::Ref(interp.heap.allocate(HeapData::PriorityQueue(builder.build()), at)?))
    });
    add_static(interp, id, "pqueue", "builder", Arity::Fixed(0), |interp, _args, at| {
        Ok(Value::Ref(interp.heap.allocate(HeapData::PriorityQueueBuilder(PriorityQueueBuilder::default()), at)?))
    });
}

/// `Rand`: drawn from the interpreter's own `rng` field rather than reimplementing the
/// teacher's CPython-parity Mersenne Twister (`modules/random_mod.rs`) -- this stdlib
/// has no CPython-compatibility requirement, so the already-present `rand::RngCore`
/// source backing `Iterator.urandom` is reused directly.
fn install_rand(interp: &mut Interpreter) {
    let id = new_namespace(interp, "Rand");
    add_static(interp, id, "Rand", "int", Arity::Fixed(2), |interp, args, at| {
        let lo = super::expect_int(interp, super::arg(args, 0), "Rand", "int", at)?;
        let hi = super::expect_int(interp, super::arg(args, 1), "Rand", "int", at)?;
        if hi < lo {
            return Err(LoxError::runtime("Rand.int: upper bound must not be less than the lower bound.", at));
        }
        Ok(Value::Int(interp.rng.gen_range(lo..=hi)))
    });
    add_static(interp, id, "Rand", "float", Arity::Fixed(0), |interp, _args, _at| Ok(Value::Float(interp.rng.gen::<f64>())));
    add_static(interp, id, "Rand", "bool", Arity::Fixed(0), |interp, _args, _at| Ok(Value::Bool(interp.rng.gen::<bool>())));
    add_static(interp, id, "Rand", "choice", Arity::Fixed(1), |interp, args, at| {
        let list_id = super::expect_list(interp, super::arg(args, 0), "Rand", "choice", at)?;
        let len = { let HeapData::List(items) = interp.heap.get(list_id) else { unreachable!() }; items.len() };
        if len == 0 {
            return Err(LoxError::runtime("Cannot choose from an empty list.", at));
        }
        let idx = interp.rng.gen_range(0..len);
        let HeapData::List(items) = interp.heap.get(list_id) else { unreachable!() };
        Ok(items[idx])
    });
    add_static(interp, id, "Rand", "shuffle", Arity::Fixed(1), |interp, args, at| {
        let list_id = super::expect_list(interp, super::arg(args, 0), "Rand", "shuffle", at)?;
        let HeapData::List(items) = interp.heap.get_mut(list_id) else { unreachable!() };
        items.shuffle(&mut *interp.rng);
        Ok(Value::Nil)
    });
}

/// `os`: process environment, arguments, and a generic file-open (feature-independent;
/// `file`'s own method table lives in `builtins/host.rs`).
fn install_os(interp: &mut Interpreter) {
    let id = new_namespace(interp, "os");
    add_static(interp, id, "os", "args", Arity::Fixed(0), |interp, _args, at| {
        let argv: Vec<String> = std::env::args().skip(1).collect();
        let mut out = Vec::with_capacity(argv.len());
        for a in argv {
            out.push(super::alloc_str(interp, a, at)?);
        }
        super::alloc_list(interp, out, at)
    });
    add_static(interp, id, "os", "env", Arity::Fixed(1), |interp, args, at| {
        let key = super::expect_str(interp, super::arg(args, 0), "os", "env", at)?;
        match std::env::var(&*key) {
            Ok(v) => super::alloc_str(interp, v, at),
            Err(_) => Ok(Value::Nil),
        }
    });
    add_static(interp, id, "os", "cwd", Arity::Fixed(0), |interp, _args, at| {
        let cwd = std::env::current_dir().map_err(|e| LoxError::runtime(e.to_string(), at))?;
        super::alloc_str(interp, cwd.display().to_string(), at)
    });
    add_static(interp, id, "os", "exit", Arity::Fixed(1), |interp, args, at| {
        let code = super::expect_int(interp, super::arg(args, 0), "os", "exit", at)?;
        std::process::exit(code as i32)
    });
    add_static(interp, id, "os", "openFile", Arity::Fixed(2), |interp, args, at| {
        let path = super::expect_str(interp, super::arg(args, 0), "os", "openFile", at)?;
        let mode = super::expect_str(interp, super::arg(args, 1), "os", "openFile", at)?;
        let handle = match &*mode {
            "r" => FileHandle::open_read(&path),
            "w" => FileHandle::open_write(&path, false),
            "a" => FileHandle::open_write(&path, true),
            other => return Err(LoxError::runtime(format!("Unknown file mode: '{other}'."), at)),
        };
        let handle = handle.map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::File(handle)), at)?))
    });
}

fn install_html(interp: &mut Interpreter) {
    let id = new_namespace(interp, "HTML");
    add_static(interp, id, "HTML", "parse", Arity::Fixed(1), |interp, args, at| {
        let source = super::expect_str(interp, super::arg(args, 0), "HTML", "parse", at)?;
        let node = HtmlNode::parse(&source);
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::HtmlNode(node)), at)?))
    });
    add_static(interp, id, "HTML", "tokenizer", Arity::Fixed(1), |interp, args, at| {
        let source = super::expect_str(interp, super::arg(args, 0), "HTML", "tokenizer", at)?;
        let tok = HtmlTokenizer::new(&source);
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::HtmlTokenizer(tok)), at)?))
    });
}

fn install_process(interp: &mut Interpreter) {
    let id = new_namespace(interp, "process");
    add_static(interp, id, "process", "spawn", Arity::AtLeast(1), |interp, args, at| {
        let program = super::expect_str(interp, super::arg(args, 0), "process", "spawn", at)?;
        let mut argv = Vec::new();
        if args.len() > 1 {
            let list_id = super::expect_list(interp, super::arg(args, 1), "process", "spawn", at)?;
            let items = { let HeapData::List(items) = interp.heap.get(list_id) else { unreachable!() }; items.clone() };
            for item in items {
                argv.push(super::expect_str(interp, item, "process", "spawn", at)?.to_string());
            }
        }
        let handle = ProcessHandle::spawn(&program, &argv).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::Process(handle)), at)?))
    });
}

fn install_webbrowser(interp: &mut Interpreter) {
    let id = new_namespace(interp, "webbrowser");
    add_static(interp, id, "webbrowser", "open", Arity::Fixed(1), |interp, args, at| {
        let url = super::expect_str(interp, super::arg(args, 0), "webbrowser", "open", at)?;
        crate::stdlib::io::open_browser(&url).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Nil)
    });
}

fn install_uuid(interp: &mut Interpreter) {
    let id = new_namespace(interp, "UUID");
    add_static(interp, id, "UUID", "v4", Arity::Fixed(0), |interp, _args, at| {
        let u = uuid::Uuid::new_v4();
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::Uuid(u)), at)?))
    });
    add_static(interp, id, "UUID", "parse", Arity::Fixed(1), |interp, args, at| {
        let s = super::expect_str(interp, super::arg(args, 0), "UUID", "parse", at)?;
        let u = uuid::Uuid::parse_str(&s).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::Uuid(u)), at)?))
    });
}

fn install_date(interp: &mut Interpreter) {
    let id = new_namespace(interp, "date");
    add_static(interp, id, "date", "now", Arity::Fixed(0), |interp, _args, at| {
        Ok(Value::Ref(interp.heap.allocate(HeapData::Date(Date::now()), at)?))
    });
    add_static(interp, id, "date", "fromEpochMillis", Arity::Fixed(1), |interp, args, at| {
        let ms = super::expect_int(interp, super::arg(args, 0), "date", "fromEpochMillis", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Date(Date::from_epoch_millis(ms)), at)?))
    });
    add_static(interp, id, "date", "parse", Arity::Fixed(1), |interp, args, at| {
        let s = super::expect_str(interp, super::arg(args, 0), "date", "parse", at)?;
        let d = Date::parse_rfc3339(&s, at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Date(d), at)?))
    });
}

fn install_duration(interp: &mut Interpreter) {
    let id = new_namespace(interp, "Duration");
    add_static(interp, id, "Duration", "ofMillis", Arity::Fixed(1), |interp, args, at| {
        let ms = super::expect_int(interp, super::arg(args, 0), "Duration", "ofMillis", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Duration(Duration::from_millis(ms)), at)?))
    });
    add_static(interp, id, "Duration", "ofSeconds", Arity::Fixed(1), |interp, args, at| {
        let s = super::expect_float(super::arg(args, 0), "Duration", "ofSeconds", at)?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Duration(Duration::from_seconds(s)), at)?))
    });
}

fn install_stopwatch(interp: &mut Interpreter) {
    let id = new_namespace(interp, "Stopwatch");
    add_static(interp, id, "Stopwatch", "start", Arity::Fixed(0), |interp, _args, at| {
        Ok(Value::Ref(interp.heap.allocate(HeapData::Stopwatch(Stopwatch::new()), at)?))
    });
}

fn install_csv(interp: &mut Interpreter) {
    let id = new_namespace(interp, "csv");
    add_static(interp, id, "csv", "writer", Arity::Fixed(1), |interp, args, at| {
        let path = super::expect_str(interp, super::arg(args, 0), "csv", "writer", at)?;
        let writer = CsvWriter::create(&path).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::CsvWriter(writer)), at)?))
    });
}

/// `deque`/`queue`/`ring` (§3) share one backing structure (`types::containers::Deque`);
/// only their static constructors differ, by which `DequeKind` they stamp in.
fn install_deque_family(interp: &mut Interpreter) {
    install_deque_kind(interp, "deque", DequeKind::Deque);
    install_deque_kind(interp, "queue", DequeKind::Queue);
    install_deque_kind(interp, "ring", DequeKind::Ring);
}

fn install_deque_kind(interp: &mut Interpreter, name: &'static str, kind: DequeKind) {
    let id = new_namespace(interp, name);
    add_static(interp, id, name, "new", Arity::AtLeast(0), move |interp, args, at| {
        let max_len = match super::arg(args, 0) {
            Value::Nil => None,
            v => Some(super::expect_int(interp, v, name, "new", at)?.max(0) as usize),
        };
        Ok(Value::Ref(interp.heap.allocate(HeapData::Deque(Deque::new_kind(max_len, kind)), at)?))
    });
}

/// `range`/`bigrange` (§3 `range`): plain global functions, not namespace statics,
/// since §3's examples call them directly (`range(0)`, `bigrange(0, 10, 3)`). Both
/// accept 1-3 args as `(stop)`, `(start, stop)`, or `(start, stop, step)`, mirroring the
/// conventional range-constructor overload shape used throughout the other example
/// repos' iteration helpers; `bigrange` always builds the `BigInt`-backed
/// representation so its bounds can exceed `i64`, while `range` stays on the cheaper
/// machine-int path (§3 leaves the two as separate constructors rather than having
/// `range` auto-promote on overflow).
fn install_range(interp: &mut Interpreter) {
    define_global_fn(interp, "range", "range", Arity::AtLeast(1), |interp, args, at| {
        let (start, stop, step) = match args.len() {
            1 => (0, super::expect_int(interp, super::arg(args, 0), "range", "range", at)?, 1),
            2 => (
                super::expect_int(interp, super::arg(args, 0), "range", "range", at)?,
                super::expect_int(interp, super::arg(args, 1), "range", "range", at)?,
                1,
            ),
            3 => (
                super::expect_int(interp, super::arg(args, 0), "range", "range", at)?,
                super::expect_int(interp, super::arg(args, 1), "range", "range", at)?,
                super::expect_int(interp, super::arg(args, 2), "range", "range", at)?,
            ),
            n => return Err(LoxError::runtime(format!("range() takes 1 to 3 arguments, got {n}."), at)),
        };
        if step == 0 {
            return Err(LoxError::bad_argument("range", "range", "non-zero step", at));
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Range(Range::new(start, stop, step)), at)?))
    });
    define_global_fn(interp, "bigrange", "bigrange", Arity::AtLeast(1), |interp, args, at| {
        let zero = num_bigint::BigInt::from(0);
        let one = num_bigint::BigInt::from(1);
        let (start, stop, step) = match args.len() {
            1 => (zero, super::expect_bigint(interp, super::arg(args, 0), "bigrange", "bigrange", at)?, one),
            2 => (
                super::expect_bigint(interp, super::arg(args, 0), "bigrange", "bigrange", at)?,
                super::expect_bigint(interp, super::arg(args, 1), "bigrange", "bigrange", at)?,
                one,
            ),
            3 => (
                super::expect_bigint(interp, super::arg(args, 0), "bigrange", "bigrange", at)?,
                super::expect_bigint(interp, super::arg(args, 1), "bigrange", "bigrange", at)?,
                super::expect_bigint(interp, super::arg(args, 2), "bigrange", "bigrange", at)?,
            ),
            n => return Err(LoxError::runtime(format!("bigrange() takes 1 to 3 arguments, got {n}."), at)),
        };
        if step == num_bigint::BigInt::from(0) {
            return Err(LoxError::bad_argument("bigrange", "bigrange", "non-zero step", at));
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Range(Range::new_big(start, stop, step)), at)?))
    });
}

/// `set` has no literal syntax (unlike `[...]`/`{...}` for list/dict), so -- like
/// `range`/`bigrange` above -- it gets a bare global constructor rather than a
/// namespace class: `set()` for empty, `set(a, b, ...)` seeded with its arguments,
/// later ones overwriting earlier equal ones the same way repeated `set.add` calls do.
fn install_set_ctor(interp: &mut Interpreter) {
    define_global_fn(interp, "set", "set", Arity::AtLeast(0), |interp, args, at| {
        let mut out = crate::types::containers::LoxSet::new();
        for value in args {
            out.add(value.clone(), &interp.heap, at)?;
        }
        Ok(Value::Ref(interp.heap.allocate(HeapData::Set(out), at)?))
    });
}

#[cfg(feature = "net")]
fn install_net(interp: &mut Interpreter) {
    let url_id = new_namespace(interp, "url");
    add_static(interp, url_id, "url", "parse", Arity::Fixed(1), |interp, args, at| {
        let s = super::expect_str(interp, super::arg(args, 0), "url", "parse", at)?;
        match UrlValues::parse(&s) {
            Some(u) => Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::UrlValues(u)), at)?)),
            None => Err(LoxError::runtime(format!("Invalid URL query string: '{s}'."), at)),
        }
    });

    let conn_id = new_namespace(interp, "connection");
    add_static(interp, conn_id, "connection", "connect", Arity::Fixed(2), |interp, args, at| {
        let host = super::expect_str(interp, super::arg(args, 0), "connection", "connect", at)?;
        let port = super::expect_int(interp, super::arg(args, 1), "connection", "connect", at)?;
        let port = u16::try_from(port).map_err(|_| LoxError::bad_argument("connection", "connect", "port in 0..65535", at))?;
        let conn = Connection::connect(&host, port).map_err(|e| LoxError::runtime(e.to_string(), at))?;
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::Connection(conn)), at)?))
    });
}

#[cfg(feature = "crypto")]
fn install_crypto(interp: &mut Interpreter) {
    let id = new_namespace(interp, "age");
    add_static(interp, id, "age", "symmetric", Arity::Fixed(1), |interp, args, at| {
        let passphrase = super::expect_str(interp, super::arg(args, 0), "age", "symmetric", at)?;
        let a = AgeSymmetric::new(passphrase.to_string());
        Ok(Value::Ref(interp.heap.allocate(HeapData::Host(HostObject::AgeSymmetric(a)), at)?))
    });
}
