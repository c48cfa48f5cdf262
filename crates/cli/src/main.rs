//! `lox`: run a script file non-interactively, or start a line-by-line REPL.
//!
//! Mirrors the teacher's `ouros-repl`/`ouros-cli` split: this binary is a thin leaf
//! binding over `loxide_core`'s public API, not a new protocol surface (§4.12).

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use loxide_core::{
    tracer::{NoopTracer, ProfilingTracer, StderrTracer, Tracer},
    Interpreter, LimitedTracker, NoLimitTracker, ResourceLimits, ResourceTracker, StdPrint,
};

/// An embeddable interpreter for a dynamically typed, class-based scripting language.
#[derive(Parser, Debug)]
#[command(name = "lox", version, about)]
struct Cli {
    /// Script file to run. Omit to start an interactive prompt.
    script: Option<String>,

    /// Maximum call-stack recursion depth. Unset means no limit.
    #[arg(long)]
    max_recursion_depth: Option<usize>,

    /// Maximum live heap bytes. Unset means no limit.
    #[arg(long)]
    max_heap_bytes: Option<usize>,

    /// Print a line to stderr for every call enter/exit and property access.
    #[arg(long)]
    trace: bool,

    /// Print per-callable invocation counts and max call depth after the run.
    #[arg(long)]
    profile: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracker: Box<dyn ResourceTracker> = match (cli.max_recursion_depth, cli.max_heap_bytes) {
        (None, None) => Box::new(NoLimitTracker),
        (depth, bytes) => {
            let mut limits = ResourceLimits::default();
            if let Some(depth) = depth {
                limits.max_recursion_depth = depth;
            }
            if let Some(bytes) = bytes {
                limits.max_heap_bytes = bytes;
            }
            Box::new(LimitedTracker::new(limits))
        }
    };
    let tracer: Box<dyn Tracer> = if cli.trace {
        Box::new(StderrTracer::default())
    } else if cli.profile {
        Box::new(ProfilingTracer::default())
    } else {
        Box::new(NoopTracer)
    };
    let profiling = cli.profile;

    let mut interp = Interpreter::with_parts(tracker, tracer, Box::new(StdPrint));

    let code = match cli.script {
        Some(path) => run_file(&mut interp, &path),
        None => run_repl(&mut interp),
    };

    if profiling {
        eprintln!("{}", interp.tracer.summary());
    }

    code
}

fn run_file(interp: &mut Interpreter, path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("error reading {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    match interp.run(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {err}", err.kind);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(interp: &mut Interpreter) -> ExitCode {
    let mut source = String::new();
    loop {
        let prompt = if source.is_empty() { ">>> " } else { "... " };
        let Some(line) = read_line(prompt) else {
            println!();
            break;
        };

        if source.is_empty() && line.trim().is_empty() {
            continue;
        }

        if !source.is_empty() {
            source.push('\n');
        }
        source.push_str(&line);

        if needs_more_input(&source) {
            continue;
        }

        if let Err(err) = interp.run(&source) {
            eprintln!("{}: {err}", err.kind);
        }
        source.clear();
    }
    ExitCode::SUCCESS
}

/// Heuristic multiline detector: keep prompting while brace/paren/bracket nesting is
/// unbalanced, mirroring the teacher's REPL brace-depth check.
fn needs_more_input(source: &str) -> bool {
    let trimmed = source.trim_end();
    if trimmed.ends_with('\\') {
        return true;
    }
    let mut balance = 0i32;
    for ch in trimmed.chars() {
        match ch {
            '(' | '[' | '{' => balance += 1,
            ')' | ']' | '}' => balance -= 1,
            _ => {}
        }
    }
    balance > 0
}

/// Reads one line from stdin after printing a prompt. Returns `None` on EOF (Ctrl+D).
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    if io::stdout().flush().is_err() {
        return None;
    }
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input).ok()?;
    if read == 0 {
        return None;
    }
    Some(input.trim_end_matches(['\r', '\n']).to_owned())
}
