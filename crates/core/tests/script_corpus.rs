//! Golden-script corpus (§8): every `tests/scripts/*.lox` file is run to completion and
//! its printed output compared against the `.expected` sibling file of the same stem.
//!
//! Grounded on the teacher's `datatest-stable` harness declaration in its own
//! `Cargo.toml` (`[[test]] name = "datatest_runner" harness = false`); `datatest-stable`
//! drives discovery and per-file reporting, so adding a scenario is just dropping a new
//! `.lox`/`.expected` pair in `tests/scripts/` rather than writing a new `#[test]` fn.

use std::fs;
use std::path::Path;

#[path = "support/mod.rs"]
mod support;

fn run_one(path: &Path) -> datatest_stable::Result<()> {
    let source = fs::read_to_string(path)?;
    let expected_path = path.with_extension("expected");
    let expected = fs::read_to_string(&expected_path).map_err(|e| {
        format!("missing expected-output file {}: {e}", expected_path.display())
    })?;

    let (lines, result) = support::run(&source);
    if let Err(e) = result {
        return Err(format!("{} raised {}: {}", path.display(), e.kind, e.message).into());
    }

    let actual = lines.join("\n");
    if actual.trim_end() != expected.trim_end() {
        return Err(format!(
            "{} printed unexpected output:\n--- expected ---\n{}\n--- actual ---\n{}",
            path.display(),
            expected.trim_end(),
            actual.trim_end(),
        )
        .into());
    }
    Ok(())
}

datatest_stable::harness!(run_one, "tests/scripts", r"^.*\.lox$");
