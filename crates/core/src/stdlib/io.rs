//! File, process and CSV-writer adapters (§3 `file`, `process`, `process-result`,
//! `csv-writer`), plus a webbrowser-launch helper for the `webbrowser` built-in class.
//!
//! `csv` and `webbrowser` crates appear in neither the teacher nor any sibling example
//! repo's dependency table, so per the "never fabricate dependencies" rule these are
//! hand-rolled: a small RFC4180-ish writer over `std::io::Write`, and a
//! `std::process::Command` dispatch table keyed by platform, mirroring how the
//! `webbrowser` crate itself shells out under the hood.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::{Child, Command, Stdio};

/// A host file handle. `closed` tracks the "operation on a closed resource fails"
/// contract (§4, §4.8); double-close is a no-op.
#[derive(Debug)]
pub struct FileHandle {
    pub path: String,
    pub file: Option<File>,
    pub closed: bool,
}

impl FileHandle {
    pub fn open_read(path: &str) -> std::io::Result<Self> {
        Ok(Self { path: path.to_owned(), file: Some(File::open(path)?), closed: false })
    }

    pub fn open_write(path: &str, append: bool) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new().create(true).write(true).append(append).truncate(!append).open(path)?;
        Ok(Self { path: path.to_owned(), file: Some(file), closed: false })
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.file = None;
            self.closed = true;
        }
    }
}

/// A spawned child process, observed through `wait`/`kill` (§3 `process`).
#[derive(Debug)]
pub struct ProcessHandle {
    pub pid: u32,
    pub child: Option<Child>,
    pub closed: bool,
}

impl ProcessHandle {
    pub fn spawn(program: &str, args: &[String]) -> std::io::Result<Self> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        Ok(Self { pid: child.id(), child: Some(child), closed: false })
    }

    pub fn wait(&mut self) -> std::io::Result<ProcessResult> {
        let Some(child) = self.child.take() else {
            return Ok(ProcessResult { status: -1, stdout: String::new(), stderr: String::new() });
        };
        let output = child.wait_with_output()?;
        self.closed = true;
        Ok(ProcessResult {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Immutable snapshot of a finished process's outcome (§3 `process-result`).
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A buffered RFC4180-style CSV writer: fields containing a comma, quote, or newline
/// are quoted, with embedded quotes doubled. Must be flushed before close (§5).
#[derive(Debug)]
pub struct CsvWriter {
    inner: BufWriter<File>,
    closed: bool,
}

impl CsvWriter {
    pub fn create(path: &str) -> std::io::Result<Self> {
        Ok(Self { inner: BufWriter::new(File::create(path)?), closed: false })
    }

    pub fn write_row(&mut self, fields: &[String]) -> std::io::Result<()> {
        let mut line = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&quote_field(field));
        }
        line.push_str("\r\n");
        self.inner.write_all(line.as_bytes())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    pub fn close(&mut self) -> std::io::Result<()> {
        if !self.closed {
            self.flush()?;
            self.closed = true;
        }
        Ok(())
    }
}

fn quote_field(field: &str) -> String {
    let needs_quotes = field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r');
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// Launches the system's default browser on `url`, the way the `webbrowser` crate
/// dispatches internally -- `xdg-open` on Linux, `open` on macOS, `cmd /C start` on
/// Windows -- without depending on that crate.
pub fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd").args(["/C", "start", url]).spawn()?;
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Command::new("xdg-open").arg(url).spawn()?;
    }
    Ok(())
}
