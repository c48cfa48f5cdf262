//! Host-backed leaf types (§3, §6): the built-in integration layer.
//!
//! Grounded on the teacher's adapter style (a thin wrapper struct per host concept,
//! each with an explicit close/validity bit rather than relying on `Drop` to surface
//! errors) and, for the Cargo-feature gating, on the sibling example repo
//! `navicore-cem3`'s runtime crate (`crypto`/`net`/`compression` features gating the
//! matching dependency families). [`HostObject`] is the single enum every such value
//! funnels through, mirroring how [`crate::heap::HeapData`] funnels every *in-language*
//! heap value -- this is the "everything else" tier for values whose only internal
//! invariant is "the wrapped handle is valid until explicitly closed" (§3).

pub mod html;
pub mod io;
#[cfg(feature = "crypto")]
pub mod crypto;
#[cfg(feature = "net")]
pub mod net;

use uuid::Uuid;

use self::html::{HtmlNode, HtmlTokenizer};
use self::io::{CsvWriter, FileHandle, ProcessHandle, ProcessResult};

#[derive(Debug)]
pub enum HostObject {
    Uuid(Uuid),
    HtmlNode(HtmlNode),
    HtmlTokenizer(HtmlTokenizer),
    File(FileHandle),
    Process(ProcessHandle),
    ProcessResult(ProcessResult),
    CsvWriter(CsvWriter),
    #[cfg(feature = "net")]
    UrlValues(net::UrlValues),
    #[cfg(feature = "net")]
    Connection(net::Connection),
    #[cfg(feature = "crypto")]
    AgeSymmetric(crypto::AgeSymmetric),
}

impl HostObject {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Uuid(_) => "uuid",
            Self::HtmlNode(_) => "htmlNode",
            Self::HtmlTokenizer(_) => "htmlTokenizer",
            Self::File(_) => "file",
            Self::Process(_) => "process",
            Self::ProcessResult(_) => "processResult",
            Self::CsvWriter(_) => "csvWriter",
            #[cfg(feature = "net")]
            Self::UrlValues(_) => "urlValues",
            #[cfg(feature = "net")]
            Self::Connection(_) => "connection",
            #[cfg(feature = "crypto")]
            Self::AgeSymmetric(_) => "ageSymmetric",
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Uuid(u) => u.to_string(),
            Self::HtmlNode(n) => format!("<htmlNode {}>", n.tag),
            Self::HtmlTokenizer(_) => "<htmlTokenizer>".to_owned(),
            Self::File(f) => format!("<file {} {}>", f.path, if f.closed { "closed" } else { "open" }),
            Self::Process(p) => format!("<process pid={}>", p.pid),
            Self::ProcessResult(r) => format!("<processResult status={}>", r.status),
            Self::CsvWriter(_) => "<csvWriter>".to_owned(),
            #[cfg(feature = "net")]
            Self::UrlValues(u) => u.display(),
            #[cfg(feature = "net")]
            Self::Connection(c) => format!("<connection {} {}>", c.addr, if c.closed { "closed" } else { "open" }),
            #[cfg(feature = "crypto")]
            Self::AgeSymmetric(_) => "<ageSymmetric>".to_owned(),
        }
    }
}
