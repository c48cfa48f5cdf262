//! URL-values map and TCP connection wrapper (§3 `url-values`, `connection`),
//! gated behind the `net` feature (§6 Cargo feature flags).

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use indexmap::IndexMap;
use url::Url;

/// A mutable multi-valued query-parameter map, seeded from a parsed `Url` and
/// re-serializable back to a query string -- the language's `url-values` type.
#[derive(Debug, Default)]
pub struct UrlValues {
    entries: IndexMap<String, Vec<String>>,
}

impl UrlValues {
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let mut entries: IndexMap<String, Vec<String>> = IndexMap::new();
        for (k, v) in parsed.query_pairs() {
            entries.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        Some(Self { entries })
    }

    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add(&mut self, key: String, value: String) {
        self.entries.entry(key).or_default().push(value);
    }

    pub fn set(&mut self, key: String, value: String) {
        self.entries.insert(key, vec![value]);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn display(&self) -> String {
        let mut out = String::new();
        for (k, vs) in &self.entries {
            for v in vs {
                if !out.is_empty() {
                    out.push('&');
                }
                out.push_str(&format!("{k}={v}"));
            }
        }
        format!("<urlValues {out}>")
    }
}

/// A blocking TCP connection wrapper. `deadline` backs the `setReadDeadline`/
/// `setWriteDeadline` methods named in §5 Cancellation and timeouts.
#[derive(Debug)]
pub struct Connection {
    pub addr: String,
    stream: Option<TcpStream>,
    pub closed: bool,
}

impl Connection {
    pub fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        Ok(Self { addr: format!("{host}:{port}"), stream: Some(stream), closed: false })
    }

    pub fn set_deadline(&mut self, millis: u64) -> std::io::Result<()> {
        if let Some(stream) = &self.stream {
            let dur = if millis == 0 { None } else { Some(Duration::from_millis(millis)) };
            stream.set_read_timeout(dur)?;
            stream.set_write_timeout(dur)?;
        }
        Ok(())
    }

    pub fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.stream.as_mut().map_or(Ok(()), |s| s.write_all(data))
    }

    pub fn read_to_end(&mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(s) = &mut self.stream {
            s.read_to_end(&mut buf)?;
        }
        Ok(buf)
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.stream = None;
            self.closed = true;
        }
    }
}
