//! HTML tokenization and a minimal node tree (§3 `html-node`, `html-tokenizer`).
//!
//! Hand-rolled: nothing in the retrieval pack pulls in a full HTML parser (`html5ever`
//! et al. are heavyweight and absent from every example repo's dependency table), so
//! this follows the teacher's "thin adapter" pattern instead -- a small hand-written
//! tokenizer producing a flat tag/text event stream, good enough for scripting-language
//! scraping use cases without pulling in a browser-grade parser.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    StartTag { name: String, attrs: Vec<(String, String)>, self_closing: bool },
    EndTag { name: String },
    Text(String),
    Comment(String),
}

/// Scans an HTML source string into a flat token stream, one token at a time.
#[derive(Debug)]
pub struct HtmlTokenizer {
    source: Vec<char>,
    pos: usize,
}

impl HtmlTokenizer {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self { source: source.chars().collect(), pos: 0 }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pos < self.source.len()
    }

    pub fn next_token(&mut self) -> Option<HtmlToken> {
        if !self.has_next() {
            return None;
        }
        if self.peek() == Some('<') {
            self.tokenize_tag()
        } else {
            self.tokenize_text()
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn tokenize_text(&mut self) -> Option<HtmlToken> {
        let start = self.pos;
        while self.has_next() && self.peek() != Some('<') {
            self.pos += 1;
        }
        let text: String = self.source[start..self.pos].iter().collect();
        Some(HtmlToken::Text(text))
    }

    fn tokenize_tag(&mut self) -> Option<HtmlToken> {
        self.pos += 1; // consume '<'
        if self.source[self.pos..].starts_with(&['!', '-', '-']) {
            self.pos += 3;
            let start = self.pos;
            while self.has_next() && !self.source[self.pos..].starts_with(&['-', '-', '>']) {
                self.pos += 1;
            }
            let comment: String = self.source[start..self.pos].iter().collect();
            self.pos = (self.pos + 3).min(self.source.len());
            return Some(HtmlToken::Comment(comment));
        }
        let closing = self.peek() == Some('/');
        if closing {
            self.pos += 1;
        }
        let name_start = self.pos;
        while self.has_next() && !matches!(self.peek(), Some(' ' | '\t' | '\n' | '>' | '/')) {
            self.pos += 1;
        }
        let name: String = self.source[name_start..self.pos].iter().collect::<String>().to_lowercase();
        if closing {
            self.skip_to_close();
            return Some(HtmlToken::EndTag { name });
        }
        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('/') => {
                    self_closing = true;
                    self.pos += 1;
                }
                Some(_) => {
                    if let Some(attr) = self.read_attr() {
                        attrs.push(attr);
                    } else {
                        break;
                    }
                }
            }
        }
        Some(HtmlToken::StartTag { name, attrs, self_closing })
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_to_close(&mut self) {
        while self.has_next() && self.peek() != Some('>') {
            self.pos += 1;
        }
        if self.has_next() {
            self.pos += 1;
        }
    }

    fn read_attr(&mut self) -> Option<(String, String)> {
        let key_start = self.pos;
        while self.has_next() && !matches!(self.peek(), Some('=' | ' ' | '>' | '/')) {
            self.pos += 1;
        }
        let key: String = self.source[key_start..self.pos].iter().collect();
        if key.is_empty() {
            return None;
        }
        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Some((key, String::new()));
        }
        self.pos += 1;
        self.skip_whitespace();
        let quote = self.peek();
        let value = if quote == Some('"') || quote == Some('\'') {
            self.pos += 1;
            let start = self.pos;
            while self.has_next() && self.peek() != quote {
                self.pos += 1;
            }
            let v: String = self.source[start..self.pos].iter().collect();
            self.pos += 1;
            v
        } else {
            let start = self.pos;
            while self.has_next() && !matches!(self.peek(), Some(' ' | '>')) {
                self.pos += 1;
            }
            self.source[start..self.pos].iter().collect()
        };
        Some((key, value))
    }
}

/// A minimal DOM-ish node built from a token stream: tag name, attributes, children
/// (either text or nested nodes). Built eagerly by the stdlib's `HTML.parse`.
#[derive(Debug, Clone)]
pub struct HtmlNode {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<HtmlChild>,
}

#[derive(Debug, Clone)]
pub enum HtmlChild {
    Text(String),
    Element(Box<HtmlNode>),
}

impl HtmlNode {
    /// Parses a full document into a synthetic root node containing every top-level
    /// element and text run, via simple stack-based tag matching (no error recovery --
    /// out of scope per §4.12).
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut tokenizer = HtmlTokenizer::new(source);
        let mut stack: Vec<HtmlNode> = vec![HtmlNode { tag: "#root".to_owned(), attrs: Vec::new(), children: Vec::new() }];
        while let Some(tok) = tokenizer.next_token() {
            match tok {
                HtmlToken::Text(t) => {
                    if !t.trim().is_empty() {
                        stack.last_mut().unwrap().children.push(HtmlChild::Text(t));
                    }
                }
                HtmlToken::Comment(_) => {}
                HtmlToken::StartTag { name, attrs, self_closing } => {
                    let node = HtmlNode { tag: name, attrs, children: Vec::new() };
                    if self_closing || is_void_element(&node.tag) {
                        stack.last_mut().unwrap().children.push(HtmlChild::Element(Box::new(node)));
                    } else {
                        stack.push(node);
                    }
                }
                HtmlToken::EndTag { name } => {
                    if let Some(pos) = stack.iter().rposition(|n| n.tag == name) {
                        while stack.len() > pos + 1 {
                            let child = stack.pop().unwrap();
                            stack.last_mut().unwrap().children.push(HtmlChild::Element(Box::new(child)));
                        }
                        let closed = stack.pop().unwrap();
                        stack.last_mut().unwrap().children.push(HtmlChild::Element(Box::new(closed)));
                    }
                }
            }
        }
        while stack.len() > 1 {
            let child = stack.pop().unwrap();
            stack.last_mut().unwrap().children.push(HtmlChild::Element(Box::new(child)));
        }
        stack.pop().unwrap()
    }

    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                HtmlChild::Text(t) => out.push_str(t),
                HtmlChild::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v.as_str())
    }

    /// Depth-first search for every descendant element with the given tag name.
    #[must_use]
    pub fn find_all(&self, tag: &str) -> Vec<&HtmlNode> {
        let mut out = Vec::new();
        for child in &self.children {
            if let HtmlChild::Element(e) = child {
                if e.tag == tag {
                    out.push(e.as_ref());
                }
                out.extend(e.find_all(tag));
            }
        }
        out
    }
}

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "param" | "source" | "track" | "wbr"
    )
}
