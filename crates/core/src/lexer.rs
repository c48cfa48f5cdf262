//! Hand-written scanner (§4.12).
//!
//! Produces a flat token stream for [`crate::parser::Parser`]. Grammar/error-recovery
//! strategy are explicitly not a contractual surface (§1 Out of scope) -- this exists so
//! the crate is buildable and testable end to end, not as a documented language grammar.

use crate::error::{CodeLoc, LoxError, RunResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String, char),
    Ident(String),

    // Keywords
    And,
    Break,
    Class,
    Continue,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Percent,
    Colon,

    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub at: CodeLoc,
}

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), pos: 0, line: 1, col: 1 }
    }

    pub fn tokenize(mut self) -> RunResult<Vec<Token>> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia();
            let at = self.loc();
            let Some(c) = self.advance() else {
                out.push(Token { kind: TokenKind::Eof, at });
                break;
            };
            let kind = match c {
                b'(' => TokenKind::LeftParen,
                b')' => TokenKind::RightParen,
                b'{' => TokenKind::LeftBrace,
                b'}' => TokenKind::RightBrace,
                b'[' => TokenKind::LeftBracket,
                b']' => TokenKind::RightBracket,
                b',' => TokenKind::Comma,
                b'.' => TokenKind::Dot,
                b'-' => TokenKind::Minus,
                b'+' => TokenKind::Plus,
                b';' => TokenKind::Semicolon,
                b'*' => TokenKind::Star,
                b'%' => TokenKind::Percent,
                b':' => TokenKind::Colon,
                b'/' => TokenKind::Slash,
                b'!' => {
                    if self.matches(b'=') {
                        TokenKind::BangEqual
                    } else {
                        TokenKind::Bang
                    }
                }
                b'=' => {
                    if self.matches(b'=') {
                        TokenKind::EqualEqual
                    } else {
                        TokenKind::Equal
                    }
                }
                b'<' => {
                    if self.matches(b'=') {
                        TokenKind::LessEqual
                    } else {
                        TokenKind::Less
                    }
                }
                b'>' => {
                    if self.matches(b'=') {
                        TokenKind::GreaterEqual
                    } else {
                        TokenKind::Greater
                    }
                }
                b'"' | b'\'' => self.string(c as char, at)?,
                b'0'..=b'9' => self.number(),
                c if c == b'_' || c.is_ascii_alphabetic() => self.ident(),
                other => {
                    return Err(LoxError::syntax(format!("Unexpected character '{}'.", other as char), at));
                }
            };
            out.push(Token { kind, at });
        }
        Ok(out)
    }

    fn loc(&self) -> CodeLoc {
        CodeLoc::new(self.line, self.col)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_next() == Some(b'/') => {
                    while self.peek().is_some_and(|c| c != b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn string(&mut self, quote: char, start: CodeLoc) -> RunResult<TokenKind> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(LoxError::syntax("Unterminated string.", start)),
                Some(c) if c as char == quote => break,
                Some(b'\\') => match self.advance() {
                    Some(b'n') => s.push('\n'),
                    Some(b't') => s.push('\t'),
                    Some(b'r') => s.push('\r'),
                    Some(b'\\') => s.push('\\'),
                    Some(c) if c as char == quote => s.push(quote),
                    Some(other) => s.push(other as char),
                    None => return Err(LoxError::syntax("Unterminated string.", start)),
                },
                Some(c) => s.push(c as char),
            }
        }
        Ok(TokenKind::Str(s, quote))
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos - 1;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        if is_float {
            TokenKind::Float(text.parse().unwrap_or(0.0))
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => TokenKind::Float(text.parse().unwrap_or(0.0)),
            }
        }
    }

    fn ident(&mut self) -> TokenKind {
        let start = self.pos - 1;
        while self.peek().is_some_and(|c| c == b'_' || c.is_ascii_alphanumeric()) {
            self.advance();
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        match text {
            "and" => TokenKind::And,
            "break" => TokenKind::Break,
            "class" => TokenKind::Class,
            "continue" => TokenKind::Continue,
            "else" => TokenKind::Else,
            "false" => TokenKind::False,
            "for" => TokenKind::For,
            "fun" => TokenKind::Fun,
            "if" => TokenKind::If,
            "nil" => TokenKind::Nil,
            "or" => TokenKind::Or,
            "print" => TokenKind::Print,
            "return" => TokenKind::Return,
            "super" => TokenKind::Super,
            "this" => TokenKind::This,
            "true" => TokenKind::True,
            "var" => TokenKind::Var,
            "while" => TokenKind::While,
            _ => TokenKind::Ident(text.to_owned()),
        }
    }
}
