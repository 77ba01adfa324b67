// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The tokenizer state machine.
//!
//! The scanner walks the source a character at a time, tracking bracket depth
//! (newlines inside brackets are non-logical), block indentation (INDENT on
//! increase, zero-width DEDENT on decrease), and logical-line state (a line
//! that carried code ends with a logical newline, others with `Nl`).
//! Everything not claimed by a coding token — whitespace, comments, escaped
//! newlines — is emitted as its own token so the stream stays invertible.

use std::cmp::Ordering;

use memchr::memchr2;
use thiserror::Error;

use crate::{Offset, Token, TokenKind};

/// A tokenization failure. Any of these means the text is not valid Python,
/// so callers treat it the same as a parse error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: i32 },

    #[error("unexpected character {ch:?} at line {line}, column {col}")]
    UnexpectedChar { ch: char, line: i32, col: i32 },

    #[error("unindent does not match an outer indentation level at line {line}")]
    InconsistentDedent { line: i32 },
}

/// Tokenize `src` into a lossless token list.
///
/// The final two tokens are a zero-width logical newline (when the input does
/// not already end one) and a zero-width [`TokenKind::EndMarker`], mirroring
/// the stream shape Python's own tokenizer produces.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    Scanner::new(src).run()
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: i32,
    line_start: usize,
    depth: usize,
    indents: Vec<usize>,
    had_code: bool,
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Scanner {
            src,
            pos: 0,
            line: 1,
            line_start: 0,
            depth: 0,
            indents: vec![0],
            had_code: false,
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    fn offset(&self) -> Offset {
        Offset::new(self.line, (self.pos - self.line_start) as i32)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn emit(&mut self, kind: TokenKind, start: usize, offset: Offset) {
        self.tokens
            .push(Token::new(kind, &self.src[start..self.pos], offset));
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while self.pos < self.src.len() {
            if self.at_line_start {
                self.line_prefix()?;
                if self.pos >= self.src.len() {
                    break;
                }
            }
            self.next_token()?;
        }
        if self.had_code && self.depth == 0 {
            let offset = self.offset();
            self.tokens
                .push(Token::new(TokenKind::Newline, "", offset));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            let offset = self.offset();
            self.tokens.push(Token::new(TokenKind::Dedent, "", offset));
        }
        let offset = self.offset();
        self.tokens
            .push(Token::new(TokenKind::EndMarker, "", offset));
        Ok(self.tokens)
    }

    /// Handle the whitespace prefix of a physical line: indentation
    /// bookkeeping on logical lines, a plain whitespace token elsewhere.
    fn line_prefix(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let offset = self.offset();
        while matches!(self.peek(), Some(' ' | '\t' | '\x0c' | '\u{feff}')) {
            self.bump();
        }
        let ws = &self.src[start..self.pos];

        match self.peek() {
            // Blank or comment-only line: no indentation processing; the
            // main scanner emits the comment/Nl next.
            None | Some('\n' | '\r' | '#') => {
                if !ws.is_empty() {
                    self.emit(TokenKind::UnimportantWs, start, offset);
                }
                self.at_line_start = false;
                return Ok(());
            }
            Some('\\') if matches!(self.peek_at(1), Some(b'\n' | b'\r')) => {
                if !ws.is_empty() {
                    self.emit(TokenKind::UnimportantWs, start, offset);
                }
                self.at_line_start = false;
                return Ok(());
            }
            _ => {}
        }

        if self.depth > 0 {
            // Continuation line inside brackets: never an indent change.
            if !ws.is_empty() {
                self.emit(TokenKind::UnimportantWs, start, offset);
            }
            self.at_line_start = false;
            return Ok(());
        }

        let width = indent_width(ws);
        let top = *self.indents.last().unwrap_or(&0);
        match width.cmp(&top) {
            Ordering::Greater => {
                self.indents.push(width);
                self.emit(TokenKind::Indent, start, offset);
            }
            Ordering::Less => {
                // The whitespace precedes the zero-width dedent markers,
                // which sit at the first coding token of the line.
                if !ws.is_empty() {
                    self.emit(TokenKind::UnimportantWs, start, offset);
                }
                let dedent_offset = self.offset();
                while self.indents.last().is_some_and(|&w| w > width) {
                    self.indents.pop();
                    self.tokens
                        .push(Token::new(TokenKind::Dedent, "", dedent_offset));
                }
                if *self.indents.last().unwrap_or(&0) != width {
                    return Err(LexError::InconsistentDedent { line: self.line });
                }
            }
            Ordering::Equal => {
                if !ws.is_empty() {
                    self.emit(TokenKind::UnimportantWs, start, offset);
                }
            }
        }
        self.at_line_start = false;
        Ok(())
    }

    fn next_token(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let offset = self.offset();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(()),
        };
        match c {
            ' ' | '\t' | '\x0c' => {
                while matches!(self.peek(), Some(' ' | '\t' | '\x0c')) {
                    self.bump();
                }
                self.emit(TokenKind::UnimportantWs, start, offset);
            }
            '#' => {
                // memchr finds the physical end of line; \r is only a line
                // ending when followed by \n or at end of line on its own.
                let rest = &self.src.as_bytes()[self.pos..];
                let end = memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
                self.pos += end;
                self.emit(TokenKind::Comment, start, offset);
            }
            '\\' if matches!(self.peek_at(1), Some(b'\n' | b'\r')) => {
                self.bump();
                self.consume_newline();
                self.emit(TokenKind::EscapedNl, start, offset);
            }
            '\n' | '\r' => {
                self.consume_newline();
                let kind = if self.depth == 0 && self.had_code {
                    TokenKind::Newline
                } else {
                    TokenKind::Nl
                };
                self.emit(kind, start, offset);
                if self.depth == 0 {
                    self.had_code = false;
                }
                self.at_line_start = true;
            }
            '\'' | '"' => {
                self.scan_string(start, offset)?;
                self.had_code = true;
            }
            c if is_ident_start(c) => {
                while self.peek().is_some_and(is_ident_continue) {
                    self.bump();
                }
                let word = &self.src[start..self.pos];
                if is_string_prefix(word) && matches!(self.peek(), Some('\'' | '"')) {
                    self.scan_string(start, offset)?;
                } else {
                    self.emit(TokenKind::Name, start, offset);
                }
                self.had_code = true;
            }
            c if c.is_ascii_digit() => {
                self.scan_number();
                self.emit(TokenKind::Number, start, offset);
                self.had_code = true;
            }
            '.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.scan_number();
                self.emit(TokenKind::Number, start, offset);
                self.had_code = true;
            }
            _ => {
                self.scan_operator(start, offset)?;
                self.had_code = true;
            }
        }
        Ok(())
    }

    /// Consume `\n`, `\r\n`, or a lone `\r` and advance the line counter.
    fn consume_newline(&mut self) {
        if self.peek() == Some('\r') {
            self.bump();
            if self.peek() == Some('\n') {
                self.bump();
            }
        } else {
            self.bump();
        }
        self.line += 1;
        self.line_start = self.pos;
    }

    fn scan_string(&mut self, start: usize, offset: Offset) -> Result<(), LexError> {
        let start_line = self.line;
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => unreachable!("scan_string entered off a quote"),
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote as u8);
        if triple {
            self.bump();
            self.bump();
        }
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString { line: start_line }),
                Some('\\') => {
                    // A backslash escapes the next character even in raw
                    // strings as far as tokenization is concerned.
                    self.bump();
                    match self.peek() {
                        None => {
                            return Err(LexError::UnterminatedString { line: start_line })
                        }
                        Some('\n' | '\r') => self.consume_newline(),
                        Some(_) => {
                            self.bump();
                        }
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote as u8) {
                        self.bump();
                        self.bump();
                        break;
                    }
                }
                Some('\n' | '\r') => {
                    if !triple {
                        return Err(LexError::UnterminatedString { line: start_line });
                    }
                    self.consume_newline();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.emit(TokenKind::String, start, offset);
        Ok(())
    }

    /// Permissive number scan: the parser only needs the extent, not the
    /// value, so malformed digits are left for it to reject.
    fn scan_number(&mut self) {
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')) {
            self.bump();
            self.bump();
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                self.bump();
            }
            return;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
        if self.peek() == Some('.') {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let is_exponent = match self.peek_at(1) {
                Some(b'+' | b'-') => self.peek_at(2).is_some_and(|b| b.is_ascii_digit()),
                Some(b) => b.is_ascii_digit(),
                None => false,
            };
            if is_exponent {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                    self.bump();
                }
            }
        }
        if matches!(self.peek(), Some('j' | 'J')) {
            self.bump();
        }
    }

    fn scan_operator(&mut self, start: usize, offset: Offset) -> Result<(), LexError> {
        const THREE: &[&str] = &["**=", "//=", ">>=", "<<=", "..."];
        const TWO: &[&str] = &[
            "==", "!=", ">=", "<=", "->", ":=", "+=", "-=", "*=", "/=", "%=", "@=", "&=", "|=",
            "^=", ">>", "<<", "**", "//",
        ];
        const ONE: &str = "+-*/%@&|^~<>=()[]{},:.;";

        let rest = &self.src[self.pos..];
        let matched = THREE
            .iter()
            .chain(TWO.iter())
            .find(|op| rest.starts_with(**op))
            .copied();
        if let Some(op) = matched {
            self.pos += op.len();
        } else {
            let c = self.peek().unwrap_or_default();
            if !ONE.contains(c) {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    line: offset.line,
                    col: offset.col,
                });
            }
            self.bump();
            match c {
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
        self.emit(TokenKind::Op, start, offset);
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// String-literal prefixes: any case-insensitive combination of r/b/u/f/t
/// that Python accepts. Validating the exact combination is the parser's
/// problem; length and alphabet are enough to lex correctly.
fn is_string_prefix(word: &str) -> bool {
    word.len() <= 3 && word.chars().all(|c| "rbuftRBUFT".contains(c))
}

/// Indentation width with tabs expanding to the next multiple of 8 and a
/// form feed resetting the count, as CPython's tokenizer does.
fn indent_width(ws: &str) -> usize {
    let mut width = 0usize;
    for c in ws.chars() {
        match c {
            '\t' => width = width / 8 * 8 + 8,
            '\x0c' => width = 0,
            _ => width += 1,
        }
    }
    width
}
