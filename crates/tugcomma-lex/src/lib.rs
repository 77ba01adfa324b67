// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A lossless tokenizer for Python source code.
//!
//! Unlike a parser-oriented lexer, this tokenizer keeps *every* byte of the
//! input: whitespace runs, comments, escaped newlines, and both logical and
//! non-logical newlines each become a token. The token list is therefore
//! invertible — [`tokens_to_src`] reproduces the original text exactly:
//!
//! ```
//! use tugcomma_lex::{tokenize, tokens_to_src};
//!
//! let src = "x = [\n    1,\n]  # done\n";
//! let tokens = tokenize(src).unwrap();
//! assert_eq!(tokens_to_src(&tokens), src);
//! ```
//!
//! Token offsets are `(line, utf-8 byte column)` pairs and serve as the join
//! key between this stream and positions reported by the AST parser. Tokens
//! inserted by a rewrite carry [`Offset::SENTINEL`] so they can never collide
//! with a real source position.

mod scanner;

pub use scanner::{tokenize, LexError};

// ============================================================================
// Offsets
// ============================================================================

/// A source position: 1-based line, 0-based UTF-8 byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset {
    pub line: i32,
    pub col: i32,
}

impl Offset {
    /// The offset of synthesized tokens; never equal to a real position.
    pub const SENTINEL: Offset = Offset { line: -1, col: -1 };

    pub fn new(line: i32, col: i32) -> Self {
        Offset { line, col }
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or keyword.
    Name,
    /// Numeric literal.
    Number,
    /// String literal of any flavor, including f-strings, as one token.
    String,
    /// Operator or delimiter.
    Op,
    /// Logical newline: ends a statement.
    Newline,
    /// Non-logical newline: blank line, comment line, or inside brackets.
    Nl,
    /// A backslash-newline line continuation.
    EscapedNl,
    /// Leading whitespace that increases the block indentation level.
    Indent,
    /// Zero-width marker for a decrease in block indentation.
    Dedent,
    /// Any other horizontal whitespace run.
    UnimportantWs,
    /// A `#` comment, up to but not including the newline.
    Comment,
    /// Zero-width end-of-input marker.
    EndMarker,
}

impl TokenKind {
    /// Tokens that carry no code: comments, continuations, non-logical
    /// newlines, and plain whitespace.
    pub fn is_non_coding(self) -> bool {
        matches!(
            self,
            TokenKind::Comment | TokenKind::EscapedNl | TokenKind::Nl | TokenKind::UnimportantWs
        )
    }

    /// Any of the three newline-ish kinds.
    pub fn is_any_newline(self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Nl | TokenKind::EscapedNl
        )
    }

    /// Whitespace that counts toward a line's indentation.
    pub fn is_indent_ws(self) -> bool {
        matches!(self, TokenKind::Indent | TokenKind::UnimportantWs)
    }
}

/// One lexical token. `src` holds the exact source text (empty only for
/// `Dedent` and `EndMarker`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub src: String,
    pub offset: Offset,
}

impl Token {
    pub fn new(kind: TokenKind, src: impl Into<String>, offset: Offset) -> Self {
        Token {
            kind,
            src: src.into(),
            offset,
        }
    }

    /// A synthesized non-logical newline.
    pub fn nl() -> Self {
        Token::new(TokenKind::Nl, "\n", Offset::SENTINEL)
    }

    /// A synthesized whitespace run of `width` spaces.
    pub fn ws(width: usize) -> Self {
        Token::new(TokenKind::UnimportantWs, " ".repeat(width), Offset::SENTINEL)
    }

    /// A synthesized comma.
    pub fn comma() -> Self {
        Token::new(TokenKind::Op, ",", Offset::SENTINEL)
    }

    pub fn is_open_bracket(&self) -> bool {
        self.kind == TokenKind::Op && matches!(self.src.as_str(), "(" | "[" | "{")
    }

    pub fn is_close_bracket(&self) -> bool {
        self.kind == TokenKind::Op && matches!(self.src.as_str(), ")" | "]" | "}")
    }

    pub fn is_comma(&self) -> bool {
        self.kind == TokenKind::Op && self.src == ","
    }
}

/// Reassemble source text from a token list.
///
/// For any list produced by [`tokenize`] this returns the original input
/// byte-for-byte; after a rewrite it returns the edited text.
pub fn tokens_to_src(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.src.len()).sum());
    for token in tokens {
        out.push_str(&token.src);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_never_equals_real_offset() {
        assert_ne!(Offset::SENTINEL, Offset::new(1, 0));
        assert_eq!(Token::nl().offset, Offset::SENTINEL);
        assert_eq!(Token::ws(4).src, "    ");
    }

    #[test]
    fn bracket_predicates() {
        let open = Token::new(TokenKind::Op, "(", Offset::new(1, 0));
        let close = Token::new(TokenKind::Op, ")", Offset::new(1, 1));
        let name = Token::new(TokenKind::Name, "x", Offset::new(1, 0));
        assert!(open.is_open_bracket());
        assert!(close.is_close_bracket());
        assert!(!name.is_open_bracket());
        assert!(Token::comma().is_comma());
    }
}
