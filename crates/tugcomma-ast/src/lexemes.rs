// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The parser's view of the token stream.
//!
//! The lossless stream from `tugcomma-lex` carries whitespace, comments and
//! continuations the grammar never mentions. This module filters those out,
//! leaving coding tokens plus the structural markers (logical newline,
//! indent, dedent, end) the statement grammar is written against. Offsets
//! are passed through untouched — they are the join key the rewriter uses to
//! find the same constructs again in the lossless stream.

use tugcomma_lex::{Offset, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexKind {
    Name,
    Number,
    Str,
    Op,
    Newline,
    Indent,
    Dedent,
    End,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Lex<'a> {
    pub kind: LexKind,
    pub text: &'a str,
    pub offset: Offset,
}

pub(crate) fn lexemes(tokens: &[Token]) -> Vec<Lex<'_>> {
    tokens
        .iter()
        .filter_map(|token| {
            let kind = match token.kind {
                TokenKind::Name => LexKind::Name,
                TokenKind::Number => LexKind::Number,
                TokenKind::String => LexKind::Str,
                TokenKind::Op => LexKind::Op,
                TokenKind::Newline => LexKind::Newline,
                TokenKind::Indent => LexKind::Indent,
                TokenKind::Dedent => LexKind::Dedent,
                TokenKind::EndMarker => LexKind::End,
                TokenKind::Nl
                | TokenKind::EscapedNl
                | TokenKind::UnimportantWs
                | TokenKind::Comment => return None,
            };
            Some(Lex {
                kind,
                text: &token.src,
                offset: token.offset,
            })
        })
        .collect()
}
