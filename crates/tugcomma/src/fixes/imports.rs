//! `from x import (...)` lists.
//!
//! The tree can't say whether the import list is parenthesized, so the fix
//! scans forward from the `from` anchor: an open paren before the logical
//! newline is the list, no paren means there is nothing to do.

use tugcomma_lex::{Token, TokenKind};

use crate::braces::{find_simple, fix_brace, BraceSpan, TokenError};

fn find_import(start: usize, tokens: &[Token]) -> Result<Option<BraceSpan>, TokenError> {
    for (i, token) in tokens.iter().enumerate().skip(start) {
        if token.kind == TokenKind::Newline {
            return Ok(None);
        }
        if token.kind == TokenKind::Op && token.src == "(" {
            return find_simple(i, tokens);
        }
    }
    Err(TokenError::PastEnd)
}

pub(crate) fn apply(i: usize, tokens: &mut Vec<Token>) -> Result<(), TokenError> {
    let span = find_import(i, tokens)?;
    fix_brace(tokens, span, true, true);
    Ok(())
}
