//! Parenthesized with-items lists.
//!
//! Registered for every synchronous `with`; the token pass decides whether
//! the parens actually delimit the item list by requiring the matched close
//! paren to be followed directly by the suite colon. Anything else — an
//! ordinary parenthesized context-manager expression — is left to the
//! neutral bracket pass.

use tugcomma_lex::{Token, TokenKind};

use crate::braces::{find_simple, fix_brace, TokenError};

pub(crate) fn apply(i: usize, tokens: &mut Vec<Token>) -> Result<(), TokenError> {
    let mut i = i + 1;
    if tokens[i].kind == TokenKind::UnimportantWs {
        i += 1;
    }
    if !(tokens[i].kind == TokenKind::Op && tokens[i].src == "(") {
        return Ok(());
    }
    let Some(span) = find_simple(i, tokens)? else {
        return Ok(());
    };
    if tokens[span.close + 1].src == ":" {
        fix_brace(tokens, Some(span), true, true);
    }
    Ok(())
}
