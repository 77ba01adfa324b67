//! PEP 695 type-parameter lists on `def`, `class` and `type` statements.
//!
//! The bracket doesn't sit at the statement anchor, so the fix scans forward
//! for the first `[` — the type-parameter list always precedes any other
//! bracket in these headers.

use tugcomma_ast::Stmt;
use tugcomma_lex::{Offset, Token, TokenKind};

use crate::braces::{find_simple, fix_brace, TokenError};
use crate::fixes::Fix;

pub(crate) fn collect(stmt: &Stmt) -> Option<(Offset, Fix)> {
    match stmt {
        Stmt::FunctionDef {
            offset, type_params, ..
        }
        | Stmt::ClassDef {
            offset, type_params, ..
        }
        | Stmt::TypeAlias {
            offset, type_params, ..
        } if !type_params.is_empty() => Some((*offset, Fix::TypeParams)),
        _ => None,
    }
}

pub(crate) fn apply(i: usize, tokens: &mut Vec<Token>) -> Result<(), TokenError> {
    let open = tokens
        .iter()
        .enumerate()
        .skip(i)
        .find(|(_, token)| token.kind == TokenKind::Op && token.src == "[")
        .map(|(n, _)| n)
        .ok_or(TokenError::PastEnd)?;
    let span = find_simple(open, tokens)?;
    fix_brace(tokens, span, true, true);
    Ok(())
}
