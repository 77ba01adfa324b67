//! Container displays and tuples.
//!
//! Sets, lists and dicts anchor at their opening delimiter and are the
//! simple case. Tuples are the treacherous one:
//!
//! - a parenthesized tuple anchors at its `(`, but the span only counts when
//!   a top-level comma is present (plain grouping parens share the shape);
//! - a bare tuple anchors at its first element, so the fix backtracks past
//!   non-coding tokens looking for a `(` or `[` — finding neither means a
//!   genuinely delimiter-less tuple (`x = 1, 2`), which must stay untouched;
//! - a one-element tuple never loses its comma. Dropping it would change a
//!   tuple into a parenthesized expression.

use tugcomma_ast::Expr;
use tugcomma_lex::{Offset, Token};

use crate::braces::{find_simple, fix_brace, TokenError};
use crate::fixes::Fix;

pub(crate) fn collect(expr: &Expr) -> Option<(Offset, Fix)> {
    match expr {
        Expr::Set { offset, .. } => Some((*offset, Fix::Literal)),
        Expr::List { offset, elts } if !elts.is_empty() => Some((*offset, Fix::Literal)),
        Expr::Dict { offset, values, .. } if !values.is_empty() => Some((*offset, Fix::Literal)),
        Expr::Tuple { offset, elts, .. } if !elts.is_empty() => {
            let one_el_tuple = elts.len() == 1;
            // A tuple that shares its anchor with its first element has no
            // delimiter of its own at the anchor; only that shape needs the
            // backtracking search. A distinct anchor is the tuple's `(` —
            // or the start of a parenthesized first element, in which case
            // the missing top-level comma makes the fix bail.
            let fix = if *offset == elts[0].offset() {
                Fix::TupleBacktrack { one_el_tuple }
            } else {
                Fix::TupleAtParen { one_el_tuple }
            };
            Some((*offset, fix))
        }
        _ => None,
    }
}

pub(crate) fn apply_literal(i: usize, tokens: &mut Vec<Token>) -> Result<(), TokenError> {
    let span = find_simple(i, tokens)?;
    fix_brace(tokens, span, true, true);
    Ok(())
}

pub(crate) fn apply_tuple_at_paren(
    i: usize,
    tokens: &mut Vec<Token>,
    one_el_tuple: bool,
) -> Result<(), TokenError> {
    let span = find_simple(i, tokens)?;
    // Without a top-level comma these parens are not the tuple's own.
    let Some(span) = span else { return Ok(()) };
    if !span.multi_element {
        return Ok(());
    }
    fix_brace(tokens, Some(span), true, !one_el_tuple);
    Ok(())
}

pub(crate) fn apply_tuple_backtrack(
    i: usize,
    tokens: &mut Vec<Token>,
    one_el_tuple: bool,
) -> Result<(), TokenError> {
    let mut j = i as isize - 1;
    while j >= 0 && tokens[j as usize].kind.is_non_coding() {
        j -= 1;
    }
    if j < 0 {
        return Ok(());
    }
    let j = j as usize;
    if tokens[j].src != "(" && tokens[j].src != "[" {
        return Ok(());
    }
    let span = find_simple(j, tokens)?;
    fix_brace(tokens, span, true, !one_el_tuple);
    Ok(())
}
