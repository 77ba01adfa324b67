//! Call-shaped constructs: calls, and anything else whose span is located
//! through [`find_call`] (function parameter lists, class bases, class
//! patterns).

use std::collections::HashSet;

use tugcomma_ast::Expr;
use tugcomma_lex::{Offset, Token};

use crate::braces::{find_call, fix_brace, TokenError};
use crate::fixes::Fix;

/// Register a call with at least one argument that has a usable offset.
///
/// Children whose column is the `-1` sentinel (unreliable upstream metadata)
/// are dropped from the join set. A call whose sole argument is a bare
/// generator expression is skipped entirely: a trailing comma after a
/// generator breaks downstream consumers of that form.
pub(crate) fn collect(expr: &Expr) -> Option<(Offset, Fix)> {
    let Expr::Call {
        offset,
        args,
        keywords,
        ..
    } = expr
    else {
        return None;
    };

    let mut arg_offsets = HashSet::new();
    let mut has_star_args = false;
    for arg in args {
        if arg.is_starred() {
            has_star_args = true;
        }
        let off = arg.offset();
        if off.col != -1 {
            arg_offsets.insert(off);
        }
    }
    for kw in keywords {
        if kw.arg.is_none() {
            has_star_args = true;
        }
        if kw.offset.col != -1 {
            arg_offsets.insert(kw.offset);
        }
    }

    let only_a_generator = keywords.is_empty() && args.len() == 1 && args[0].is_generator_exp();
    if arg_offsets.is_empty() || only_a_generator {
        return None;
    }
    Some((
        *offset,
        Fix::Call {
            arg_offsets,
            has_star_args,
        },
    ))
}

pub(crate) fn apply(
    i: usize,
    tokens: &mut Vec<Token>,
    arg_offsets: &HashSet<Offset>,
    add_comma: bool,
) -> Result<(), TokenError> {
    let span = find_call(arg_offsets, i, tokens)?;
    fix_brace(tokens, span, add_comma, true);
    Ok(())
}
