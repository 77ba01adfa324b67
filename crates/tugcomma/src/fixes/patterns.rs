//! Structural pattern matching: class, mapping and sequence patterns.
//!
//! Class patterns reuse the call machinery. Sequence patterns check the
//! anchor token at apply time — a bare `case 1, 2:` has no delimiter and is
//! a no-op — and the comma-removal rule differs by bracket family: `[1, ]`
//! always collapses to `[1]`, while `(1, )` keeps its comma unless there is
//! more than one pattern, because the parenthesized single-pattern form is a
//! 1-tuple.

use std::collections::HashSet;

use tugcomma_ast::Pattern;
use tugcomma_lex::{Offset, Token};

use crate::braces::{find_simple, fix_brace, TokenError};
use crate::fixes::Fix;

pub(crate) fn collect(pattern: &Pattern) -> Option<(Offset, Fix)> {
    match pattern {
        Pattern::MatchClass {
            offset,
            patterns,
            kwd_patterns,
            ..
        } => {
            let mut arg_offsets: HashSet<Offset> =
                patterns.iter().map(|p| p.offset()).collect();
            arg_offsets.extend(kwd_patterns.iter().map(|p| p.offset()));
            if arg_offsets.is_empty() {
                return None;
            }
            Some((*offset, Fix::MatchClass { arg_offsets }))
        }
        Pattern::MatchMapping { offset, .. } => Some((*offset, Fix::MatchMapping)),
        Pattern::MatchSequence { offset, patterns } => Some((
            *offset,
            Fix::MatchSequence {
                len: patterns.len(),
            },
        )),
        _ => None,
    }
}

pub(crate) fn apply_mapping(i: usize, tokens: &mut Vec<Token>) -> Result<(), TokenError> {
    let span = find_simple(i, tokens)?;
    fix_brace(tokens, span, true, true);
    Ok(())
}

pub(crate) fn apply_sequence(
    i: usize,
    tokens: &mut Vec<Token>,
    len: usize,
) -> Result<(), TokenError> {
    if tokens[i].src != "[" && tokens[i].src != "(" {
        return Ok(());
    }
    let remove_comma = tokens[i].src == "[" || len > 1;
    let span = find_simple(i, tokens)?;
    fix_brace(tokens, span, true, remove_comma);
    Ok(())
}
