//! Class definition base lists.
//!
//! Bases and keyword arguments (metaclass and friends) are collected
//! together; the grammar has allowed a trailing comma here since 3.5 with no
//! starred-argument restriction, so class fixes are never version-gated.

use std::collections::HashSet;

use tugcomma_ast::{Expr, Keyword};
use tugcomma_lex::Offset;

use crate::fixes::Fix;

pub(crate) fn collect(
    offset: Offset,
    bases: &[Expr],
    keywords: &[Keyword],
) -> Option<(Offset, Fix)> {
    let mut arg_offsets: HashSet<Offset> = bases.iter().map(|b| b.offset()).collect();
    arg_offsets.extend(keywords.iter().map(|kw| kw.offset));
    if arg_offsets.is_empty() {
        return None;
    }
    Some((offset, Fix::ClassBases { arg_offsets }))
}
