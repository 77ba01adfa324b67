//! Function definition parameter lists.
//!
//! A `def` is located exactly like a call: scan forward from the anchor
//! until a parameter's offset pins the opening paren. Starred and
//! keyword-only parameters gate the comma on the 3.6 policy floor.

use std::collections::HashSet;

use tugcomma_ast::Parameters;
use tugcomma_lex::Offset;

use crate::fixes::Fix;

pub(crate) fn collect(offset: Offset, params: &Parameters) -> Option<(Offset, Fix)> {
    let arg_offsets: HashSet<Offset> = params.iter().map(|p| p.offset).collect();
    if arg_offsets.is_empty() {
        return None;
    }
    Some((
        offset,
        Fix::FuncParams {
            arg_offsets,
            has_star_args: params.has_star_section(),
        },
    ))
}
