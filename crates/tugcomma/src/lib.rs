//! tugcomma rewrites trailing commas in Python source.
//!
//! Given a module's text, it finds the constructs whose closing delimiter
//! sits on a later line than content — call arguments, parameter lists,
//! class bases, container displays, import lists, parenthesized with-items,
//! match patterns, type-parameter lists — and makes each of them end with a
//! trailing comma, un-hugging and re-indenting the delimiters where needed.
//! Collapsed single-line constructs lose redundant trailing commas instead
//! (except one-element tuples, whose comma is load-bearing).
//!
//! The work happens in two joined passes over two representations of the
//! same text: a syntax-tree pass that registers candidate constructs by
//! anchor position ([`fixes`]), and a token pass that relocates each
//! construct in a lossless token stream and edits it in place ([`braces`]).
//! The position is the only thing the passes share.
//!
//! ```
//! use tugcomma::{fix_src, Settings};
//!
//! let fixed = fix_src("x(\n    1\n)\n", &Settings::default()).unwrap();
//! assert_eq!(fixed, "x(\n    1,\n)\n");
//! ```
//!
//! Source that does not parse is returned unchanged — running over files the
//! grammar cannot handle is expected, not exceptional. A disagreement
//! between tree and token stream beyond the known workarounds is a
//! [`FixError`]: loud, per-file, and never a partial rewrite.

mod braces;
mod fixes;
mod version;

pub mod cli;

pub use braces::TokenError;
pub use version::{Settings, Version};

use thiserror::Error;
use tugcomma_ast::parse_module;
use tugcomma_lex::{tokenize, tokens_to_src};

/// A failed rewrite. The input text is never partially transformed; callers
/// report this per file and move on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("token stream and syntax tree disagree: {0}")]
    Token(#[from] TokenError),
}

/// Rewrite `src`, returning the fixed text. Unparseable input comes back
/// unchanged.
pub fn fix_src(src: &str, settings: &Settings) -> Result<String, FixError> {
    let module = match parse_module(src) {
        Ok(module) => module,
        Err(err) => {
            tracing::debug!("not rewriting, source does not parse: {err}");
            return Ok(src.to_string());
        }
    };
    let fix_map = fixes::visit(&module);

    let Ok(mut tokens) = tokenize(src) else {
        return Ok(src.to_string());
    };

    // Walk by index: fixes insert tokens, so the list grows under us and the
    // length must be re-read every step. Zero-width tokens carry no source
    // position worth dispatching on.
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].src.is_empty() {
            i += 1;
            continue;
        }
        let offset = tokens[i].offset;
        let at_open_bracket = tokens[i].is_open_bracket();

        if let Some(registered) = fix_map.get(&offset) {
            // Backtracking tuple fixes run last: they may consume tokens to
            // the left of the anchor that the forward-scanning fixes at this
            // position have already located past.
            for fix in registered.iter().filter(|f| !f.is_backtracking()) {
                fixes::apply(fix, i, &mut tokens, settings)?;
            }
            for fix in registered.iter().filter(|f| f.is_backtracking()) {
                fixes::apply(fix, i, &mut tokens, settings)?;
            }
        }

        // Any other opening bracket — grouping parens, comprehensions —
        // still gets its layout normalized, with the comma left alone.
        if at_open_bracket {
            let span = braces::find_simple(i, &tokens)?;
            braces::fix_brace(&mut tokens, span, false, false);
        }

        i += 1;
    }

    Ok(tokens_to_src(&tokens))
}
