//! Construct discovery and fix dispatch.
//!
//! One DFS over the tree ([`visit`]) produces a map from anchor offset to the
//! fixes registered there. A [`Fix`] is plain data — the construct kind plus
//! whatever the token pass needs to relocate it — and [`apply`] is the single
//! dispatcher that interprets one against the live token list.
//!
//! Ordering matters twice: fixes at one anchor apply in discovery order
//! (parents before children, left to right), except that tuple fixes which
//! backtrack for their opening delimiter always run after everything else at
//! that anchor — they may touch tokens left of the anchor that the other
//! fixes located forward from.

mod calls;
mod classes;
mod defs;
mod imports;
mod literals;
mod patterns;
mod type_params;
mod with_items;

use std::collections::{HashMap, HashSet};

use tugcomma_ast::{push_children, Module, NodeRef, Stmt};
use tugcomma_lex::{Offset, Token};

use crate::braces::TokenError;
use crate::version::Settings;

/// One registered fix: what to do when the driver reaches the anchor token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fix {
    /// A call with resolvable argument offsets.
    Call {
        arg_offsets: HashSet<Offset>,
        has_star_args: bool,
    },
    /// A `def` / `async def` parameter list.
    FuncParams {
        arg_offsets: HashSet<Offset>,
        has_star_args: bool,
    },
    /// A class definition's base/keyword list.
    ClassBases { arg_offsets: HashSet<Offset> },
    /// A `from x import (...)` list, if the parens turn out to exist.
    Import,
    /// A non-empty set/list/dict display, anchored at its open delimiter.
    Literal,
    /// A parenthesized tuple, anchored at its `(`.
    TupleAtParen { one_el_tuple: bool },
    /// A tuple anchored at its first element; the real delimiter (if any)
    /// is found by backtracking.
    TupleBacktrack { one_el_tuple: bool },
    /// A parenthesized with-items list.
    WithItems,
    /// A class pattern in a `case` clause.
    MatchClass { arg_offsets: HashSet<Offset> },
    /// A mapping pattern.
    MatchMapping,
    /// A sequence pattern; `len` decides the parenthesized 1-tuple rule.
    MatchSequence { len: usize },
    /// A PEP 695 type-parameter list, found by scanning for the first `[`.
    TypeParams,
}

impl Fix {
    /// Fixes that consume tokens to the left of their anchor.
    pub fn is_backtracking(&self) -> bool {
        matches!(self, Fix::TupleBacktrack { .. })
    }
}

pub type FixMap = HashMap<Offset, Vec<Fix>>;

fn register(map: &mut FixMap, entry: Option<(Offset, Fix)>) {
    if let Some((offset, fix)) = entry {
        map.entry(offset).or_default().push(fix);
    }
}

/// Walk the tree once and register every candidate construct.
pub fn visit(module: &Module) -> FixMap {
    let mut map = FixMap::new();
    let mut stack: Vec<NodeRef<'_>> = module.body.iter().rev().map(NodeRef::Stmt).collect();
    while let Some(node) = stack.pop() {
        collect(node, &mut map);
        push_children(node, &mut stack);
    }
    map
}

fn collect(node: NodeRef<'_>, map: &mut FixMap) {
    match node {
        NodeRef::Stmt(stmt) => {
            match stmt {
                Stmt::FunctionDef { offset, params, .. } => {
                    register(map, defs::collect(*offset, params));
                }
                Stmt::ClassDef {
                    offset,
                    bases,
                    keywords,
                    ..
                } => {
                    register(map, classes::collect(*offset, bases, keywords));
                }
                Stmt::ImportFrom { offset, .. } => {
                    register(map, Some((*offset, Fix::Import)));
                }
                Stmt::With {
                    offset,
                    is_async: false,
                    ..
                } => {
                    register(map, Some((*offset, Fix::WithItems)));
                }
                _ => {}
            }
            register(map, type_params::collect(stmt));
        }
        NodeRef::Expr(expr) => {
            register(map, calls::collect(expr));
            register(map, literals::collect(expr));
        }
        NodeRef::Pattern(pattern) => {
            register(map, patterns::collect(pattern));
        }
        _ => {}
    }
}

/// Interpret one fix against the current token list. `i` is the index of the
/// anchor token in the current (possibly already mutated) list; every fix
/// relocates its span from scratch.
pub fn apply(
    fix: &Fix,
    i: usize,
    tokens: &mut Vec<Token>,
    settings: &Settings,
) -> Result<(), TokenError> {
    match fix {
        Fix::Call {
            arg_offsets,
            has_star_args,
        } => calls::apply(
            i,
            tokens,
            arg_offsets,
            !has_star_args || settings.star_call_commas(),
        ),
        Fix::FuncParams {
            arg_offsets,
            has_star_args,
        } => calls::apply(
            i,
            tokens,
            arg_offsets,
            !has_star_args || settings.star_def_commas(),
        ),
        Fix::ClassBases { arg_offsets } => calls::apply(i, tokens, arg_offsets, true),
        Fix::Import => imports::apply(i, tokens),
        Fix::Literal => literals::apply_literal(i, tokens),
        Fix::TupleAtParen { one_el_tuple } => {
            literals::apply_tuple_at_paren(i, tokens, *one_el_tuple)
        }
        Fix::TupleBacktrack { one_el_tuple } => {
            literals::apply_tuple_backtrack(i, tokens, *one_el_tuple)
        }
        Fix::WithItems => with_items::apply(i, tokens),
        Fix::MatchClass { arg_offsets } => calls::apply(i, tokens, arg_offsets, true),
        Fix::MatchMapping => patterns::apply_mapping(i, tokens),
        Fix::MatchSequence { len } => patterns::apply_sequence(i, tokens, *len),
        Fix::TypeParams => type_params::apply(i, tokens),
    }
}
