// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Python parser producing a position-carrying AST.
//!
//! This crate parses Python source into the lightweight tree in [`nodes`]:
//! structure plus anchor positions, nothing else. It exists to answer one
//! question for the rewriter — *where* do calls, definitions, literals,
//! imports, with-items, patterns and type-parameter lists start, and where do
//! their immediate children start — so the rewriter can find the same
//! constructs again in the lossless token stream from `tugcomma-lex`.
//!
//! # Quick start
//!
//! ```
//! use tugcomma_ast::{parse_module, Stmt};
//!
//! let module = parse_module("def hello():\n    print('world')\n").unwrap();
//! assert!(matches!(module.body[0], Stmt::FunctionDef { .. }));
//! ```
//!
//! Anything the grammar cannot make sense of is a [`ParseError`]; callers
//! treat that as "leave this source alone", never as a crash.

mod lexemes;
mod nodes;
mod parser;

pub use nodes::*;
pub use parser::ParseError;

use tugcomma_lex::tokenize;

/// Parse a module, or fail with a [`ParseError`] on any input the grammar
/// does not cover (including tokenization failures).
pub fn parse_module(src: &str) -> Result<Module, ParseError> {
    let tokens = tokenize(src)?;
    let lx = lexemes::lexemes(&tokens);
    parser::Parser::new(&lx).module()
}
