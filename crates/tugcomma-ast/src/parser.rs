// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent parser for the Python grammar.
//!
//! The parser consumes the lexeme stream from [`crate::lexemes`] and builds
//! the node types in [`crate::nodes`]. It is deliberately permissive about
//! contextual restrictions (assignment-target shapes, version gates) — its
//! one job is to recover structure and anchor positions for the rewriter, and
//! any input it cannot make structural sense of is a [`ParseError`], which
//! callers treat as "leave this file alone".
//!
//! Soft keywords (`match`, `case`, `type`) are resolved the way the PEG
//! grammar resolves them: attempt the statement form, rewind to the saved
//! cursor on failure, and fall back to an expression statement.

use thiserror::Error;
use tugcomma_lex::{LexError, Offset};

use crate::lexemes::{Lex, LexKind};
use crate::nodes::*;

/// A parse failure. `Lex` wraps tokenization errors so callers see a single
/// error type for "this is not valid Python".
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("invalid syntax at line {line}, column {col}: {message}")]
    Syntax {
        message: String,
        line: i32,
        col: i32,
    },
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Keywords that can begin an expression.
const EXPR_KEYWORDS: &[&str] = &["False", "None", "True", "await", "lambda", "not"];

const AUG_OPS: &[&str] = &[
    "+=", "-=", "*=", "/=", "//=", "%=", "@=", "&=", "|=", "^=", ">>=", "<<=", "**=",
];

pub(crate) struct Parser<'a, 'b> {
    lx: &'b [Lex<'a>],
    i: usize,
}

type PResult<T> = Result<T, ParseError>;

impl<'a, 'b> Parser<'a, 'b> {
    pub(crate) fn new(lx: &'b [Lex<'a>]) -> Self {
        debug_assert!(matches!(lx.last().map(|l| l.kind), Some(LexKind::End)));
        Parser { lx, i: 0 }
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn cur(&self) -> Lex<'a> {
        self.lx[self.i.min(self.lx.len() - 1)]
    }

    fn next(&self) -> Lex<'a> {
        self.lx[(self.i + 1).min(self.lx.len() - 1)]
    }

    fn bump(&mut self) -> Lex<'a> {
        let lex = self.cur();
        if self.i < self.lx.len() - 1 {
            self.i += 1;
        }
        lex
    }

    fn mark(&self) -> usize {
        self.i
    }

    fn reset(&mut self, mark: usize) {
        self.i = mark;
    }

    fn err<T>(&self, message: impl Into<String>) -> PResult<T> {
        let Offset { line, col } = self.cur().offset;
        Err(ParseError::Syntax {
            message: message.into(),
            line,
            col,
        })
    }

    fn at_kind(&self, kind: LexKind) -> bool {
        self.cur().kind == kind
    }

    fn eat_kind(&mut self, kind: LexKind) -> bool {
        if self.at_kind(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn at_op(&self, op: &str) -> bool {
        let lex = self.cur();
        lex.kind == LexKind::Op && lex.text == op
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.at_op(op) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: &str) -> PResult<Offset> {
        if self.at_op(op) {
            Ok(self.bump().offset)
        } else {
            self.err(format!("expected {op:?}"))
        }
    }

    fn at_kw(&self, kw: &str) -> bool {
        let lex = self.cur();
        lex.kind == LexKind::Name && lex.text == kw
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.at_kw(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_kw(&mut self, kw: &str) -> PResult<Offset> {
        if self.at_kw(kw) {
            Ok(self.bump().offset)
        } else {
            self.err(format!("expected {kw:?}"))
        }
    }

    /// At an identifier (soft keywords count, hard keywords do not).
    fn at_name(&self) -> bool {
        let lex = self.cur();
        lex.kind == LexKind::Name && !KEYWORDS.contains(&lex.text)
    }

    fn expect_name(&mut self) -> PResult<(String, Offset)> {
        if self.at_name() {
            let lex = self.bump();
            Ok((lex.text.to_string(), lex.offset))
        } else {
            self.err("expected a name")
        }
    }

    fn expect_newline(&mut self) -> PResult<()> {
        if self.at_kind(LexKind::Newline) {
            self.bump();
            Ok(())
        } else if self.at_kind(LexKind::End) {
            Ok(())
        } else {
            self.err("expected end of statement")
        }
    }

    /// Whether the current lexeme can begin an expression (for optional
    /// trailing positions: `return`, bare tuples, subscript slots).
    fn can_start_expr(&self) -> bool {
        let lex = self.cur();
        match lex.kind {
            LexKind::Number | LexKind::Str => true,
            LexKind::Name => !KEYWORDS.contains(&lex.text) || EXPR_KEYWORDS.contains(&lex.text),
            LexKind::Op => matches!(lex.text, "(" | "[" | "{" | "*" | "+" | "-" | "~" | "..."),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Module and statements
    // ------------------------------------------------------------------

    pub(crate) fn module(&mut self) -> PResult<Module> {
        let mut body = Vec::new();
        while !self.at_kind(LexKind::End) {
            if self.eat_kind(LexKind::Newline) {
                continue;
            }
            self.statement(&mut body)?;
        }
        Ok(Module { body })
    }

    fn statement(&mut self, out: &mut Vec<Stmt>) -> PResult<()> {
        let lex = self.cur();
        if lex.kind == LexKind::Op && lex.text == "@" {
            let stmt = self.decorated()?;
            out.push(stmt);
            return Ok(());
        }
        if lex.kind == LexKind::Name {
            match lex.text {
                "if" => {
                    let stmt = self.if_stmt()?;
                    out.push(stmt);
                    return Ok(());
                }
                "while" => {
                    let stmt = self.while_stmt()?;
                    out.push(stmt);
                    return Ok(());
                }
                "for" => {
                    let offset = self.bump().offset;
                    let stmt = self.for_stmt(offset, false)?;
                    out.push(stmt);
                    return Ok(());
                }
                "try" => {
                    let stmt = self.try_stmt()?;
                    out.push(stmt);
                    return Ok(());
                }
                "with" => {
                    let offset = self.bump().offset;
                    let stmt = self.with_stmt(offset, false)?;
                    out.push(stmt);
                    return Ok(());
                }
                "def" => {
                    let stmt = self.func_def(Vec::new(), None)?;
                    out.push(stmt);
                    return Ok(());
                }
                "class" => {
                    let stmt = self.class_def(Vec::new())?;
                    out.push(stmt);
                    return Ok(());
                }
                "async" => {
                    let offset = self.bump().offset;
                    let stmt = if self.at_kw("def") {
                        self.func_def(Vec::new(), Some(offset))?
                    } else if self.eat_kw("for") {
                        self.for_stmt(offset, true)?
                    } else if self.eat_kw("with") {
                        self.with_stmt(offset, true)?
                    } else {
                        return self.err("expected def, for, or with after async");
                    };
                    out.push(stmt);
                    return Ok(());
                }
                "match" => {
                    let mark = self.mark();
                    match self.match_stmt() {
                        Ok(stmt) => {
                            out.push(stmt);
                            return Ok(());
                        }
                        Err(_) => self.reset(mark),
                    }
                }
                "type" => {
                    let mark = self.mark();
                    match self.type_alias() {
                        Ok(stmt) => {
                            out.push(stmt);
                            return Ok(());
                        }
                        Err(_) => self.reset(mark),
                    }
                }
                _ => {}
            }
        }
        self.simple_line(out)
    }

    fn simple_line(&mut self, out: &mut Vec<Stmt>) -> PResult<()> {
        out.push(self.small_stmt()?);
        while self.eat_op(";") {
            if self.at_kind(LexKind::Newline) || self.at_kind(LexKind::End) {
                break;
            }
            out.push(self.small_stmt()?);
        }
        self.expect_newline()
    }

    fn small_stmt(&mut self) -> PResult<Stmt> {
        let lex = self.cur();
        if lex.kind == LexKind::Name {
            let offset = lex.offset;
            match lex.text {
                "pass" => {
                    self.bump();
                    return Ok(Stmt::Pass { offset });
                }
                "break" => {
                    self.bump();
                    return Ok(Stmt::Break { offset });
                }
                "continue" => {
                    self.bump();
                    return Ok(Stmt::Continue { offset });
                }
                "return" => {
                    self.bump();
                    let value = if self.can_start_expr() || self.at_kw("yield") {
                        Some(self.testlist_star()?)
                    } else {
                        None
                    };
                    return Ok(Stmt::Return { offset, value });
                }
                "raise" => {
                    self.bump();
                    let exc = if self.can_start_expr() {
                        Some(self.test()?)
                    } else {
                        None
                    };
                    let cause = if exc.is_some() && self.eat_kw("from") {
                        Some(self.test()?)
                    } else {
                        None
                    };
                    return Ok(Stmt::Raise { offset, exc, cause });
                }
                "global" | "nonlocal" => {
                    let is_global = lex.text == "global";
                    self.bump();
                    let mut names = vec![self.expect_name()?.0];
                    while self.eat_op(",") {
                        names.push(self.expect_name()?.0);
                    }
                    return Ok(if is_global {
                        Stmt::Global { offset, names }
                    } else {
                        Stmt::Nonlocal { offset, names }
                    });
                }
                "del" => {
                    self.bump();
                    let targets = match self.target_list()? {
                        Expr::Tuple {
                            elts,
                            parenthesized: false,
                            ..
                        } => elts,
                        single => vec![single],
                    };
                    return Ok(Stmt::Del { offset, targets });
                }
                "assert" => {
                    self.bump();
                    let test = self.test()?;
                    let msg = if self.eat_op(",") {
                        Some(self.test()?)
                    } else {
                        None
                    };
                    return Ok(Stmt::Assert { offset, test, msg });
                }
                "import" => return self.import_name(),
                "from" => return self.import_from(),
                "yield" => {
                    let value = self.yield_expr()?;
                    return Ok(Stmt::Expr { offset, value });
                }
                _ => {}
            }
        }
        self.expr_stmt()
    }

    fn expr_stmt(&mut self) -> PResult<Stmt> {
        let offset = self.cur().offset;
        let first = self.testlist_star()?;
        if self.eat_op(":") {
            let annotation = self.test()?;
            let value = if self.eat_op("=") {
                Some(self.assign_value()?)
            } else {
                None
            };
            return Ok(Stmt::AnnAssign {
                offset,
                target: first,
                annotation,
                value,
            });
        }
        if self.cur().kind == LexKind::Op && AUG_OPS.contains(&self.cur().text) {
            self.bump();
            let value = self.assign_value()?;
            return Ok(Stmt::AugAssign {
                offset,
                target: first,
                value,
            });
        }
        if self.eat_op("=") {
            let mut targets = vec![first];
            let mut value = self.assign_value()?;
            while self.eat_op("=") {
                let next = self.assign_value()?;
                targets.push(value);
                value = next;
            }
            return Ok(Stmt::Assign {
                offset,
                targets,
                value,
            });
        }
        Ok(Stmt::Expr {
            offset,
            value: first,
        })
    }

    fn assign_value(&mut self) -> PResult<Expr> {
        if self.at_kw("yield") {
            self.yield_expr()
        } else {
            self.testlist_star()
        }
    }

    fn import_name(&mut self) -> PResult<Stmt> {
        let offset = self.expect_kw("import")?;
        let mut names = vec![self.dotted_alias()?];
        while self.eat_op(",") {
            names.push(self.dotted_alias()?);
        }
        Ok(Stmt::Import { offset, names })
    }

    fn dotted_alias(&mut self) -> PResult<Alias> {
        let (mut name, offset) = self.expect_name()?;
        while self.eat_op(".") {
            let (part, _) = self.expect_name()?;
            name.push('.');
            name.push_str(&part);
        }
        let asname = if self.eat_kw("as") {
            Some(self.expect_name()?.0)
        } else {
            None
        };
        Ok(Alias {
            offset,
            name,
            asname,
        })
    }

    fn import_from(&mut self) -> PResult<Stmt> {
        let offset = self.expect_kw("from")?;
        let mut level = 0u32;
        loop {
            if self.eat_op(".") {
                level += 1;
            } else if self.eat_op("...") {
                level += 3;
            } else {
                break;
            }
        }
        let module = if self.at_name() {
            let (mut name, _) = self.expect_name()?;
            while self.eat_op(".") {
                let (part, _) = self.expect_name()?;
                name.push('.');
                name.push_str(&part);
            }
            Some(name)
        } else {
            None
        };
        self.expect_kw("import")?;
        let mut names = Vec::new();
        if self.at_op("*") {
            let star = self.bump();
            names.push(Alias {
                offset: star.offset,
                name: "*".to_string(),
                asname: None,
            });
        } else if self.eat_op("(") {
            loop {
                if self.at_op(")") {
                    break;
                }
                names.push(self.plain_alias()?);
                if !self.eat_op(",") {
                    break;
                }
            }
            self.expect_op(")")?;
        } else {
            names.push(self.plain_alias()?);
            while self.eat_op(",") {
                names.push(self.plain_alias()?);
            }
        }
        Ok(Stmt::ImportFrom {
            offset,
            module,
            names,
            level,
        })
    }

    fn plain_alias(&mut self) -> PResult<Alias> {
        let (name, offset) = self.expect_name()?;
        let asname = if self.eat_kw("as") {
            Some(self.expect_name()?.0)
        } else {
            None
        };
        Ok(Alias {
            offset,
            name,
            asname,
        })
    }

    fn if_stmt(&mut self) -> PResult<Stmt> {
        let offset = self.bump().offset;
        let test = self.namedexpr()?;
        let body = self.suite()?;
        let orelse = self.else_clause()?;
        Ok(Stmt::If {
            offset,
            test,
            body,
            orelse,
        })
    }

    fn else_clause(&mut self) -> PResult<Vec<Stmt>> {
        if self.at_kw("elif") {
            // An elif chain nests as a single-statement else body.
            let offset = self.bump().offset;
            let test = self.namedexpr()?;
            let body = self.suite()?;
            let orelse = self.else_clause()?;
            Ok(vec![Stmt::If {
                offset,
                test,
                body,
                orelse,
            }])
        } else if self.eat_kw("else") {
            self.suite()
        } else {
            Ok(Vec::new())
        }
    }

    fn while_stmt(&mut self) -> PResult<Stmt> {
        let offset = self.bump().offset;
        let test = self.namedexpr()?;
        let body = self.suite()?;
        let orelse = if self.eat_kw("else") {
            self.suite()?
        } else {
            Vec::new()
        };
        Ok(Stmt::While {
            offset,
            test,
            body,
            orelse,
        })
    }

    fn for_stmt(&mut self, offset: Offset, is_async: bool) -> PResult<Stmt> {
        let target = self.target_list()?;
        self.expect_kw("in")?;
        let iter = self.testlist_star()?;
        let body = self.suite()?;
        let orelse = if self.eat_kw("else") {
            self.suite()?
        } else {
            Vec::new()
        };
        Ok(Stmt::For {
            offset,
            target,
            iter,
            body,
            orelse,
            is_async,
        })
    }

    fn try_stmt(&mut self) -> PResult<Stmt> {
        let offset = self.bump().offset;
        let body = self.suite()?;
        let mut handlers = Vec::new();
        while self.eat_kw("except") {
            self.eat_op("*");
            let typ = if self.at_op(":") {
                None
            } else {
                Some(self.test()?)
            };
            let name = if self.eat_kw("as") {
                Some(self.expect_name()?.0)
            } else {
                None
            };
            let handler_body = self.suite()?;
            handlers.push(ExceptHandler {
                typ,
                name,
                body: handler_body,
            });
        }
        let orelse = if self.eat_kw("else") {
            self.suite()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat_kw("finally") {
            self.suite()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return self.err("expected except or finally after try body");
        }
        Ok(Stmt::Try {
            offset,
            body,
            handlers,
            orelse,
            finalbody,
        })
    }

    fn with_stmt(&mut self, offset: Offset, is_async: bool) -> PResult<Stmt> {
        let items = if self.at_op("(") {
            let mark = self.mark();
            match self.paren_with_items() {
                Ok(items) => items,
                Err(_) => {
                    self.reset(mark);
                    self.plain_with_items()?
                }
            }
        } else {
            self.plain_with_items()?
        };
        let body = self.suite()?;
        Ok(Stmt::With {
            offset,
            items,
            body,
            is_async,
        })
    }

    /// The parenthesized with-items form; only accepted when the closing
    /// paren is directly followed by the suite colon, otherwise the caller
    /// rewinds and re-parses the parens as an expression.
    fn paren_with_items(&mut self) -> PResult<Vec<WithItem>> {
        self.expect_op("(")?;
        let mut items = Vec::new();
        loop {
            if self.at_op(")") {
                break;
            }
            items.push(self.with_item()?);
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op(")")?;
        if items.is_empty() || !self.at_op(":") {
            return self.err("not a parenthesized with-items list");
        }
        Ok(items)
    }

    fn plain_with_items(&mut self) -> PResult<Vec<WithItem>> {
        let mut items = vec![self.with_item()?];
        while self.eat_op(",") {
            items.push(self.with_item()?);
        }
        Ok(items)
    }

    fn with_item(&mut self) -> PResult<WithItem> {
        let context = self.test()?;
        let vars = if self.eat_kw("as") {
            Some(self.target()?)
        } else {
            None
        };
        Ok(WithItem { context, vars })
    }

    fn decorated(&mut self) -> PResult<Stmt> {
        let mut decorators = Vec::new();
        while self.eat_op("@") {
            decorators.push(self.namedexpr()?);
            self.expect_newline()?;
        }
        if self.at_kw("def") {
            self.func_def(decorators, None)
        } else if self.at_kw("class") {
            self.class_def(decorators)
        } else if self.at_kw("async") {
            let offset = self.bump().offset;
            if self.at_kw("def") {
                self.func_def(decorators, Some(offset))
            } else {
                self.err("expected def after async")
            }
        } else {
            self.err("expected def or class after decorators")
        }
    }

    fn func_def(&mut self, decorators: Vec<Expr>, async_offset: Option<Offset>) -> PResult<Stmt> {
        let def_offset = self.expect_kw("def")?;
        let offset = async_offset.unwrap_or(def_offset);
        let (name, _) = self.expect_name()?;
        let type_params = if self.at_op("[") {
            self.type_params()?
        } else {
            Vec::new()
        };
        self.expect_op("(")?;
        let params = self.parameters(")", true)?;
        self.expect_op(")")?;
        let returns = if self.eat_op("->") {
            Some(self.test()?)
        } else {
            None
        };
        let body = self.suite()?;
        Ok(Stmt::FunctionDef {
            offset,
            name,
            type_params,
            params,
            returns,
            body,
            decorators,
            is_async: async_offset.is_some(),
        })
    }

    fn class_def(&mut self, decorators: Vec<Expr>) -> PResult<Stmt> {
        let offset = self.expect_kw("class")?;
        let (name, _) = self.expect_name()?;
        let type_params = if self.at_op("[") {
            self.type_params()?
        } else {
            Vec::new()
        };
        let (bases, keywords) = if self.eat_op("(") {
            let parsed = self.call_args()?;
            self.expect_op(")")?;
            parsed
        } else {
            (Vec::new(), Vec::new())
        };
        let body = self.suite()?;
        Ok(Stmt::ClassDef {
            offset,
            name,
            type_params,
            bases,
            keywords,
            body,
            decorators,
        })
    }

    fn type_params(&mut self) -> PResult<Vec<TypeParam>> {
        self.expect_op("[")?;
        let mut params = Vec::new();
        loop {
            if self.at_op("]") {
                break;
            }
            if self.eat_op("*") || self.eat_op("**") {
                // TypeVarTuple / ParamSpec entries.
            }
            let (name, offset) = self.expect_name()?;
            let bound = if self.eat_op(":") {
                Some(self.test()?)
            } else {
                None
            };
            let default = if self.eat_op("=") {
                Some(self.test()?)
            } else {
                None
            };
            params.push(TypeParam {
                offset,
                name,
                bound,
                default,
            });
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op("]")?;
        Ok(params)
    }

    fn type_alias(&mut self) -> PResult<Stmt> {
        let offset = self.expect_kw("type")?;
        if !self.at_name() {
            return self.err("expected a name after type");
        }
        let (name, _) = self.expect_name()?;
        let type_params = if self.at_op("[") {
            self.type_params()?
        } else {
            Vec::new()
        };
        if !self.eat_op("=") {
            return self.err("expected = in type alias");
        }
        let value = self.test()?;
        self.expect_newline()?;
        Ok(Stmt::TypeAlias {
            offset,
            name,
            type_params,
            value,
        })
    }

    fn suite(&mut self) -> PResult<Vec<Stmt>> {
        self.expect_op(":")?;
        let mut body = Vec::new();
        if self.eat_kind(LexKind::Newline) {
            if !self.eat_kind(LexKind::Indent) {
                return self.err("expected an indented block");
            }
            while !self.at_kind(LexKind::Dedent) && !self.at_kind(LexKind::End) {
                self.statement(&mut body)?;
            }
            self.eat_kind(LexKind::Dedent);
            if body.is_empty() {
                return self.err("expected an indented block");
            }
        } else {
            self.simple_line(&mut body)?;
        }
        Ok(body)
    }

    // ------------------------------------------------------------------
    // Match statements
    // ------------------------------------------------------------------

    fn match_stmt(&mut self) -> PResult<Stmt> {
        let offset = self.expect_kw("match")?;
        let subject = self.testlist_star()?;
        self.expect_op(":")?;
        if !self.eat_kind(LexKind::Newline) {
            return self.err("expected a newline after match subject");
        }
        if !self.eat_kind(LexKind::Indent) {
            return self.err("expected an indented case block");
        }
        let mut cases = Vec::new();
        while self.at_kw("case") {
            cases.push(self.case_clause()?);
        }
        if cases.is_empty() {
            return self.err("expected at least one case clause");
        }
        if !self.eat_kind(LexKind::Dedent) && !self.at_kind(LexKind::End) {
            return self.err("expected end of case block");
        }
        Ok(Stmt::Match {
            offset,
            subject,
            cases,
        })
    }

    fn case_clause(&mut self) -> PResult<MatchCase> {
        self.bump(); // the `case` soft keyword
        let pattern = self.open_pattern()?;
        let guard = if self.eat_kw("if") {
            Some(self.namedexpr()?)
        } else {
            None
        };
        let body = self.suite()?;
        Ok(MatchCase {
            pattern,
            guard,
            body,
        })
    }

    /// A case clause's pattern list: `a, b` without brackets is an open
    /// sequence pattern anchored at its first element.
    fn open_pattern(&mut self) -> PResult<Pattern> {
        let first = self.sequence_item()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let offset = first.offset();
        let mut patterns = vec![first];
        while self.eat_op(",") {
            if self.at_op(":") || self.at_kw("if") {
                break;
            }
            patterns.push(self.sequence_item()?);
        }
        Ok(Pattern::MatchSequence { offset, patterns })
    }

    fn sequence_item(&mut self) -> PResult<Pattern> {
        if self.at_op("*") {
            let offset = self.bump().offset;
            let (name, _) = self.expect_name()?;
            let name = if name == "_" { None } else { Some(name) };
            return Ok(Pattern::MatchStar { offset, name });
        }
        self.pattern()
    }

    fn pattern(&mut self) -> PResult<Pattern> {
        let p = self.or_pattern()?;
        if self.eat_kw("as") {
            let offset = p.offset();
            let (name, _) = self.expect_name()?;
            return Ok(Pattern::MatchAs {
                offset,
                pattern: Some(Box::new(p)),
                name: Some(name),
            });
        }
        Ok(p)
    }

    fn or_pattern(&mut self) -> PResult<Pattern> {
        let first = self.closed_pattern()?;
        if !self.at_op("|") {
            return Ok(first);
        }
        let offset = first.offset();
        let mut patterns = vec![first];
        while self.eat_op("|") {
            patterns.push(self.closed_pattern()?);
        }
        Ok(Pattern::MatchOr { offset, patterns })
    }

    fn closed_pattern(&mut self) -> PResult<Pattern> {
        let lex = self.cur();
        let offset = lex.offset;
        match lex.kind {
            LexKind::Op => match lex.text {
                "(" => {
                    self.bump();
                    if self.eat_op(")") {
                        return Ok(Pattern::MatchSequence {
                            offset,
                            patterns: Vec::new(),
                        });
                    }
                    let first = self.sequence_item()?;
                    if self.at_op(",") {
                        let mut patterns = vec![first];
                        while self.eat_op(",") {
                            if self.at_op(")") {
                                break;
                            }
                            patterns.push(self.sequence_item()?);
                        }
                        self.expect_op(")")?;
                        return Ok(Pattern::MatchSequence { offset, patterns });
                    }
                    self.expect_op(")")?;
                    Ok(first)
                }
                "[" => {
                    self.bump();
                    let mut patterns = Vec::new();
                    loop {
                        if self.at_op("]") {
                            break;
                        }
                        patterns.push(self.sequence_item()?);
                        if !self.eat_op(",") {
                            break;
                        }
                    }
                    self.expect_op("]")?;
                    Ok(Pattern::MatchSequence { offset, patterns })
                }
                "{" => self.mapping_pattern(),
                "*" => self.sequence_item(),
                "-" => {
                    let value = self.literal_number()?;
                    Ok(Pattern::MatchValue { offset, value })
                }
                _ => self.err("expected a pattern"),
            },
            LexKind::Number => {
                let value = self.literal_number()?;
                Ok(Pattern::MatchValue { offset, value })
            }
            LexKind::Str => {
                while self.at_kind(LexKind::Str) {
                    self.bump();
                }
                Ok(Pattern::MatchValue {
                    offset,
                    value: Expr::Constant { offset },
                })
            }
            LexKind::Name => match lex.text {
                "None" | "True" | "False" => {
                    self.bump();
                    Ok(Pattern::MatchSingleton { offset })
                }
                text if !KEYWORDS.contains(&text) => self.name_pattern(),
                _ => self.err("expected a pattern"),
            },
            _ => self.err("expected a pattern"),
        }
    }

    fn mapping_pattern(&mut self) -> PResult<Pattern> {
        let offset = self.expect_op("{")?;
        let mut keys = Vec::new();
        let mut patterns = Vec::new();
        let mut rest = None;
        loop {
            if self.at_op("}") {
                break;
            }
            if self.eat_op("**") {
                rest = Some(self.expect_name()?.0);
            } else {
                keys.push(self.mapping_key()?);
                self.expect_op(":")?;
                patterns.push(self.pattern()?);
            }
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op("}")?;
        Ok(Pattern::MatchMapping {
            offset,
            keys,
            patterns,
            rest,
        })
    }

    /// Mapping keys are literals or dotted values.
    fn mapping_key(&mut self) -> PResult<Expr> {
        let lex = self.cur();
        let offset = lex.offset;
        match lex.kind {
            LexKind::Number => self.literal_number(),
            LexKind::Op if lex.text == "-" => self.literal_number(),
            LexKind::Str => {
                while self.at_kind(LexKind::Str) {
                    self.bump();
                }
                Ok(Expr::Constant { offset })
            }
            LexKind::Name if matches!(lex.text, "None" | "True" | "False") => {
                self.bump();
                Ok(Expr::Constant { offset })
            }
            LexKind::Name if !KEYWORDS.contains(&lex.text) => self.dotted_value(),
            _ => self.err("expected a mapping pattern key"),
        }
    }

    /// A number literal pattern, with optional sign and `1+2j` complex form.
    fn literal_number(&mut self) -> PResult<Expr> {
        let offset = self.cur().offset;
        self.eat_op("-");
        if !self.at_kind(LexKind::Number) {
            return self.err("expected a number");
        }
        self.bump();
        if (self.at_op("+") || self.at_op("-")) && self.next().kind == LexKind::Number {
            self.bump();
            self.bump();
        }
        Ok(Expr::Constant { offset })
    }

    fn dotted_value(&mut self) -> PResult<Expr> {
        let (name, offset) = self.expect_name()?;
        let mut expr = Expr::Name { offset, id: name };
        while self.eat_op(".") {
            let (attr, _) = self.expect_name()?;
            expr = Expr::Attribute {
                offset,
                value: Box::new(expr),
                attr,
            };
        }
        Ok(expr)
    }

    fn name_pattern(&mut self) -> PResult<Pattern> {
        let offset = self.cur().offset;
        let dotted = self.next().kind == LexKind::Op && self.next().text == ".";
        let cls_or_name = self.dotted_value()?;
        if self.at_op("(") {
            return self.class_pattern(offset, cls_or_name);
        }
        if dotted {
            return Ok(Pattern::MatchValue {
                offset,
                value: cls_or_name,
            });
        }
        let name = match cls_or_name {
            Expr::Name { id, .. } => id,
            _ => return self.err("expected a capture name"),
        };
        if name == "_" {
            Ok(Pattern::MatchAs {
                offset,
                pattern: None,
                name: None,
            })
        } else {
            Ok(Pattern::MatchAs {
                offset,
                pattern: None,
                name: Some(name),
            })
        }
    }

    fn class_pattern(&mut self, offset: Offset, cls: Expr) -> PResult<Pattern> {
        self.expect_op("(")?;
        let mut patterns = Vec::new();
        let mut kwd_attrs = Vec::new();
        let mut kwd_patterns = Vec::new();
        loop {
            if self.at_op(")") {
                break;
            }
            if self.at_name() && self.next().kind == LexKind::Op && self.next().text == "=" {
                let (attr, _) = self.expect_name()?;
                self.expect_op("=")?;
                kwd_attrs.push(attr);
                kwd_patterns.push(self.pattern()?);
            } else {
                patterns.push(self.pattern()?);
            }
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op(")")?;
        Ok(Pattern::MatchClass {
            offset,
            cls,
            patterns,
            kwd_attrs,
            kwd_patterns,
        })
    }

    // ------------------------------------------------------------------
    // Targets (assignment / for / with-as): `in` must not be consumed
    // ------------------------------------------------------------------

    fn target_list(&mut self) -> PResult<Expr> {
        let offset = self.cur().offset;
        let first = self.target()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if !self.can_start_expr() {
                break;
            }
            elts.push(self.target()?);
        }
        Ok(Expr::Tuple {
            offset,
            elts,
            parenthesized: false,
        })
    }

    fn target(&mut self) -> PResult<Expr> {
        if self.at_op("*") {
            let offset = self.bump().offset;
            let value = self.target()?;
            return Ok(Expr::Starred {
                offset,
                value: Box::new(value),
            });
        }
        if self.at_op("(") {
            let offset = self.bump().offset;
            if self.eat_op(")") {
                return Ok(Expr::Tuple {
                    offset,
                    elts: Vec::new(),
                    parenthesized: true,
                });
            }
            let first = self.target()?;
            if self.at_op(",") {
                let mut elts = vec![first];
                while self.eat_op(",") {
                    if self.at_op(")") {
                        break;
                    }
                    elts.push(self.target()?);
                }
                self.expect_op(")")?;
                return Ok(Expr::Tuple {
                    offset,
                    elts,
                    parenthesized: true,
                });
            }
            self.expect_op(")")?;
            return Ok(first);
        }
        if self.at_op("[") {
            let offset = self.bump().offset;
            let mut elts = Vec::new();
            loop {
                if self.at_op("]") {
                    break;
                }
                elts.push(self.target()?);
                if !self.eat_op(",") {
                    break;
                }
            }
            self.expect_op("]")?;
            return Ok(Expr::List { offset, elts });
        }
        self.postfix()
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// `a, b, c` at statement level: a bare tuple anchored at the first
    /// token of its first element — grouping parens included, which is why
    /// the anchor is captured here rather than taken from the element.
    fn testlist_star(&mut self) -> PResult<Expr> {
        let offset = self.cur().offset;
        let first = self.star_or_named()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if !self.can_start_expr() {
                break;
            }
            elts.push(self.star_or_named()?);
        }
        Ok(Expr::Tuple {
            offset,
            elts,
            parenthesized: false,
        })
    }

    fn star_or_named(&mut self) -> PResult<Expr> {
        if self.at_op("*") {
            let offset = self.bump().offset;
            let value = self.bitor()?;
            return Ok(Expr::Starred {
                offset,
                value: Box::new(value),
            });
        }
        self.namedexpr()
    }

    fn namedexpr(&mut self) -> PResult<Expr> {
        let target = self.test()?;
        if self.eat_op(":=") {
            let offset = target.offset();
            let value = self.test()?;
            return Ok(Expr::NamedExpr {
                offset,
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        Ok(target)
    }

    fn test(&mut self) -> PResult<Expr> {
        if self.at_kw("lambda") {
            return self.lambda();
        }
        let body = self.or_test()?;
        if self.eat_kw("if") {
            let offset = body.offset();
            let test = self.or_test()?;
            self.expect_kw("else")?;
            let orelse = self.test()?;
            return Ok(Expr::IfExp {
                offset,
                body: Box::new(body),
                test: Box::new(test),
                orelse: Box::new(orelse),
            });
        }
        Ok(body)
    }

    fn lambda(&mut self) -> PResult<Expr> {
        let offset = self.expect_kw("lambda")?;
        let params = self.parameters(":", false)?;
        self.expect_op(":")?;
        let body = self.test()?;
        Ok(Expr::Lambda {
            offset,
            params: Box::new(params),
            body: Box::new(body),
        })
    }

    fn or_test(&mut self) -> PResult<Expr> {
        let first = self.and_test()?;
        if !self.at_kw("or") {
            return Ok(first);
        }
        let offset = first.offset();
        let mut values = vec![first];
        while self.eat_kw("or") {
            values.push(self.and_test()?);
        }
        Ok(Expr::BoolOp { offset, values })
    }

    fn and_test(&mut self) -> PResult<Expr> {
        let first = self.not_test()?;
        if !self.at_kw("and") {
            return Ok(first);
        }
        let offset = first.offset();
        let mut values = vec![first];
        while self.eat_kw("and") {
            values.push(self.not_test()?);
        }
        Ok(Expr::BoolOp { offset, values })
    }

    fn not_test(&mut self) -> PResult<Expr> {
        if self.at_kw("not") {
            let offset = self.bump().offset;
            let operand = self.not_test()?;
            return Ok(Expr::UnaryOp {
                offset,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let left = self.bitor()?;
        let mut comparators = Vec::new();
        loop {
            let is_cmp = match self.cur().kind {
                LexKind::Op => matches!(self.cur().text, "<" | ">" | "<=" | ">=" | "==" | "!="),
                LexKind::Name => match self.cur().text {
                    "in" => true,
                    "is" => true,
                    "not" => self.next().kind == LexKind::Name && self.next().text == "in",
                    _ => false,
                },
                _ => false,
            };
            if !is_cmp {
                break;
            }
            if self.at_kw("not") {
                self.bump();
                self.expect_kw("in")?;
            } else if self.eat_kw("is") {
                self.eat_kw("not");
            } else {
                self.bump();
            }
            comparators.push(self.bitor()?);
        }
        if comparators.is_empty() {
            return Ok(left);
        }
        let offset = left.offset();
        Ok(Expr::Compare {
            offset,
            left: Box::new(left),
            comparators,
        })
    }

    fn binary_level(
        &mut self,
        ops: &[&str],
        next: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let mut left = next(self)?;
        while self.cur().kind == LexKind::Op && ops.contains(&self.cur().text) {
            self.bump();
            let right = next(self)?;
            let offset = left.offset();
            left = Expr::BinOp {
                offset,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn bitor(&mut self) -> PResult<Expr> {
        self.binary_level(&["|"], Self::bitxor)
    }

    fn bitxor(&mut self) -> PResult<Expr> {
        self.binary_level(&["^"], Self::bitand)
    }

    fn bitand(&mut self) -> PResult<Expr> {
        self.binary_level(&["&"], Self::shift)
    }

    fn shift(&mut self) -> PResult<Expr> {
        self.binary_level(&["<<", ">>"], Self::arith)
    }

    fn arith(&mut self) -> PResult<Expr> {
        self.binary_level(&["+", "-"], Self::term)
    }

    fn term(&mut self) -> PResult<Expr> {
        self.binary_level(&["*", "/", "//", "%", "@"], Self::factor)
    }

    fn factor(&mut self) -> PResult<Expr> {
        if self.cur().kind == LexKind::Op && matches!(self.cur().text, "+" | "-" | "~") {
            let offset = self.bump().offset;
            let operand = self.factor()?;
            return Ok(Expr::UnaryOp {
                offset,
                operand: Box::new(operand),
            });
        }
        self.power()
    }

    fn power(&mut self) -> PResult<Expr> {
        let base = self.await_primary()?;
        if self.eat_op("**") {
            let offset = base.offset();
            let exp = self.factor()?;
            return Ok(Expr::BinOp {
                offset,
                left: Box::new(base),
                right: Box::new(exp),
            });
        }
        Ok(base)
    }

    fn await_primary(&mut self) -> PResult<Expr> {
        if self.at_kw("await") {
            let offset = self.bump().offset;
            let value = self.await_primary()?;
            return Ok(Expr::Await {
                offset,
                value: Box::new(value),
            });
        }
        self.postfix()
    }

    /// An atom followed by call/subscript/attribute trailers. The whole
    /// chain anchors at the first token of the atom, parens included — this
    /// is the anchor convention call fixes key on.
    fn postfix(&mut self) -> PResult<Expr> {
        let start = self.cur().offset;
        let mut expr = self.atom()?;
        loop {
            if self.at_op("(") {
                self.bump();
                let (args, keywords) = self.call_args()?;
                self.expect_op(")")?;
                expr = Expr::Call {
                    offset: start,
                    func: Box::new(expr),
                    args,
                    keywords,
                };
            } else if self.at_op("[") {
                self.bump();
                let slice = self.slices()?;
                self.expect_op("]")?;
                expr = Expr::Subscript {
                    offset: start,
                    value: Box::new(expr),
                    slice: Box::new(slice),
                };
            } else if self.at_op(".") {
                self.bump();
                if !self.at_kind(LexKind::Name) {
                    return self.err("expected an attribute name");
                }
                let attr = self.bump().text.to_string();
                expr = Expr::Attribute {
                    offset: start,
                    value: Box::new(expr),
                    attr,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn call_args(&mut self) -> PResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        loop {
            if self.at_op(")") {
                break;
            }
            if self.at_op("*") {
                let offset = self.bump().offset;
                let value = self.test()?;
                args.push(Expr::Starred {
                    offset,
                    value: Box::new(value),
                });
            } else if self.at_op("**") {
                let offset = self.bump().offset;
                let value = self.test()?;
                keywords.push(Keyword {
                    offset,
                    arg: None,
                    value,
                });
            } else if self.at_name()
                && self.next().kind == LexKind::Op
                && self.next().text == "="
            {
                let (name, offset) = self.expect_name()?;
                self.expect_op("=")?;
                let value = self.test()?;
                keywords.push(Keyword {
                    offset,
                    arg: Some(name),
                    value,
                });
            } else {
                let value = self.namedexpr()?;
                if self.at_comp_for() {
                    let offset = value.offset();
                    let generators = self.comp_clauses()?;
                    args.push(Expr::GeneratorExp {
                        offset,
                        elt: Box::new(value),
                        generators,
                    });
                } else {
                    args.push(value);
                }
            }
            if !self.eat_op(",") {
                break;
            }
        }
        Ok((args, keywords))
    }

    fn at_comp_for(&self) -> bool {
        self.at_kw("for")
            || (self.at_kw("async") && self.next().kind == LexKind::Name && self.next().text == "for")
    }

    fn comp_clauses(&mut self) -> PResult<Vec<Comprehension>> {
        let mut generators = Vec::new();
        while self.at_comp_for() {
            let is_async = self.eat_kw("async");
            self.expect_kw("for")?;
            let target = self.target_list()?;
            self.expect_kw("in")?;
            let iter = self.or_test()?;
            let mut ifs = Vec::new();
            while self.eat_kw("if") {
                ifs.push(self.or_test()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        Ok(generators)
    }

    fn slices(&mut self) -> PResult<Expr> {
        let offset = self.cur().offset;
        let first = self.slice_item()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_op("]") {
                break;
            }
            elts.push(self.slice_item()?);
        }
        Ok(Expr::Tuple {
            offset,
            elts,
            parenthesized: false,
        })
    }

    fn slice_item(&mut self) -> PResult<Expr> {
        let offset = self.cur().offset;
        let lower = if self.at_op(":") {
            None
        } else if self.at_op("*") {
            let star_offset = self.bump().offset;
            let value = self.bitor()?;
            let starred = Expr::Starred {
                offset: star_offset,
                value: Box::new(value),
            };
            if !self.at_op(":") {
                return Ok(starred);
            }
            Some(starred)
        } else {
            let e = self.namedexpr()?;
            if !self.at_op(":") {
                return Ok(e);
            }
            Some(e)
        };
        self.expect_op(":")?;
        let upper = if self.at_op(":") || self.at_op("]") || self.at_op(",") {
            None
        } else {
            Some(self.test()?)
        };
        let step = if self.eat_op(":") {
            if self.at_op("]") || self.at_op(",") {
                None
            } else {
                Some(self.test()?)
            }
        } else {
            None
        };
        Ok(Expr::Slice {
            offset,
            lower: lower.map(Box::new),
            upper: upper.map(Box::new),
            step: step.map(Box::new),
        })
    }

    fn yield_expr(&mut self) -> PResult<Expr> {
        let offset = self.expect_kw("yield")?;
        if self.eat_kw("from") {
            let value = self.test()?;
            return Ok(Expr::YieldFrom {
                offset,
                value: Box::new(value),
            });
        }
        let value = if self.can_start_expr() {
            Some(Box::new(self.testlist_star()?))
        } else {
            None
        };
        Ok(Expr::Yield { offset, value })
    }

    fn atom(&mut self) -> PResult<Expr> {
        let lex = self.cur();
        let offset = lex.offset;
        match lex.kind {
            LexKind::Name => {
                if matches!(lex.text, "True" | "False" | "None") {
                    self.bump();
                    return Ok(Expr::Constant { offset });
                }
                if self.at_kw("lambda") {
                    return self.lambda();
                }
                if KEYWORDS.contains(&lex.text) {
                    return self.err(format!("unexpected keyword {:?}", lex.text));
                }
                self.bump();
                Ok(Expr::Name {
                    offset,
                    id: lex.text.to_string(),
                })
            }
            LexKind::Number => {
                self.bump();
                Ok(Expr::Constant { offset })
            }
            LexKind::Str => {
                while self.at_kind(LexKind::Str) {
                    self.bump();
                }
                Ok(Expr::Constant { offset })
            }
            LexKind::Op => match lex.text {
                "(" => self.paren_atom(),
                "[" => self.list_atom(),
                "{" => self.brace_atom(),
                "..." => {
                    self.bump();
                    Ok(Expr::Constant { offset })
                }
                _ => self.err(format!("unexpected token {:?}", lex.text)),
            },
            _ => self.err("expected an expression"),
        }
    }

    fn paren_atom(&mut self) -> PResult<Expr> {
        let offset = self.expect_op("(")?;
        if self.eat_op(")") {
            return Ok(Expr::Tuple {
                offset,
                elts: Vec::new(),
                parenthesized: true,
            });
        }
        if self.at_kw("yield") {
            let inner = self.yield_expr()?;
            self.expect_op(")")?;
            return Ok(inner);
        }
        let first = self.star_or_named()?;
        if self.at_comp_for() {
            let generators = self.comp_clauses()?;
            self.expect_op(")")?;
            return Ok(Expr::GeneratorExp {
                offset,
                elt: Box::new(first),
                generators,
            });
        }
        if self.at_op(",") {
            let mut elts = vec![first];
            while self.eat_op(",") {
                if self.at_op(")") {
                    break;
                }
                elts.push(self.star_or_named()?);
            }
            self.expect_op(")")?;
            return Ok(Expr::Tuple {
                offset,
                elts,
                parenthesized: true,
            });
        }
        self.expect_op(")")?;
        // A grouping paren: the inner expression keeps its own anchor.
        Ok(first)
    }

    fn list_atom(&mut self) -> PResult<Expr> {
        let offset = self.expect_op("[")?;
        if self.eat_op("]") {
            return Ok(Expr::List {
                offset,
                elts: Vec::new(),
            });
        }
        let first = self.star_or_named()?;
        if self.at_comp_for() {
            let generators = self.comp_clauses()?;
            self.expect_op("]")?;
            return Ok(Expr::ListComp {
                offset,
                elt: Box::new(first),
                generators,
            });
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_op("]") {
                break;
            }
            elts.push(self.star_or_named()?);
        }
        self.expect_op("]")?;
        Ok(Expr::List { offset, elts })
    }

    fn brace_atom(&mut self) -> PResult<Expr> {
        let offset = self.expect_op("{")?;
        if self.eat_op("}") {
            return Ok(Expr::Dict {
                offset,
                keys: Vec::new(),
                values: Vec::new(),
            });
        }
        if self.at_op("**") {
            self.bump();
            let value = self.bitor()?;
            return self.dict_rest(offset, vec![None], vec![value]);
        }
        let first = self.star_or_named()?;
        if self.at_op(":") {
            self.bump();
            let value = self.test()?;
            if self.at_comp_for() {
                let generators = self.comp_clauses()?;
                self.expect_op("}")?;
                return Ok(Expr::DictComp {
                    offset,
                    key: Box::new(first),
                    value: Box::new(value),
                    generators,
                });
            }
            return self.dict_rest(offset, vec![Some(first)], vec![value]);
        }
        if self.at_comp_for() {
            let generators = self.comp_clauses()?;
            self.expect_op("}")?;
            return Ok(Expr::SetComp {
                offset,
                elt: Box::new(first),
                generators,
            });
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_op("}") {
                break;
            }
            elts.push(self.star_or_named()?);
        }
        self.expect_op("}")?;
        Ok(Expr::Set { offset, elts })
    }

    fn dict_rest(
        &mut self,
        offset: Offset,
        mut keys: Vec<Option<Expr>>,
        mut values: Vec<Expr>,
    ) -> PResult<Expr> {
        while self.eat_op(",") {
            if self.at_op("}") {
                break;
            }
            if self.eat_op("**") {
                keys.push(None);
                values.push(self.bitor()?);
            } else {
                keys.push(Some(self.test()?));
                self.expect_op(":")?;
                values.push(self.test()?);
            }
        }
        self.expect_op("}")?;
        Ok(Expr::Dict {
            offset,
            keys,
            values,
        })
    }

    /// Parameter list for `def` (terminated by `)`) or `lambda` (terminated
    /// by `:`; no annotations).
    fn parameters(&mut self, term: &str, allow_annotations: bool) -> PResult<Parameters> {
        let mut params = Parameters::default();
        let mut kwonly = false;
        loop {
            if self.at_op(term) {
                break;
            }
            if self.eat_op("/") {
                params.posonly = std::mem::take(&mut params.args);
            } else if self.eat_op("*") {
                if self.at_op(",") || self.at_op(term) {
                    kwonly = true;
                } else {
                    params.vararg = Some(self.parameter(allow_annotations)?);
                    kwonly = true;
                }
            } else if self.eat_op("**") {
                params.kwarg = Some(self.parameter(allow_annotations)?);
            } else {
                let param = self.parameter(allow_annotations)?;
                if kwonly {
                    params.kwonly.push(param);
                } else {
                    params.args.push(param);
                }
            }
            if !self.eat_op(",") {
                break;
            }
        }
        Ok(params)
    }

    fn parameter(&mut self, allow_annotations: bool) -> PResult<Param> {
        let (name, offset) = self.expect_name()?;
        let annotation = if allow_annotations && self.eat_op(":") {
            Some(self.test()?)
        } else {
            None
        };
        let default = if self.eat_op("=") {
            Some(self.test()?)
        } else {
            None
        };
        Ok(Param {
            offset,
            name,
            annotation,
            default,
        })
    }
}
