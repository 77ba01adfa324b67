// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! AST node types.
//!
//! Every node records the source [`Offset`] of its first token, following the
//! anchor conventions consumers rely on: a call anchors at the start of its
//! whole postfix expression, a `def` at the `def`/`async` keyword, a
//! parenthesized tuple at its `(`, a bare tuple at its first element, and so
//! on. Only structure and positions are kept — literal values, operator
//! identities, and expression contexts are irrelevant to a whitespace-level
//! rewriter and are not stored.

use tugcomma_lex::Offset;

/// A parsed module: the root of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr {
        offset: Offset,
        value: Expr,
    },
    Assign {
        offset: Offset,
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        offset: Offset,
        target: Expr,
        value: Expr,
    },
    AnnAssign {
        offset: Offset,
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
    },
    Return {
        offset: Offset,
        value: Option<Expr>,
    },
    Pass {
        offset: Offset,
    },
    Break {
        offset: Offset,
    },
    Continue {
        offset: Offset,
    },
    Del {
        offset: Offset,
        targets: Vec<Expr>,
    },
    Assert {
        offset: Offset,
        test: Expr,
        msg: Option<Expr>,
    },
    Raise {
        offset: Offset,
        exc: Option<Expr>,
        cause: Option<Expr>,
    },
    Global {
        offset: Offset,
        names: Vec<String>,
    },
    Nonlocal {
        offset: Offset,
        names: Vec<String>,
    },
    Import {
        offset: Offset,
        names: Vec<Alias>,
    },
    ImportFrom {
        offset: Offset,
        module: Option<String>,
        names: Vec<Alias>,
        level: u32,
    },
    If {
        offset: Offset,
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        offset: Offset,
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        offset: Offset,
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        is_async: bool,
    },
    With {
        offset: Offset,
        items: Vec<WithItem>,
        body: Vec<Stmt>,
        is_async: bool,
    },
    Try {
        offset: Offset,
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
    FunctionDef {
        offset: Offset,
        name: String,
        type_params: Vec<TypeParam>,
        params: Parameters,
        returns: Option<Expr>,
        body: Vec<Stmt>,
        decorators: Vec<Expr>,
        is_async: bool,
    },
    ClassDef {
        offset: Offset,
        name: String,
        type_params: Vec<TypeParam>,
        bases: Vec<Expr>,
        keywords: Vec<Keyword>,
        body: Vec<Stmt>,
        decorators: Vec<Expr>,
    },
    Match {
        offset: Offset,
        subject: Expr,
        cases: Vec<MatchCase>,
    },
    TypeAlias {
        offset: Offset,
        name: String,
        type_params: Vec<TypeParam>,
        value: Expr,
    },
}

impl Stmt {
    pub fn offset(&self) -> Offset {
        match self {
            Stmt::Expr { offset, .. }
            | Stmt::Assign { offset, .. }
            | Stmt::AugAssign { offset, .. }
            | Stmt::AnnAssign { offset, .. }
            | Stmt::Return { offset, .. }
            | Stmt::Pass { offset }
            | Stmt::Break { offset }
            | Stmt::Continue { offset }
            | Stmt::Del { offset, .. }
            | Stmt::Assert { offset, .. }
            | Stmt::Raise { offset, .. }
            | Stmt::Global { offset, .. }
            | Stmt::Nonlocal { offset, .. }
            | Stmt::Import { offset, .. }
            | Stmt::ImportFrom { offset, .. }
            | Stmt::If { offset, .. }
            | Stmt::While { offset, .. }
            | Stmt::For { offset, .. }
            | Stmt::With { offset, .. }
            | Stmt::Try { offset, .. }
            | Stmt::FunctionDef { offset, .. }
            | Stmt::ClassDef { offset, .. }
            | Stmt::Match { offset, .. }
            | Stmt::TypeAlias { offset, .. } => *offset,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name {
        offset: Offset,
        id: String,
    },
    /// Any literal constant: number, string (including implicit
    /// concatenation), `None`/`True`/`False`, `...`.
    Constant {
        offset: Offset,
    },
    Tuple {
        offset: Offset,
        elts: Vec<Expr>,
        /// Whether the tuple is written with its own parentheses. A bare
        /// tuple anchors at its first element instead of a delimiter.
        parenthesized: bool,
    },
    List {
        offset: Offset,
        elts: Vec<Expr>,
    },
    Set {
        offset: Offset,
        elts: Vec<Expr>,
    },
    Dict {
        offset: Offset,
        /// `None` key marks a `**spread` entry.
        keys: Vec<Option<Expr>>,
        values: Vec<Expr>,
    },
    Starred {
        offset: Offset,
        value: Box<Expr>,
    },
    Call {
        offset: Offset,
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Attribute {
        offset: Offset,
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        offset: Offset,
        value: Box<Expr>,
        slice: Box<Expr>,
    },
    Slice {
        offset: Offset,
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    BoolOp {
        offset: Offset,
        values: Vec<Expr>,
    },
    BinOp {
        offset: Offset,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOp {
        offset: Offset,
        operand: Box<Expr>,
    },
    Compare {
        offset: Offset,
        left: Box<Expr>,
        comparators: Vec<Expr>,
    },
    IfExp {
        offset: Offset,
        body: Box<Expr>,
        test: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        offset: Offset,
        params: Box<Parameters>,
        body: Box<Expr>,
    },
    Await {
        offset: Offset,
        value: Box<Expr>,
    },
    Yield {
        offset: Offset,
        value: Option<Box<Expr>>,
    },
    YieldFrom {
        offset: Offset,
        value: Box<Expr>,
    },
    NamedExpr {
        offset: Offset,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    GeneratorExp {
        offset: Offset,
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    ListComp {
        offset: Offset,
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        offset: Offset,
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        offset: Offset,
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
}

impl Expr {
    pub fn offset(&self) -> Offset {
        match self {
            Expr::Name { offset, .. }
            | Expr::Constant { offset }
            | Expr::Tuple { offset, .. }
            | Expr::List { offset, .. }
            | Expr::Set { offset, .. }
            | Expr::Dict { offset, .. }
            | Expr::Starred { offset, .. }
            | Expr::Call { offset, .. }
            | Expr::Attribute { offset, .. }
            | Expr::Subscript { offset, .. }
            | Expr::Slice { offset, .. }
            | Expr::BoolOp { offset, .. }
            | Expr::BinOp { offset, .. }
            | Expr::UnaryOp { offset, .. }
            | Expr::Compare { offset, .. }
            | Expr::IfExp { offset, .. }
            | Expr::Lambda { offset, .. }
            | Expr::Await { offset, .. }
            | Expr::Yield { offset, .. }
            | Expr::YieldFrom { offset, .. }
            | Expr::NamedExpr { offset, .. }
            | Expr::GeneratorExp { offset, .. }
            | Expr::ListComp { offset, .. }
            | Expr::SetComp { offset, .. }
            | Expr::DictComp { offset, .. } => *offset,
        }
    }

    pub fn is_generator_exp(&self) -> bool {
        matches!(self, Expr::GeneratorExp { .. })
    }

    pub fn is_starred(&self) -> bool {
        matches!(self, Expr::Starred { .. })
    }
}

// ============================================================================
// Patterns
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    MatchValue {
        offset: Offset,
        value: Expr,
    },
    MatchSingleton {
        offset: Offset,
    },
    MatchSequence {
        offset: Offset,
        patterns: Vec<Pattern>,
    },
    MatchMapping {
        offset: Offset,
        keys: Vec<Expr>,
        patterns: Vec<Pattern>,
        rest: Option<String>,
    },
    MatchClass {
        offset: Offset,
        cls: Expr,
        patterns: Vec<Pattern>,
        kwd_attrs: Vec<String>,
        kwd_patterns: Vec<Pattern>,
    },
    MatchStar {
        offset: Offset,
        name: Option<String>,
    },
    MatchAs {
        offset: Offset,
        pattern: Option<Box<Pattern>>,
        name: Option<String>,
    },
    MatchOr {
        offset: Offset,
        patterns: Vec<Pattern>,
    },
}

impl Pattern {
    pub fn offset(&self) -> Offset {
        match self {
            Pattern::MatchValue { offset, .. }
            | Pattern::MatchSingleton { offset }
            | Pattern::MatchSequence { offset, .. }
            | Pattern::MatchMapping { offset, .. }
            | Pattern::MatchClass { offset, .. }
            | Pattern::MatchStar { offset, .. }
            | Pattern::MatchAs { offset, .. }
            | Pattern::MatchOr { offset, .. } => *offset,
        }
    }
}

// ============================================================================
// Supporting nodes
// ============================================================================

/// A keyword argument `name=value`, or a `**spread` when `arg` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub offset: Offset,
    pub arg: Option<String>,
    pub value: Expr,
}

/// An import alias `name` or `name as asname`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub offset: Offset,
    pub name: String,
    pub asname: Option<String>,
}

/// One function or lambda parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub offset: Offset,
    pub name: String,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
}

/// The full parameter list of a function or lambda.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub posonly: Vec<Param>,
    pub args: Vec<Param>,
    pub vararg: Option<Param>,
    pub kwonly: Vec<Param>,
    pub kwarg: Option<Param>,
}

impl Parameters {
    pub fn is_empty(&self) -> bool {
        self.posonly.is_empty()
            && self.args.is_empty()
            && self.vararg.is_none()
            && self.kwonly.is_empty()
            && self.kwarg.is_none()
    }

    /// Whether the signature uses `*args`, `**kwargs`, or keyword-only
    /// parameters — the section older grammars forbade a trailing comma
    /// after.
    pub fn has_star_section(&self) -> bool {
        self.vararg.is_some() || self.kwarg.is_some() || !self.kwonly.is_empty()
    }

    /// All parameters in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.posonly
            .iter()
            .chain(self.args.iter())
            .chain(self.vararg.iter())
            .chain(self.kwonly.iter())
            .chain(self.kwarg.iter())
    }
}

/// One `for`/`async for` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

/// One `context` or `context as vars` item of a `with` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub context: Expr,
    pub vars: Option<Expr>,
}

/// One `except`/`except*` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub typ: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
}

/// One `case` clause of a `match` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
}

/// One entry of a PEP 695 type-parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub offset: Offset,
    pub name: String,
    pub bound: Option<Expr>,
    pub default: Option<Expr>,
}

// ============================================================================
// Traversal
// ============================================================================

/// A borrowed reference to any tree node, for uniform traversal.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Pattern(&'a Pattern),
    Keyword(&'a Keyword),
    Param(&'a Param),
    Comprehension(&'a Comprehension),
    WithItem(&'a WithItem),
    ExceptHandler(&'a ExceptHandler),
    MatchCase(&'a MatchCase),
    TypeParam(&'a TypeParam),
}

fn push_stmts<'a>(out: &mut Vec<NodeRef<'a>>, stmts: &'a [Stmt]) {
    for s in stmts.iter().rev() {
        out.push(NodeRef::Stmt(s));
    }
}

fn push_exprs<'a>(out: &mut Vec<NodeRef<'a>>, exprs: &'a [Expr]) {
    for e in exprs.iter().rev() {
        out.push(NodeRef::Expr(e));
    }
}

fn push_opt<'a>(out: &mut Vec<NodeRef<'a>>, expr: &'a Option<Expr>) {
    if let Some(e) = expr {
        out.push(NodeRef::Expr(e));
    }
}

fn push_params<'a>(out: &mut Vec<NodeRef<'a>>, params: &'a Parameters) {
    let all: Vec<&Param> = params.iter().collect();
    for p in all.into_iter().rev() {
        out.push(NodeRef::Param(p));
    }
}

fn push_type_params<'a>(out: &mut Vec<NodeRef<'a>>, tps: &'a [TypeParam]) {
    for tp in tps.iter().rev() {
        out.push(NodeRef::TypeParam(tp));
    }
}

/// Push the immediate children of `node` in *reverse* source order, so that
/// a stack-driven DFS (`pop`, register, push children) visits parents before
/// children and siblings left to right.
pub fn push_children<'a>(node: NodeRef<'a>, out: &mut Vec<NodeRef<'a>>) {
    match node {
        NodeRef::Stmt(stmt) => match stmt {
            Stmt::Expr { value, .. } => out.push(NodeRef::Expr(value)),
            Stmt::Assign { targets, value, .. } => {
                out.push(NodeRef::Expr(value));
                push_exprs(out, targets);
            }
            Stmt::AugAssign { target, value, .. } => {
                out.push(NodeRef::Expr(value));
                out.push(NodeRef::Expr(target));
            }
            Stmt::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                push_opt(out, value);
                out.push(NodeRef::Expr(annotation));
                out.push(NodeRef::Expr(target));
            }
            Stmt::Return { value, .. } => push_opt(out, value),
            Stmt::Pass { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
            Stmt::Del { targets, .. } => push_exprs(out, targets),
            Stmt::Assert { test, msg, .. } => {
                push_opt(out, msg);
                out.push(NodeRef::Expr(test));
            }
            Stmt::Raise { exc, cause, .. } => {
                push_opt(out, cause);
                push_opt(out, exc);
            }
            Stmt::Global { .. } | Stmt::Nonlocal { .. } => {}
            Stmt::Import { .. } | Stmt::ImportFrom { .. } => {}
            Stmt::If {
                test, body, orelse, ..
            }
            | Stmt::While {
                test, body, orelse, ..
            } => {
                push_stmts(out, orelse);
                push_stmts(out, body);
                out.push(NodeRef::Expr(test));
            }
            Stmt::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                push_stmts(out, orelse);
                push_stmts(out, body);
                out.push(NodeRef::Expr(iter));
                out.push(NodeRef::Expr(target));
            }
            Stmt::With { items, body, .. } => {
                push_stmts(out, body);
                for item in items.iter().rev() {
                    out.push(NodeRef::WithItem(item));
                }
            }
            Stmt::Try {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                push_stmts(out, finalbody);
                push_stmts(out, orelse);
                for h in handlers.iter().rev() {
                    out.push(NodeRef::ExceptHandler(h));
                }
                push_stmts(out, body);
            }
            Stmt::FunctionDef {
                type_params,
                params,
                returns,
                body,
                decorators,
                ..
            } => {
                push_stmts(out, body);
                push_opt(out, returns);
                push_params(out, params);
                push_type_params(out, type_params);
                push_exprs(out, decorators);
            }
            Stmt::ClassDef {
                type_params,
                bases,
                keywords,
                body,
                decorators,
                ..
            } => {
                push_stmts(out, body);
                for kw in keywords.iter().rev() {
                    out.push(NodeRef::Keyword(kw));
                }
                push_exprs(out, bases);
                push_type_params(out, type_params);
                push_exprs(out, decorators);
            }
            Stmt::Match { subject, cases, .. } => {
                for case in cases.iter().rev() {
                    out.push(NodeRef::MatchCase(case));
                }
                out.push(NodeRef::Expr(subject));
            }
            Stmt::TypeAlias {
                type_params, value, ..
            } => {
                out.push(NodeRef::Expr(value));
                push_type_params(out, type_params);
            }
        },
        NodeRef::Expr(expr) => match expr {
            Expr::Name { .. } | Expr::Constant { .. } => {}
            Expr::Tuple { elts, .. } | Expr::List { elts, .. } | Expr::Set { elts, .. } => {
                push_exprs(out, elts);
            }
            Expr::Dict { keys, values, .. } => {
                for (key, value) in keys.iter().zip(values.iter()).rev() {
                    out.push(NodeRef::Expr(value));
                    if let Some(k) = key {
                        out.push(NodeRef::Expr(k));
                    }
                }
            }
            Expr::Starred { value, .. }
            | Expr::Await { value, .. }
            | Expr::YieldFrom { value, .. } => out.push(NodeRef::Expr(value.as_ref())),
            Expr::Yield { value, .. } => {
                if let Some(v) = value {
                    out.push(NodeRef::Expr(v.as_ref()));
                }
            }
            Expr::Call {
                func,
                args,
                keywords,
                ..
            } => {
                for kw in keywords.iter().rev() {
                    out.push(NodeRef::Keyword(kw));
                }
                push_exprs(out, args);
                out.push(NodeRef::Expr(func.as_ref()));
            }
            Expr::Attribute { value, .. } => out.push(NodeRef::Expr(value.as_ref())),
            Expr::Subscript { value, slice, .. } => {
                out.push(NodeRef::Expr(slice.as_ref()));
                out.push(NodeRef::Expr(value.as_ref()));
            }
            Expr::Slice {
                lower, upper, step, ..
            } => {
                for part in [step, upper, lower] {
                    if let Some(e) = part {
                        out.push(NodeRef::Expr(e.as_ref()));
                    }
                }
            }
            Expr::BoolOp { values, .. } => push_exprs(out, values),
            Expr::BinOp { left, right, .. } => {
                out.push(NodeRef::Expr(right.as_ref()));
                out.push(NodeRef::Expr(left.as_ref()));
            }
            Expr::UnaryOp { operand, .. } => out.push(NodeRef::Expr(operand.as_ref())),
            Expr::Compare {
                left, comparators, ..
            } => {
                push_exprs(out, comparators);
                out.push(NodeRef::Expr(left.as_ref()));
            }
            Expr::IfExp {
                body, test, orelse, ..
            } => {
                out.push(NodeRef::Expr(orelse.as_ref()));
                out.push(NodeRef::Expr(test.as_ref()));
                out.push(NodeRef::Expr(body.as_ref()));
            }
            Expr::Lambda { params, body, .. } => {
                out.push(NodeRef::Expr(body.as_ref()));
                push_params(out, params);
            }
            Expr::NamedExpr { target, value, .. } => {
                out.push(NodeRef::Expr(value.as_ref()));
                out.push(NodeRef::Expr(target.as_ref()));
            }
            Expr::GeneratorExp {
                elt, generators, ..
            }
            | Expr::ListComp {
                elt, generators, ..
            }
            | Expr::SetComp {
                elt, generators, ..
            } => {
                for g in generators.iter().rev() {
                    out.push(NodeRef::Comprehension(g));
                }
                out.push(NodeRef::Expr(elt.as_ref()));
            }
            Expr::DictComp {
                key,
                value,
                generators,
                ..
            } => {
                for g in generators.iter().rev() {
                    out.push(NodeRef::Comprehension(g));
                }
                out.push(NodeRef::Expr(value.as_ref()));
                out.push(NodeRef::Expr(key.as_ref()));
            }
        },
        NodeRef::Pattern(pattern) => match pattern {
            Pattern::MatchValue { value, .. } => out.push(NodeRef::Expr(value)),
            Pattern::MatchSingleton { .. } | Pattern::MatchStar { .. } => {}
            Pattern::MatchSequence { patterns, .. } | Pattern::MatchOr { patterns, .. } => {
                for p in patterns.iter().rev() {
                    out.push(NodeRef::Pattern(p));
                }
            }
            Pattern::MatchMapping { keys, patterns, .. } => {
                for (key, pat) in keys.iter().zip(patterns.iter()).rev() {
                    out.push(NodeRef::Pattern(pat));
                    out.push(NodeRef::Expr(key));
                }
            }
            Pattern::MatchClass {
                cls,
                patterns,
                kwd_patterns,
                ..
            } => {
                for p in kwd_patterns.iter().rev() {
                    out.push(NodeRef::Pattern(p));
                }
                for p in patterns.iter().rev() {
                    out.push(NodeRef::Pattern(p));
                }
                out.push(NodeRef::Expr(cls));
            }
            Pattern::MatchAs { pattern, .. } => {
                if let Some(p) = pattern {
                    out.push(NodeRef::Pattern(p.as_ref()));
                }
            }
        },
        NodeRef::Keyword(kw) => out.push(NodeRef::Expr(&kw.value)),
        NodeRef::Param(p) => {
            push_opt(out, &p.default);
            push_opt(out, &p.annotation);
        }
        NodeRef::Comprehension(c) => {
            push_exprs(out, &c.ifs);
            out.push(NodeRef::Expr(&c.iter));
            out.push(NodeRef::Expr(&c.target));
        }
        NodeRef::WithItem(item) => {
            push_opt(out, &item.vars);
            out.push(NodeRef::Expr(&item.context));
        }
        NodeRef::ExceptHandler(h) => {
            push_stmts(out, &h.body);
            push_opt(out, &h.typ);
        }
        NodeRef::MatchCase(case) => {
            push_stmts(out, &case.body);
            push_opt(out, &case.guard);
            out.push(NodeRef::Pattern(&case.pattern));
        }
        NodeRef::TypeParam(tp) => {
            push_opt(out, &tp.default);
            push_opt(out, &tp.bound);
        }
    }
}
