//! Bracket matching and the token-level edit engine.
//!
//! Everything here operates on the lossless token list from `tugcomma-lex`.
//! [`find_simple`] and [`find_call`] locate a construct's real delimiter pair
//! (tree anchors are only approximate — a call's anchor points at its callee,
//! a parenthesized callee hides the call paren behind an unmatched close);
//! [`fix_brace`] then performs the actual splice: un-hug, reindent, insert or
//! strip the trailing comma, realign the close.
//!
//! A [`BraceSpan`] is only valid against the exact token list it was computed
//! from. Callers locate and consume immediately; nothing caches spans across
//! mutations.

use std::collections::HashSet;

use thiserror::Error;

use tugcomma_lex::{Offset, Token, TokenKind};

/// Internal invariant violations: the token stream and the tree disagreed in
/// a way no known workaround covers. These are reported loudly, never
/// papered over with a partial rewrite.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("ran past the end of the token stream while locating a bracket")]
    PastEnd,

    #[error("no open parenthesis on the stack at a call argument")]
    NoOpenParen,
}

/// A located candidate: a matched delimiter pair plus layout facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceSpan {
    /// Index of the opening delimiter.
    pub open: usize,
    /// Index of the matching closing delimiter.
    pub close: usize,
    /// Whether a comma occurs at the top nesting level of the span.
    pub multi_element: bool,
    /// Same-line span that still needs its trailing comma / incidental
    /// whitespace stripped. Such spans are never un-hugged.
    pub strip_same_line: bool,
    /// Indentation width of the line holding the opening delimiter.
    pub indent: usize,
}

/// Walk forward from the opening delimiter at `open` to its matching close
/// and classify the span. Returns `None` when the span is single-line with
/// nothing to strip — not a candidate at all.
pub fn find_simple(open: usize, tokens: &[Token]) -> Result<Option<BraceSpan>, TokenError> {
    let mut depth = 1usize;
    let mut multi_element = false;
    let mut close = None;
    for (i, token) in tokens.iter().enumerate().skip(open + 1) {
        if token.is_open_bracket() {
            depth += 1;
        } else if token.is_close_bracket() {
            depth -= 1;
        }
        if depth == 1 && token.is_comma() {
            multi_element = true;
        }
        if depth == 0 {
            close = Some(i);
            break;
        }
    }
    let close = close.ok_or(TokenError::PastEnd)?;

    let same_line = tokens[open].offset.line == tokens[close].offset.line;
    let before_close = &tokens[close - 1];
    let strip_same_line = if same_line {
        if before_close.kind == TokenKind::UnimportantWs || before_close.is_comma() {
            true
        } else {
            return Ok(None);
        }
    } else {
        false
    };

    // The base indentation is whatever leads the line the open delimiter
    // sits on.
    let mut j = open as isize;
    while j >= 0 && !tokens[j as usize].kind.is_any_newline() {
        j -= 1;
    }
    let indent = if j >= 0 && tokens[j as usize + 1].kind.is_indent_ws() {
        tokens[j as usize + 1].src.len()
    } else {
        0
    };

    Ok(Some(BraceSpan {
        open,
        close,
        multi_element,
        strip_same_line,
        indent,
    }))
}

/// Locate the opening paren of a call-like construct whose tree anchor
/// points at the callee rather than the paren.
///
/// Scanning forward with a paren-only stack, the first token whose offset is
/// one of the construct's child offsets pins the call: the bottom of the
/// stack at that moment is the call's own paren. A close paren with an empty
/// stack belongs to a parenthesized callee and is skipped.
pub fn find_call(
    arg_offsets: &HashSet<Offset>,
    start: usize,
    tokens: &[Token],
) -> Result<Option<BraceSpan>, TokenError> {
    let mut paren_stack: Vec<usize> = Vec::new();
    for (i, token) in tokens.iter().enumerate().skip(start) {
        if token.kind == TokenKind::Op && token.src == "(" {
            paren_stack.push(i);
        } else if token.kind == TokenKind::Op && token.src == ")" && !paren_stack.is_empty() {
            paren_stack.pop();
        }
        if arg_offsets.contains(&token.offset) {
            let first = *paren_stack.first().ok_or(TokenError::NoOpenParen)?;
            return find_simple(first, tokens);
        }
    }
    Err(TokenError::PastEnd)
}

/// Apply the edit to a located span: un-hug delimiters, normalize interior
/// indentation, insert or strip the trailing comma, realign the close.
///
/// `add_comma` and `remove_comma` are the construct's policy; the span's own
/// flags say what the layout permits.
pub fn fix_brace(
    tokens: &mut Vec<Token>,
    span: Option<BraceSpan>,
    add_comma: bool,
    remove_comma: bool,
) {
    let Some(span) = span else { return };
    let BraceSpan {
        open,
        mut close,
        multi_element,
        strip_same_line,
        indent,
    } = span;

    let mut hug_open = !tokens[open + 1].kind.is_non_coding();
    let mut hug_close = !tokens[close - 1].kind.is_non_coding();
    if (!multi_element
        && tokens[open + 1].is_open_bracket()
        && tokens[close - 1].is_close_bracket())
        // a lone payload token, e.g. one triple-quoted string
        || open + 2 == close
        || strip_same_line
    {
        hug_open = false;
        hug_close = false;
    }

    if hug_open {
        let new_indent = indent + 4;
        tokens.insert(open + 1, Token::ws(new_indent));
        tokens.insert(open + 1, Token::nl());
        close += 2;

        // Shift the span's continuation lines so the shallowest becomes
        // new_indent; lines with no leading whitespace get one inserted.
        let mut min_indent: Option<usize> = None;
        let mut indent_sites: Vec<usize> = Vec::new();
        let mut insert_sites: Vec<usize> = Vec::new();
        for i in open + 3..close {
            if tokens[i - 1].kind == TokenKind::Nl && tokens[i].kind != TokenKind::Nl {
                if tokens[i].kind != TokenKind::UnimportantWs {
                    min_indent = Some(0);
                    insert_sites.push(i);
                } else {
                    let width = tokens[i].src.len();
                    min_indent = Some(min_indent.map_or(width, |m| m.min(width)));
                    indent_sites.push(i);
                }
            }
        }
        if let Some(min) = min_indent {
            for &i in &indent_sites {
                let width = tokens[i].src.len() - min + new_indent;
                tokens[i] = Token::ws(width);
            }
        }
        for &i in insert_sites.iter().rev() {
            tokens.insert(i, Token::ws(new_indent));
            close += 1;
        }
    }

    if hug_close {
        tokens.insert(close, Token::ws(indent));
        tokens.insert(close, Token::nl());
        close += 2;
    }

    // Walk back to the last significant token and decide about the comma.
    // Landing on the open delimiter means the span has no elements at all.
    let mut i = close - 1;
    while tokens[i].kind.is_non_coding() {
        i -= 1;
    }
    if add_comma && !tokens[i].is_comma() && i != open && i + 1 != close {
        tokens.insert(i + 1, Token::comma());
        close += 1;
    }

    // Realign the closing delimiter with the opening line.
    let back_1 = &tokens[close - 1];
    let back_2 = &tokens[close - 2];
    if back_1.kind == TokenKind::UnimportantWs
        && back_2.kind == TokenKind::Nl
        && back_1.src.len() != indent
    {
        tokens[close - 1] = Token::ws(indent);
    }

    if strip_same_line {
        let mut start = close;
        if tokens[start - 1].kind == TokenKind::UnimportantWs {
            start -= 1;
        }
        if remove_comma && tokens[start - 1].is_comma() {
            start -= 1;
        }
        tokens.drain(start..close);
    }
}
