// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip tests for the tokenizer.
//!
//! `tokens_to_src(tokenize(s)) == s` must hold for every tokenizable input:
//! the rewriter edits the token list in place and any byte the tokenizer
//! drops would be a byte the rewriter silently deletes.

use itertools::Itertools;
use tugcomma_lex::{tokenize, tokens_to_src};

fn assert_roundtrip(src: &str) {
    let tokens = tokenize(src).unwrap_or_else(|e| panic!("tokenize failed on {src:?}: {e}"));
    let rebuilt = tokens_to_src(&tokens);
    assert_eq!(
        rebuilt, src,
        "round-trip mismatch:\n{}",
        src.lines().zip_longest(rebuilt.lines()).format_with("\n", |pair, f| {
            f(&format_args!("{pair:?}"))
        }),
    );
}

#[test]
fn roundtrip_simple_module() {
    assert_roundtrip("import os\n\n\ndef main():\n    return os.getcwd()\n");
}

#[test]
fn roundtrip_nested_brackets() {
    assert_roundtrip("x = {'a': [1, (2, 3)], 'b': f(\n    4,\n)}\n");
}

#[test]
fn roundtrip_comments_and_blank_lines() {
    assert_roundtrip("# leading\n\nx = 1  # trailing\n\n# closing\n");
}

#[test]
fn roundtrip_escaped_newlines() {
    assert_roundtrip("total = 1 + \\\n    2 + \\\n    3\n");
}

#[test]
fn roundtrip_string_zoo() {
    assert_roundtrip(concat!(
        "a = 'single'\n",
        "b = \"double\"\n",
        "c = '''triple\nspans\nlines'''\n",
        "d = r\"raw\\d+\"\n",
        "e = rb'raw bytes'\n",
        "f = f'interp {x!r:>{width}}'\n",
        "g = 'embedded \\' quote'\n",
    ));
}

#[test]
fn roundtrip_crlf() {
    assert_roundtrip("def f():\r\n    return [\r\n        1,\r\n    ]\r\n");
}

#[test]
fn roundtrip_deep_indentation() {
    assert_roundtrip(
        "class A:\n    def f(self):\n        if x:\n            pass\n        else:\n            pass\n",
    );
}

#[test]
fn roundtrip_tabs() {
    assert_roundtrip("if x:\n\ty = 1\n\tif z:\n\t\tw = 2\n");
}

#[test]
fn roundtrip_no_trailing_newline() {
    assert_roundtrip("x = (1,)");
}

#[test]
fn roundtrip_operators() {
    assert_roundtrip("x **= 2; y //= 3; z = a if b else c\nw = lambda *a, **k: ...\n");
}

#[test]
fn roundtrip_unicode_identifiers() {
    assert_roundtrip("café = 'naïve'\nπ = 3.14159\n");
}

#[test]
fn roundtrip_numbers() {
    assert_roundtrip("a = 0xFF_FF\nb = 0o755\nc = 0b1010\nd = 1_000.5e-3\ne = .5j\nf = 10.\n");
}
