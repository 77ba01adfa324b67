//! Behavior tests for the rewriter.
//!
//! Each `assert_fix` case also re-runs the rewriter on its own output:
//! rewriting is idempotent, and any case that drifts on the second pass is a
//! bug even when the first pass looks right.

use difference::assert_diff;
use itertools::Itertools;
use tugcomma::{fix_src, Settings, Version};

fn fix(src: &str) -> String {
    fix_src(src, &Settings::default()).unwrap()
}

fn fix_with(src: &str, min_version: Version) -> String {
    fix_src(src, &Settings { min_version }).unwrap()
}

/// Visualize whitespace so diffs of indentation failures are readable.
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

#[track_caller]
fn assert_fix(src: &str, expected: &str) {
    let got = fix(src);
    if got != expected {
        let expected = visualize(expected);
        let got = visualize(&got);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
    let again = fix(&got);
    if again != got {
        let got = visualize(&got);
        let again = visualize(&again);
        assert_diff!(got.as_ref(), again.as_ref(), "", 0);
    }
}

#[track_caller]
fn assert_noop(src: &str) {
    assert_fix(src, src);
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn noop_calls() {
    assert_noop("x = 5");
    assert_noop("x(1)");
    // A sole generator argument must not gain a comma.
    assert_noop("tuple(\n    a for a in b\n)");
    // Starred arguments are version-gated and the default floor forbids them.
    assert_noop("x(\n    *args\n)");
    assert_noop("x(\n    **kwargs\n)");
    // The argument's anchor is on line 2 but both parens are on line 3.
    assert_noop("x(\n    \"foo\"\n    \"bar\".format(1),\n)");
    // The close paren is not at the end of a line.
    assert_noop("x((\n    1,\n))");
    // A parenthesized callee hides the call paren behind an unmatched close.
    assert_noop("(\n    a\n).f(b)");
    // Expressions inside f-strings are not rewritten.
    assert_noop("x = (\n    f\" {test(t)}\"\n)\n");
}

#[test]
fn noop_multiline_string_method_call() {
    assert_noop("x = \"\"\"\n   y\n    \"\"\".format(x, y)\n");
}

#[test]
fn fixes_calls() {
    assert_fix("x(\n    1\n)", "x(\n    1,\n)");
    assert_fix("x(\n    kwarg=5\n)", "x(\n    kwarg=5,\n)");
    assert_fix("foo()(\n    1\n)", "foo()(\n    1,\n)");
    assert_fix("x({}).y(\n    x\n)", "x({}).y(\n    x,\n)");
    assert_fix(
        "(\n    {k: v},\n    ()\n)",
        "(\n    {k: v},\n    (),\n)",
    );
}

#[test]
fn starred_call_arguments_follow_the_version_floor() {
    assert_noop("x(\n    *args\n)");
    assert_noop("x(\n    **kwargs\n)");
    assert_eq!(
        fix_with("x(\n    *args\n)", Version::PY35),
        "x(\n    *args,\n)",
    );
    assert_eq!(
        fix_with("x(\n    **kwargs\n)", Version::PY35),
        "x(\n    **kwargs,\n)",
    );
    // The def gate is separate and stricter.
    assert_eq!(
        fix_with("def f(\n    *args\n): pass", Version::PY35),
        "def f(\n    *args\n): pass",
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn noop_literals() {
    assert_noop("(1, 2, 3, 4)");
    assert_noop("[1, 2, 3, 4]");
    assert_noop("{1, 2, 3, 4}");
    assert_noop("{1: 2, 3: 4}");
    assert_noop("if True:\n    pass\n[x] = {y}");
    assert_noop("x[1, 2, 3, 4]");
    assert_noop("x = (\n    object\n), object\n");
}

#[test]
fn fixes_literals() {
    assert_fix("x = [\n    1\n]", "x = [\n    1,\n]");
    assert_fix("x = {\n    1\n}", "x = {\n    1,\n}");
    assert_fix("x = {\n    1: 2\n}", "x = {\n    1: 2,\n}");
    assert_fix("x = (\n    1,\n    2\n)", "x = (\n    1,\n    2,\n)");
}

#[test]
fn fixes_starred_display_elements_unconditionally() {
    assert_fix("x = {\n    1, *y\n}", "x = {\n    1, *y,\n}");
    assert_fix("x = [\n    1, *y\n]", "x = [\n    1, *y,\n]");
    assert_fix("x = (\n    1, *y\n)", "x = (\n    1, *y,\n)");
    assert_fix("x = {\n    1: 2, **y\n}", "x = {\n    1: 2, **y,\n}");
}

#[test]
fn fixes_subscript_tuples() {
    assert_fix(
        "x[\n    1,\n    2,\n    3\n]",
        "x[\n    1,\n    2,\n    3,\n]",
    );
    assert_fix("x[1, 2, 3, ]", "x[1, 2, 3]");
    assert_fix("x[1, 2, 3,]", "x[1, 2, 3]");
    assert_fix(
        "x[\n    (1,),\n    2,\n    3\n]",
        "x[\n    (1,),\n    2,\n    3,\n]",
    );
}

#[test]
fn noop_tuple_literal_without_braces() {
    assert_noop("x = \\\n    1, \\\n    2, \\\n    3");
}

// ============================================================================
// Comma removal on collapsed single lines
// ============================================================================

#[test]
fn removes_extra_commas() {
    assert_fix("(1, 2,)", "(1, 2)");
    assert_fix("[1, 2,]", "[1, 2]");
    assert_fix("[1, 2,   ]", "[1, 2]");
    assert_fix("{1, 2, }", "{1, 2}");
    assert_fix("{1: 2, }", "{1: 2}");
    assert_fix("f(1, 2,)", "f(1, 2)");
}

#[test]
fn one_element_tuples_keep_their_comma() {
    assert_noop("(1,)");
    assert_fix("(1, )", "(1,)");
}

// ============================================================================
// Function definitions
// ============================================================================

#[test]
fn noop_function_defs() {
    assert_noop("def f(): pass");
    assert_noop("def f(arg1, arg2): pass");
    assert_noop("def f(\n        arg1,\n        arg2,\n): pass");
    // Starred and keyword-only parameters stay bare below the 3.6 floor.
    assert_noop("def f(\n        *args\n): pass");
    assert_noop("def f(\n        **kwargs\n): pass");
    assert_noop("def f(\n        *, arg=1\n): pass");
}

#[test]
fn fixes_defs() {
    assert_fix("def f(\n        x\n): pass", "def f(\n        x,\n): pass");
    assert_fix(
        "async def f(\n        x\n): pass",
        "async def f(\n        x,\n): pass",
    );
}

#[test]
fn fixes_posonly_marker() {
    assert_fix("def f(\n    x, /\n): pass\n", "def f(\n    x, /,\n): pass\n");
}

#[test]
fn fixes_starred_defs_at_py36() {
    for (src, expected) in [
        ("def f(\n    *args\n): pass", "def f(\n    *args,\n): pass"),
        (
            "def f(\n    **kwargs\n): pass",
            "def f(\n    **kwargs,\n): pass",
        ),
        ("def f(\n    *, kw=1\n): pass", "def f(\n    *, kw=1,\n): pass"),
    ] {
        assert_eq!(fix_with(src, Version::PY36), expected);
    }
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn noop_classes() {
    assert_noop("class C: pass");
    assert_noop("class C(): pass");
    assert_noop("class C(object): pass");
    assert_noop("class C(\n    object,\n): pass");
}

#[test]
fn fixes_classes() {
    assert_fix(
        "class C(\n    object\n): pass",
        "class C(\n    object,\n): pass",
    );
    assert_fix(
        "class C(\n    metaclass=Meta\n): pass",
        "class C(\n    metaclass=Meta,\n): pass",
    );
    // Class bases are never version-gated, starred or not.
    assert_fix(
        "bases = (object,)\nclass C(\n    *bases\n): pass",
        "bases = (object,)\nclass C(\n    *bases,\n): pass",
    );
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn noop_imports() {
    assert_noop("from os import path, makedirs\n");
    assert_noop("from os import (path, makedirs)\n");
    assert_noop("from os import (\n    path,\n    makedirs,\n)");
    assert_noop("import os.path\n");
}

#[test]
fn fixes_imports() {
    assert_fix(
        "from os import (\n    makedirs,\n    path\n)",
        "from os import (\n    makedirs,\n    path,\n)",
    );
    assert_fix(
        "from os import \\\n   (\n        path,\n        makedirs\n   )\n",
        "from os import \\\n   (\n        path,\n        makedirs,\n   )\n",
    );
    assert_fix(
        "from os import (\n    makedirs,\n    path,\n    )",
        "from os import (\n    makedirs,\n    path,\n)",
    );
    assert_fix(
        "if True:\n    from os import (\n        makedirs\n    )",
        "if True:\n    from os import (\n        makedirs,\n    )",
    );
}

// ============================================================================
// Un-hugging
// ============================================================================

#[test]
fn noop_unhugs() {
    assert_noop("f(x, y, z)");
    assert_noop("f(\n    x,\n)");
    // A single bracketed argument hugs by design.
    assert_noop("f((\n    1, 2, 3,\n))");
    assert_noop("f([\n    1, 2, 3,\n])");
    // A single triple-quoted payload hugs too, f-strings included.
    assert_noop("textwrap.dedent(\"\"\"\n    hi\n\"\"\")");
    assert_noop("textwrap.dedent(f\"\"\"\n    hi\n\"\"\")");
}

#[test]
fn fixes_unhugs() {
    assert_fix("f(\n    a)", "f(\n    a,\n)");
    assert_fix("f(a\n)", "f(\n    a,\n)");
    assert_fix("f(a,\n  b,\n)", "f(\n    a,\n    b,\n)");
    assert_fix("f(a,\n  b,\n  c)", "f(\n    a,\n    b,\n    c,\n)");
    assert_fix("def f(\n    *args): pass", "def f(\n    *args\n): pass");
    assert_fix("def f(\n    **kwargs): pass", "def f(\n    **kwargs\n): pass");
    assert_fix(
        "def f(\n    *, kw=1, kw2=2): pass",
        "def f(\n    *, kw=1, kw2=2\n): pass",
    );
    // An existing trailing comma is kept, not duplicated.
    assert_fix("f(\n    a,)", "f(\n    a,\n)");
    assert_fix("f(\n    *args)", "f(\n    *args\n)");
    assert_fix(
        "with a(\n    b,\n    c):\n    pass",
        "with a(\n    b,\n    c,\n):\n    pass",
    );
    assert_fix(
        "if True:\n    with a(\n        b,\n        c):\n        pass",
        "if True:\n    with a(\n        b,\n        c,\n    ):\n        pass",
    );
}

#[test]
fn unhug_preserves_relative_indentation() {
    assert_fix(
        "{'foo': 'bar',\n 'baz':\n    {\n       'id': 1,\n },\n }",
        "{\n    'foo': 'bar',\n    'baz':\n       {\n          'id': 1,\n       },\n}",
    );
}

#[test]
fn unhug_cascades_through_nested_calls() {
    assert_fix(
        "f(g(\n      a,\n  ),\n  1,\n)",
        "f(\n    g(\n        a,\n    ),\n    1,\n)",
    );
    assert_fix(
        "x = [long_function_name(arg,\n                        arg),\n     long_function_name(arg,\n                        arg)]",
        "x = [\n    long_function_name(\n        arg,\n        arg,\n    ),\n    long_function_name(\n        arg,\n        arg,\n    ),\n]",
    );
}

#[test]
fn unhug_string_concatenation() {
    assert_fix("x = (\"foo\"\n     \"bar\")", "x = (\n    \"foo\"\n    \"bar\"\n)");
    assert_fix("x(\"foo\"\n  \"bar\")", "x(\n    \"foo\"\n    \"bar\",\n)");
}

#[test]
fn unhug_keeps_inner_hugged_groups() {
    assert_fix(
        "x(\"foo\", (\n    \"bar\",\n\n    \"baz\",\n))",
        "x(\n    \"foo\", (\n        \"bar\",\n\n        \"baz\",\n    ),\n)",
    );
}

#[test]
fn unhug_tuples_and_nested_containers() {
    assert_fix(
        "x = (f(\n    a,\n), f(\n    a,\n))",
        "x = (\n    f(\n        a,\n    ), f(\n        a,\n    ),\n)",
    );
    assert_fix(
        "x = ([a,\n      b], None)",
        "x = (\n    [\n        a,\n        b,\n    ], None,\n)",
    );
}

#[test]
fn unhug_comprehensions() {
    assert_fix(
        "[a()\n    for b in c\n    if (\n        d\n    )\n]",
        "[\n    a()\n    for b in c\n    if (\n        d\n    )\n]",
    );
    assert_fix(
        "x = [x\n     for x in y()]\n",
        "x = [\n    x\n    for x in y()\n]\n",
    );
}

// ============================================================================
// Closing-delimiter realignment
// ============================================================================

#[test]
fn noop_trailing_brace() {
    assert_noop("[]");
    assert_noop("x = [\n    1, 2, 3,\n]");
    assert_noop("y = [\n    [\n        1, 2, 3, 4,\n    ],\n]");
    assert_noop("foo.\\\n    bar(\n        5,\n    )");
    assert_noop("if True:\n    if True:\n        pass\n\n    x = (\n    1,\n    )\n");
}

#[test]
fn fixes_trailing_brace() {
    assert_fix("x = [\n    1,\n    ]", "x = [\n    1,\n]");
    assert_fix(
        "x % (\n    f(\n        a,\n    ),\n    )",
        "x % (\n    f(\n        a,\n    ),\n)",
    );
    assert_fix(
        "x = (\n    \"foo\"\n    \"bar\"\n    )",
        "x = (\n    \"foo\"\n    \"bar\"\n)",
    );
}

// ============================================================================
// with-items lists
// ============================================================================

#[test]
fn noop_with() {
    assert_noop("from threading import Lock\nwith (Lock() as l):\n    pass");
    assert_noop("with (\n    open(\"wat\")\n) as f, open(\"2\") as f2: pass");
    assert_noop("with open(\"/tmp/t.py\") as f: pass");
    assert_noop("with open(\"/tmp/t.py\") as f, \\\n     open(\"/tmp/y.py\") as g: pass");
    assert_noop("with (open(\"/tmp/t.py\") as f): pass");
    assert_noop("with (open(\"/tmp/t.py\") as t, open(\"/tmp/y.py\") as y): pass");
}

#[test]
fn fixes_with() {
    // No whitespace required after the keyword.
    assert_fix(
        "with(\n        open(\"/tmp/t.txt\") as file1,\n        open(\"/tmp/t.txt\") as file2\n): pass",
        "with(\n        open(\"/tmp/t.txt\") as file1,\n        open(\"/tmp/t.txt\") as file2,\n): pass",
    );
    assert_fix(
        "from threading import lock\nwith (lock() as l,\n     open(\"/tmp/t.txt\")):\n    pass",
        "from threading import lock\nwith (\n    lock() as l,\n    open(\"/tmp/t.txt\"),\n):\n    pass",
    );
    assert_fix(
        "with (open(\n    \"a\",\n    some_other_really_long_parameter=True,\n) as a, a.lock): pass",
        "with (\n    open(\n        \"a\",\n        some_other_really_long_parameter=True,\n    ) as a, a.lock,\n): pass",
    );
    assert_fix("with (a as b, c as d,): pass\n", "with (a as b, c as d): pass\n");
    assert_fix("with (a as b,): pass\n", "with (a as b): pass\n");
}

// ============================================================================
// match patterns
// ============================================================================

#[test]
fn noop_match() {
    assert_noop("match x:\n    case 1, 2:\n        pass\n");
    assert_noop("match x:\n    case a():\n        pass\n");
}

#[test]
fn fixes_match_class_patterns() {
    assert_fix(
        "match x:\n    case A(\n        1,\n        x=2\n    ):\n        pass\n",
        "match x:\n    case A(\n        1,\n        x=2,\n    ):\n        pass\n",
    );
}

#[test]
fn fixes_match_sequence_patterns() {
    assert_fix(
        "match x:\n    case (\n        1,\n        2\n    ):\n        pass\n",
        "match x:\n    case (\n        1,\n        2,\n    ):\n        pass\n",
    );
    // A parenthesized single pattern is a 1-tuple: the comma stays.
    assert_fix(
        "match x:\n    case (1, ):\n        pass\n",
        "match x:\n    case (1,):\n        pass\n",
    );
    assert_fix(
        "match x:\n    case [\n        1,\n        2\n    ]:\n        pass\n",
        "match x:\n    case [\n        1,\n        2,\n    ]:\n        pass\n",
    );
    assert_fix(
        "match x:\n    case [1, ]:\n        pass\n",
        "match x:\n    case [1]:\n        pass\n",
    );
}

#[test]
fn fixes_match_mapping_patterns() {
    assert_fix(
        "match x:\n    case {\n        True: 1,\n        False: 2\n    }:\n        pass\n",
        "match x:\n    case {\n        True: 1,\n        False: 2,\n    }:\n        pass\n",
    );
    assert_fix(
        "match x:\n    case {\"x\": 1,}:\n        pass\n",
        "match x:\n    case {\"x\": 1}:\n        pass\n",
    );
}

// ============================================================================
// Type-parameter lists
// ============================================================================

#[test]
fn noop_type_params() {
    assert_noop("class A[K]:\n    ...\n");
    assert_noop("def not_none[K](v: K) -> K:\n    ...\n");
    assert_noop("type ListOrSet[T] = list[T] | set[T]");
    assert_noop("type ListOrSet = list[str] | set[int]");
}

#[test]
fn fixes_type_params() {
    assert_fix(
        "class ClassA[\n    T: str\n]:\n    ...",
        "class ClassA[\n    T: str,\n]:\n    ...",
    );
    assert_fix(
        "def f[\n    T\n](x: T) -> T:\n    ...",
        "def f[\n    T,\n](x: T) -> T:\n    ...",
    );
    assert_fix(
        "type ListOrSet[\n    T,\n    K\n] = list[T] | set[K]",
        "type ListOrSet[\n    T,\n    K,\n] = list[T] | set[K]",
    );
    assert_fix(
        "def f[\n    T: (\n        \"ForwardReference\",\n        bytes\n    )\n](x: T) -> T:\n    ...",
        "def f[\n    T: (\n        \"ForwardReference\",\n        bytes,\n    ),\n](x: T) -> T:\n    ...",
    );
    assert_fix(
        "class ClassB[\n    T: (\n        \"ForwardReference\",\n        bytes\n    )\n]:\n    ...\n",
        "class ClassB[\n    T: (\n        \"ForwardReference\",\n        bytes,\n    ),\n]:\n    ...\n",
    );
}

// ============================================================================
// Failure recovery
// ============================================================================

#[test]
fn syntax_errors_round_trip_unchanged() {
    assert_noop("from __future__ import print_function\nprint 1\n");
    assert_noop("def f(:\n");
    assert_noop("x = (\n");
    assert_noop("");
}

#[test]
fn crlf_line_endings_are_preserved() {
    assert_eq!(fix("x(\r\n    1\r\n)\r\n"), "x(\r\n    1,\r\n)\r\n");
}
