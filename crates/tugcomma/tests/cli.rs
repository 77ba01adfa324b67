//! File-level tests: the rewriter applied through `cli::fix_file`.

use std::fs;

use tugcomma::cli::{fix_file, FileError};
use tugcomma::{Settings, Version};

fn settings() -> Settings {
    Settings::default()
}

#[test]
fn noop_file_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.py");
    fs::write(&path, "x = 5\n").unwrap();
    let changed = fix_file(&path, &settings()).unwrap();
    assert!(!changed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "x = 5\n");
}

#[test]
fn changed_file_is_rewritten_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.py");
    fs::write(&path, "x(\n    1\n)\n").unwrap();
    let changed = fix_file(&path, &settings()).unwrap();
    assert!(changed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "x(\n    1,\n)\n");

    // A second run settles: nothing further to do.
    let changed = fix_file(&path, &settings()).unwrap();
    assert!(!changed);
}

#[test]
fn crlf_line_endings_survive_the_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.py");
    fs::write(&path, b"x(\r\n    1\r\n)\r\n").unwrap();
    let changed = fix_file(&path, &settings()).unwrap();
    assert!(changed);
    assert_eq!(fs::read(&path).unwrap(), b"x(\r\n    1,\r\n)\r\n");
}

#[test]
fn syntax_errors_leave_the_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.py");
    fs::write(&path, "from __future__ import print_function\nprint 1\n").unwrap();
    let changed = fix_file(&path, &settings()).unwrap();
    assert!(!changed);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "from __future__ import print_function\nprint 1\n",
    );
}

#[test]
fn non_utf8_bytes_are_a_per_file_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.py");
    // "x = €" encoded as cp1252
    fs::write(&path, b"# -*- coding: cp1252 -*-\nx = \x80\n").unwrap();
    let err = fix_file(&path, &settings()).unwrap_err();
    assert!(matches!(err, FileError::NonUtf8 { .. }));
    assert_eq!(
        err.to_string(),
        format!("{} is non-utf-8 (not supported)", path.display()),
    );
    // The file keeps its original bytes.
    assert_eq!(
        fs::read(&path).unwrap(),
        b"# -*- coding: cp1252 -*-\nx = \x80\n",
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.py");
    let err = fix_file(&path, &settings()).unwrap_err();
    assert!(matches!(err, FileError::Io { .. }));
}

#[test]
fn version_floor_applies_per_invocation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.py");
    fs::write(&path, "x(\n    *args\n)\n").unwrap();

    let changed = fix_file(&path, &settings()).unwrap();
    assert!(!changed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "x(\n    *args\n)\n");

    let py35 = Settings {
        min_version: Version::PY35,
    };
    let changed = fix_file(&path, &py35).unwrap();
    assert!(changed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "x(\n    *args,\n)\n");
}

#[test]
fn def_floor_is_stricter_than_call_floor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.py");
    fs::write(&path, "def f(\n    **kwargs\n): pass\n").unwrap();

    let py35 = Settings {
        min_version: Version::PY35,
    };
    assert!(!fix_file(&path, &py35).unwrap());

    let py36 = Settings {
        min_version: Version::PY36,
    };
    assert!(fix_file(&path, &py36).unwrap());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "def f(\n    **kwargs,\n): pass\n",
    );
}
