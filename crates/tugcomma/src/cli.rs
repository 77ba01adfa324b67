//! File-level plumbing for the tugcomma binary.
//!
//! Each path is processed independently: read bytes, decode UTF-8, rewrite,
//! and write back only when the content changed — the file on disk is always
//! either the original bytes or the complete rewritten bytes. A failure on
//! one file never stops the others.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::{fix_src, FixError, Settings};

/// A per-file failure, reported and skipped.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{path} is non-utf-8 (not supported)")]
    NonUtf8 { path: String },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{path}: {source}")]
    Rewrite {
        path: String,
        #[source]
        source: FixError,
    },
}

/// Rewrite one file in place. Returns whether its contents changed.
pub fn fix_file(path: &Path, settings: &Settings) -> Result<bool, FileError> {
    let path_str = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| FileError::Io {
        path: path_str.clone(),
        source,
    })?;
    let Ok(original) = String::from_utf8(bytes) else {
        return Err(FileError::NonUtf8 { path: path_str });
    };

    let fixed = fix_src(&original, settings).map_err(|source| FileError::Rewrite {
        path: path_str.clone(),
        source,
    })?;

    if fixed == original {
        tracing::debug!("{path_str}: no change");
        return Ok(false);
    }
    fs::write(path, fixed.as_bytes()).map_err(|source| FileError::Io {
        path: path_str,
        source,
    })?;
    Ok(true)
}

/// Stream stdin through the rewriter to stdout. The output is written even
/// when nothing changed.
pub fn fix_stdin(settings: &Settings) -> Result<bool, FileError> {
    let stdin_path = || "-".to_string();
    let mut bytes = Vec::new();
    io::stdin()
        .read_to_end(&mut bytes)
        .map_err(|source| FileError::Io {
            path: stdin_path(),
            source,
        })?;
    let Ok(original) = String::from_utf8(bytes) else {
        return Err(FileError::NonUtf8 { path: stdin_path() });
    };

    let fixed = fix_src(&original, settings).map_err(|source| FileError::Rewrite {
        path: stdin_path(),
        source,
    })?;
    io::stdout()
        .write_all(fixed.as_bytes())
        .map_err(|source| FileError::Io {
            path: stdin_path(),
            source,
        })?;
    Ok(fixed != original)
}
