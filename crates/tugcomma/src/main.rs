//! Binary entry point for the tugcomma CLI.
//!
//! ```bash
//! # Rewrite files in place; exit 1 when anything changed
//! tugcomma app.py lib.py
//!
//! # Stream stdin to stdout
//! tugcomma - < app.py
//!
//! # Allow trailing commas after starred arguments (3.6+ target)
//! tugcomma --py36-plus app.py
//!
//! # Fix a whole tree
//! tugcomma --recursive src/
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use walkdir::WalkDir;

use tugcomma::cli::{fix_file, fix_stdin};
use tugcomma::{Settings, Version};

/// Add or remove trailing commas in multi-line Python constructs.
#[derive(Parser, Debug)]
#[command(name = "tugcomma")]
#[command(version)]
#[command(about = "Add or remove trailing commas in multi-line Python constructs")]
struct Cli {
    /// Files to rewrite in place; `-` streams stdin to stdout.
    filenames: Vec<PathBuf>,

    /// Allow trailing commas after *args / **kwargs in calls (3.5+ grammar).
    #[arg(long)]
    py35_plus: bool,

    /// Also allow them after starred parameters in function definitions
    /// (implies --py35-plus).
    #[arg(long)]
    py36_plus: bool,

    /// Exit zero even when files were rewritten.
    #[arg(long)]
    exit_zero_even_if_changed: bool,

    /// Recurse into directories, rewriting every *.py file found.
    #[arg(short, long)]
    recursive: bool,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

impl Cli {
    fn settings(&self) -> Settings {
        let min_version = if self.py36_plus {
            Version::PY36
        } else if self.py35_plus {
            Version::PY35
        } else {
            Version::PY27
        };
        Settings { min_version }
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[derive(Default)]
struct Outcome {
    changed: bool,
    failed: bool,
}

fn process_file(path: &Path, settings: &Settings, outcome: &mut Outcome) {
    match fix_file(path, settings) {
        Ok(true) => {
            eprintln!("Rewriting {}", path.display());
            outcome.changed = true;
        }
        Ok(false) => {}
        Err(err) => {
            eprintln!("{err}");
            outcome.failed = true;
        }
    }
}

fn process_dir(dir: &Path, settings: &Settings, outcome: &mut Outcome) {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("{err}");
                outcome.failed = true;
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == "py")
        {
            process_file(path, settings, outcome);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);
    let settings = cli.settings();

    let mut outcome = Outcome::default();
    for path in &cli.filenames {
        if path.as_os_str() == "-" {
            match fix_stdin(&settings) {
                Ok(changed) => outcome.changed |= changed,
                Err(err) => {
                    eprintln!("{err}");
                    outcome.failed = true;
                }
            }
        } else if path.is_dir() {
            if cli.recursive {
                process_dir(path, &settings, &mut outcome);
            } else {
                eprintln!("{} is a directory (use --recursive)", path.display());
                outcome.failed = true;
            }
        } else {
            process_file(path, &settings, &mut outcome);
        }
    }

    if outcome.failed || (outcome.changed && !cli.exit_zero_even_if_changed) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_floor() {
        let cli = Cli::try_parse_from(["tugcomma"]).unwrap();
        assert_eq!(cli.settings().min_version, Version::PY27);
    }

    #[test]
    fn py35_flag_sets_the_floor() {
        let cli = Cli::try_parse_from(["tugcomma", "--py35-plus", "f.py"]).unwrap();
        assert_eq!(cli.settings().min_version, Version::PY35);
    }

    #[test]
    fn py36_implies_py35() {
        let cli = Cli::try_parse_from(["tugcomma", "--py36-plus"]).unwrap();
        let settings = cli.settings();
        assert!(settings.star_call_commas());
        assert!(settings.star_def_commas());
    }

    #[test]
    fn stdin_marker_is_accepted_as_a_filename() {
        let cli = Cli::try_parse_from(["tugcomma", "-"]).unwrap();
        assert_eq!(cli.filenames, vec![PathBuf::from("-")]);
    }

    #[test]
    fn recursive_flag() {
        let cli = Cli::try_parse_from(["tugcomma", "-r", "src"]).unwrap();
        assert!(cli.recursive);
    }
}
