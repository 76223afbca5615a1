#![forbid(unsafe_code)]

//! Command-line argument parsing for the twindiff editor.
//!
//! Parses args manually (no external dependencies) to keep the binary
//! lean. Supports environment variable overrides via `TWINDIFF_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
twindiff — live side-by-side text comparison editor

USAGE:
    twindiff [OPTIONS] [LEFT_FILE] [RIGHT_FILE]

OPTIONS:
    --typing-debounce-ms=N   Recompute delay while typing (default: 1000)
    --paste-debounce-ms=N    Recompute delay after a paste (default: 120)
    --large-input-lines=N    Line count that forces coarse debouncing
                             (default: 10000)
    --log-file=PATH          Write tracing output to PATH (the terminal
                             is owned by the UI)
    --help, -h               Show this help message
    --version, -V            Show version

KEYBINDINGS:
    Tab             Switch between the two panes
    Arrows          Move the caret
    Home / End      Start / end of line
    PgUp / PgDn     Move 20 lines
    Ctrl+Q, Ctrl+C  Quit

ENVIRONMENT VARIABLES:
    TWINDIFF_TYPING_DEBOUNCE_MS   Override --typing-debounce-ms
    TWINDIFF_PASTE_DEBOUNCE_MS    Override --paste-debounce-ms
    TWINDIFF_LARGE_INPUT_LINES    Override --large-input-lines
    TWINDIFF_LOG_FILE             Override --log-file";

/// Parsed command-line options.
pub struct Opts {
    /// Recompute delay while typing, in milliseconds.
    pub typing_debounce_ms: u64,
    /// Recompute delay after a paste, in milliseconds.
    pub paste_debounce_ms: u64,
    /// Line count that forces coarse debouncing.
    pub large_input_lines: usize,
    /// Tracing log destination.
    pub log_file: Option<PathBuf>,
    /// Initial content of the left pane.
    pub left_file: Option<PathBuf>,
    /// Initial content of the right pane.
    pub right_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            typing_debounce_ms: 1000,
            paste_debounce_ms: 120,
            large_input_lines: 10_000,
            log_file: None,
            left_file: None,
            right_file: None,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are
    /// overridden by explicit command-line flags.
    pub fn parse() -> Self {
        let mut opts = Self::default();

        if let Ok(val) = env::var("TWINDIFF_TYPING_DEBOUNCE_MS")
            && let Ok(n) = val.parse()
        {
            opts.typing_debounce_ms = n;
        }
        if let Ok(val) = env::var("TWINDIFF_PASTE_DEBOUNCE_MS")
            && let Ok(n) = val.parse()
        {
            opts.paste_debounce_ms = n;
        }
        if let Ok(val) = env::var("TWINDIFF_LARGE_INPUT_LINES")
            && let Ok(n) = val.parse()
        {
            opts.large_input_lines = n;
        }
        if let Ok(val) = env::var("TWINDIFF_LOG_FILE") {
            opts.log_file = Some(PathBuf::from(val));
        }

        let args: Vec<String> = env::args().skip(1).collect();
        for arg in &args {
            match arg.as_str() {
                "--help" | "-h" => {
                    println!("{HELP_TEXT}");
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("twindiff {VERSION}");
                    process::exit(0);
                }
                other => {
                    if let Some(val) = other.strip_prefix("--typing-debounce-ms=") {
                        match val.parse() {
                            Ok(n) => opts.typing_debounce_ms = n,
                            Err(_) => invalid("--typing-debounce-ms", val),
                        }
                    } else if let Some(val) = other.strip_prefix("--paste-debounce-ms=") {
                        match val.parse() {
                            Ok(n) => opts.paste_debounce_ms = n,
                            Err(_) => invalid("--paste-debounce-ms", val),
                        }
                    } else if let Some(val) = other.strip_prefix("--large-input-lines=") {
                        match val.parse() {
                            Ok(n) => opts.large_input_lines = n,
                            Err(_) => invalid("--large-input-lines", val),
                        }
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else if other.starts_with('-') {
                        eprintln!("Unknown argument: {other}");
                        eprintln!("Run with --help for usage information.");
                        process::exit(1);
                    } else if opts.left_file.is_none() {
                        opts.left_file = Some(PathBuf::from(other));
                    } else if opts.right_file.is_none() {
                        opts.right_file = Some(PathBuf::from(other));
                    } else {
                        eprintln!("Unexpected extra argument: {other}");
                        process::exit(1);
                    }
                }
            }
        }

        opts
    }
}

fn invalid(flag: &str, val: &str) -> ! {
    eprintln!("Invalid {flag} value: {val}");
    process::exit(1);
}
