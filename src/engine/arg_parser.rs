use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::pipeline::correction::TimeoutFallback;
use crate::utils::config::DEFAULT_ROOT;

/// No-callback timeout behavior, as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnTimeout {
    /// Log a warning and keep walking with the current bound.
    Warn,
    /// Stop entering new directories (depth bound 0).
    ZeroDepth,
}

impl From<OnTimeout> for TimeoutFallback {
    fn from(v: OnTimeout) -> Self {
        match v {
            OnTimeout::Warn => TimeoutFallback::Warn,
            OnTimeout::ZeroDepth => TimeoutFallback::ZeroDepth,
        }
    }
}

fn non_blank(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("must name a program".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Recursive find with a live depth bound that a timeout can correct mid-walk.
#[derive(Clone, Parser)]
#[command(name = "adaptfind")]
#[command(about = "Walk folders and print matching paths; a timeout may adjust the depth bound.")]
pub struct Cli {
    /// Folders to search. Default: current directory.
    #[arg(value_name = "FOLDER", default_value = DEFAULT_ROOT)]
    pub folders: Vec<PathBuf>,

    /// Never follow symbolic links (default).
    #[arg(short = 'P', conflicts_with_all = ["follow_cmdline", "follow_all"])]
    pub never_follow: bool,

    /// Follow symbolic links named on the command line only.
    #[arg(short = 'H', conflicts_with_all = ["never_follow", "follow_all"])]
    pub follow_cmdline: bool,

    /// Follow symbolic links.
    #[arg(short = 'L', conflicts_with_all = ["never_follow", "follow_cmdline"])]
    pub follow_all: bool,

    /// Process each directory before its contents.
    #[arg(short = 'd')]
    pub dirs_first: bool,

    /// Filter results by base-name glob (e.g. '*.txt').
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Seconds before the timeout correction fires (fractional allowed).
    #[arg(long, short = 't')]
    pub timeout: Option<f64>,

    /// Initial depth bound. Negative means unlimited.
    #[arg(long, allow_negative_numbers = true)]
    pub max_depth: Option<i64>,

    /// On timeout with no correction configured: warn, or zero the depth bound.
    #[arg(long, value_enum, conflicts_with_all = ["correct_depth", "ask_cmd"])]
    pub on_timeout: Option<OnTimeout>,

    /// Pre-declared correction: on timeout, set the depth bound to N.
    #[arg(long, allow_negative_numbers = true, conflicts_with = "ask_cmd")]
    pub correct_depth: Option<i64>,

    /// Reactive correction: on timeout, run this program (prompt on stdin) and apply its reply.
    #[arg(long, value_name = "PROGRAM", value_parser = non_blank)]
    pub ask_cmd: Option<String>,

    /// Skip correction when a match was already found.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub skip_when_matched: Option<bool>,

    /// Strict mode: fail on the first unreadable directory instead of skipping it.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Write matches to FILE instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit JSON lines instead of plain paths.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
