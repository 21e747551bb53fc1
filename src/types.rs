//! Public and internal types for the adaptfind API and pipeline.

use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CorrectionError;
use crate::pipeline::correction::{Correction, CorrectionPolicy};

/// One path that passed the name filter. Produced transiently and handed to a [`Sink`](crate::pipeline::sink::Sink).
///
/// Serialized with the path as a string; bytes that are not valid UTF-8 become U+FFFD.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Match {
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
    pub is_dir: bool,
}

fn serialize_path_lossy<S: Serializer>(path: &Path, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&path.to_string_lossy())
}

/// How symbolic links are treated.
///
/// Below a root a symlink is always reported as a leaf. The policy only decides whether a
/// symlink given as a root is resolved and walked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymlinkPolicy {
    /// `-P`: never follow (default).
    #[default]
    Never,
    /// `-H`: follow symlinks named explicitly as roots.
    IfFlag,
    /// `-L`: always follow.
    Always,
}

impl SymlinkPolicy {
    /// Collapsed "follow" decision for a path given on the command line.
    pub fn follow_root(self) -> bool {
        !matches!(self, SymlinkPolicy::Never)
    }
}

/// When a directory's own path is emitted relative to its descendants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirOrder {
    /// Directory before its contents.
    Pre,
    /// Directory after its contents (default).
    #[default]
    Post,
}

/// Output encoding for writer sinks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One absolute path per line.
    #[default]
    Plain,
    /// One JSON object (`{"path":..,"is_dir":..}`) per line.
    JsonLines,
}

/// Lib options for [`find`](crate::find).
#[derive(Clone, Debug)]
pub struct FindOpts {
    pub symlinks: SymlinkPolicy,
    pub order: DirOrder,
    /// Base-name glob (e.g. `*.txt`). `None` matches everything.
    pub name: Option<String>,
    /// Arm the correction timer with this duration.
    pub timeout: Option<Duration>,
    /// Initial depth bound. Negative means unlimited.
    pub max_depth: i64,
    /// What happens when the timer fires.
    pub correction: CorrectionPolicy,
    /// Skip none/reactive correction when a match was already recorded.
    pub skip_when_matched: bool,
    /// Strict mode: abort on the first listing error instead of skipping the subtree.
    pub strict: bool,
}

impl Default for FindOpts {
    fn default() -> Self {
        Self {
            symlinks: SymlinkPolicy::default(),
            order: DirOrder::default(),
            name: None,
            timeout: None,
            max_depth: -1,
            correction: CorrectionPolicy::default(),
            skip_when_matched: false,
            strict: false,
        }
    }
}

/// Full options (CLI). Use [`FindOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    pub find: FindOpts,
    /// Write matches here instead of stdout.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub verbose: bool,
}

/// What the timeout handler did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeoutOutcome {
    /// A match was already recorded and `skip_when_matched` was set.
    Skipped,
    /// Logged only.
    NoAction,
    /// The correction was applied to the live context.
    Applied(Correction),
}

/// Result of one run. Matches themselves went to the sink.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub matched: usize,
    /// Roots that did not exist.
    pub missing_roots: Vec<PathBuf>,
    /// Directories (or entries) that could not be read, with the error message.
    pub skipped_paths: Vec<(PathBuf, String)>,
    pub timed_out: bool,
    /// Depth bound in effect when the walk finished.
    pub final_max_depth: i64,
    /// `Some` when the timer fired.
    pub timeout_outcome: Option<Result<TimeoutOutcome, CorrectionError>>,
}

impl RunSummary {
    /// The correction failure, if the timer fired and the handler was rejected.
    pub fn correction_error(&self) -> Option<&CorrectionError> {
        match &self.timeout_outcome {
            Some(Err(e)) => Some(e),
            _ => None,
        }
    }

    /// True when nothing went wrong (zero matches is still clean).
    pub fn is_clean(&self) -> bool {
        self.missing_roots.is_empty()
            && self.skipped_paths.is_empty()
            && self.correction_error().is_none()
    }
}
