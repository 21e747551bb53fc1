//! Adaptfind: recursive find whose depth bound can be corrected by a timeout while the walk runs.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::CorrectionError;
pub use pipeline::correction::{
    Collaborator, CommandCollaborator, Correction, CorrectionPolicy, NullaryFn, PromptFn,
    TimeoutFallback,
};
pub use pipeline::sink::{ChannelSink, CollectSink, FnSink, Sink, WriterSink};
pub use types::*;

use log::debug;
use std::path::Path;

/// Result alias used by public adaptfind API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: walk `roots` with `opts`, streaming every match into `sink`.
///
/// Returns once the walk (with any mid-flight depth correction) is complete. Missing roots and
/// unreadable directories are reported in the [`RunSummary`], not as errors; a rejected
/// correction instruction is in [`RunSummary::timeout_outcome`]. Errors are reserved for an
/// invalid name pattern, a failing sink, or a listing error in strict mode.
///
/// ```ignore
/// let opts = FindOpts { name: Some("*.txt".into()), ..Default::default() };
/// let mut sink = CollectSink::new();
/// let summary = adaptfind::find(&["~/notes"], &opts, &mut sink)?;
/// ```
pub fn find<P, S>(roots: &[P], opts: &FindOpts, sink: &mut S) -> Result<RunSummary>
where
    P: AsRef<Path>,
    S: Sink + ?Sized,
{
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::run(roots, opts, sink)
}
