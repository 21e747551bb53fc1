use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::filter::NameFilter;
use crate::engine::walk::Walker;
use crate::pipeline::context::TraversalContext;
use crate::pipeline::correction::handle_timeout;
use crate::pipeline::error_handler::report_skipped_paths;
use crate::pipeline::sink::Sink;
use crate::pipeline::timer::start_timer;
use crate::utils::config::DEFAULT_ROOT;
use crate::{FindOpts, RunSummary};

/// Run one traversal over `roots` (current directory when empty), streaming matches into `sink`.
///
/// Creates the run's [`TraversalContext`], arms the timeout timer when `opts.timeout` is set,
/// walks every root, then cancels a still-pending timer. If the timer already fired, waits
/// for its handler so the outcome lands in the summary.
pub fn run<P, S>(roots: &[P], opts: &FindOpts, sink: &mut S) -> Result<RunSummary>
where
    P: AsRef<Path>,
    S: Sink + ?Sized,
{
    let filter = NameFilter::new(opts.name.as_deref())?;
    let ctx = Arc::new(TraversalContext::new(opts.max_depth));
    let start = Instant::now();

    let mut timer = match opts.timeout {
        Some(duration) => {
            let ctx_t = Arc::clone(&ctx);
            let policy = opts.correction.clone();
            let skip_when_matched = opts.skip_when_matched;
            debug!("arming timeout timer: {:?}", duration);
            let handle = start_timer(duration, move || {
                handle_timeout(&ctx_t, &policy, skip_when_matched)
            })
            .context("spawn timeout timer")?;
            Some(handle)
        }
        None => None,
    };

    let mut walker = Walker::new(&ctx, &filter, opts, sink);
    let walked = if roots.is_empty() {
        walker.walk_root(Path::new(DEFAULT_ROOT))
    } else {
        roots.iter().try_for_each(|r| walker.walk_root(r.as_ref()))
    };
    let totals = walker.into_totals();

    if let Some(t) = timer.as_mut() {
        t.cancel();
    }
    let timeout_outcome = timer.and_then(|t| t.join());
    walked?;
    sink.finish()?;

    debug!(
        "walk finished in {:?}: {} matches",
        start.elapsed(),
        totals.matched
    );

    let summary = RunSummary {
        matched: totals.matched,
        missing_roots: totals.missing_roots,
        skipped_paths: totals.skipped_paths,
        timed_out: ctx.timeout_occurred(),
        final_max_depth: ctx.max_depth(),
        timeout_outcome,
    };
    report_skipped_paths(&summary);
    Ok(summary)
}
