use crate::RunSummary;

/// Log the skipped-path count, then each path at debug level. Call after the walk has finished.
///
/// Missing roots and a rejected correction are logged where they happen, not here.
pub fn report_skipped_paths(summary: &RunSummary) {
    let skipped = summary.skipped_paths.len();
    if skipped > 0 {
        log::warn!(
            "Skipped {} paths due to permission errors or access issues",
            skipped
        );
        for (p, msg) in &summary.skipped_paths {
            log::debug!("  skipped: {} ({})", p.display(), msg);
        }
    }
}
