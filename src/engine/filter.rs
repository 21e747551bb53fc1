//! Base-name glob filter.

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::ffi::OsStr;
use std::path::Path;

/// Compiled `-name` pattern. Matches against the final path component only, case-sensitive.
/// No pattern matches everything.
#[derive(Clone, Debug, Default)]
pub struct NameFilter {
    matcher: Option<GlobMatcher>,
}

impl NameFilter {
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let matcher = match pattern {
            None => None,
            Some(p) => Some(
                GlobBuilder::new(p)
                    .literal_separator(true)
                    .backslash_escape(true)
                    .build()
                    .with_context(|| format!("invalid name pattern {p:?}"))?
                    .compile_matcher(),
            ),
        };
        Ok(Self { matcher })
    }

    pub fn is_match(&self, path: &Path) -> bool {
        match &self.matcher {
            None => true,
            Some(m) => m.is_match(base_name(path)),
        }
    }
}

/// Final component, or the whole path when there is none (e.g. `/`).
pub fn base_name(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}
