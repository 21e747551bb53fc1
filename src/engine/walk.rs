//! Traversal engine: root resolution, symlink and order policy, and the depth-bounded walk.
//!
//! The walk keeps an explicit stack of open directories instead of recursing, so tree depth
//! is limited by memory, not the call stack. Output order matches the recursive form: each
//! directory's entries are visited in name order and a subdirectory's subtree is finished
//! before its next sibling.

use anyhow::{Result, anyhow};
use log::{debug, error};
use std::collections::HashSet;
use std::fs::{self, FileType};
use std::io;
use std::path::{Path, PathBuf};
use std::vec;

use crate::engine::filter::NameFilter;
use crate::engine::tools::{expand_home, resolve_root};
use crate::pipeline::context::TraversalContext;
use crate::pipeline::sink::Sink;
use crate::{DirOrder, FindOpts, Match, SymlinkPolicy};

/// Directory being walked: its path, depth from the root, and the entries not yet visited.
struct DirFrame {
    path: PathBuf,
    depth: i64,
    entries: vec::IntoIter<(PathBuf, io::Result<FileType>)>,
}

/// Counters and error state gathered by one [`Walker`].
#[derive(Debug, Default)]
pub struct WalkTotals {
    pub matched: usize,
    pub missing_roots: Vec<PathBuf>,
    pub skipped_paths: Vec<(PathBuf, String)>,
}

/// Single-threaded walker for one run. Reads the depth bound from `ctx` at every descent.
pub struct Walker<'a, S: Sink + ?Sized> {
    ctx: &'a TraversalContext,
    filter: &'a NameFilter,
    sink: &'a mut S,
    symlinks: SymlinkPolicy,
    order: DirOrder,
    strict: bool,
    visited: HashSet<PathBuf>,
    totals: WalkTotals,
}

impl<'a, S: Sink + ?Sized> Walker<'a, S> {
    pub fn new(
        ctx: &'a TraversalContext,
        filter: &'a NameFilter,
        opts: &FindOpts,
        sink: &'a mut S,
    ) -> Self {
        Self {
            ctx,
            filter,
            sink,
            symlinks: opts.symlinks,
            order: opts.order,
            strict: opts.strict,
            visited: HashSet::new(),
            totals: WalkTotals::default(),
        }
    }

    pub fn into_totals(self) -> WalkTotals {
        self.totals
    }

    /// Resolve and walk one root. A missing root is logged and skipped.
    pub fn walk_root(&mut self, raw: &Path) -> Result<()> {
        let expanded = expand_home(raw);
        let found = resolve_root(&expanded).and_then(|p| {
            let meta = fs::symlink_metadata(&p)?;
            Ok((p, meta))
        });
        let (resolved, meta) = match found {
            Ok(found) => found,
            Err(e) => {
                error!("{}: {}", expanded.display(), e);
                self.totals.missing_roots.push(expanded);
                return Ok(());
            }
        };

        let is_link = meta.file_type().is_symlink();
        let follow = is_link && self.symlinks.follow_root();
        let key = if follow {
            fs::canonicalize(&resolved).unwrap_or_else(|_| resolved.clone())
        } else {
            resolved.clone()
        };
        if !self.visited.insert(key) {
            debug!("{}: already visited", resolved.display());
            return Ok(());
        }

        if is_link && !follow {
            return self.candidate(&resolved, false);
        }
        let is_dir = if follow {
            fs::metadata(&resolved).is_ok_and(|m| m.is_dir())
        } else {
            meta.is_dir()
        };
        if is_dir {
            self.walk_dir(resolved)
        } else {
            self.candidate(&resolved, false)
        }
    }

    fn walk_dir(&mut self, root: PathBuf) -> Result<()> {
        let mut stack: Vec<DirFrame> = Vec::new();
        if let Some(frame) = self.open_dir(root, 0)? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let depth = frame.depth;
            let Some((path, file_type)) = frame.entries.next() else {
                if let Some(done) = stack.pop()
                    && self.order == DirOrder::Post
                {
                    self.candidate(&done.path, true)?;
                }
                continue;
            };

            match file_type {
                Err(e) => self.skip(path, &e)?,
                // Symlinks are leaves under every policy.
                Ok(ft) if ft.is_symlink() => self.candidate(&path, false)?,
                Ok(ft) if ft.is_dir() => {
                    if self.ctx.may_descend(depth)
                        && let Some(child) = self.open_dir(path, depth + 1)?
                    {
                        stack.push(child);
                    }
                }
                Ok(_) => self.candidate(&path, false)?,
            }
        }
        Ok(())
    }

    /// List `path`. On failure the directory contributes nothing, not even itself.
    fn open_dir(&mut self, path: PathBuf, depth: i64) -> Result<Option<DirFrame>> {
        let entries = match list_dir(&path) {
            Ok(entries) => entries,
            Err(e) => {
                self.skip(path, &e)?;
                return Ok(None);
            }
        };
        if self.order == DirOrder::Pre {
            self.candidate(&path, true)?;
        }
        Ok(Some(DirFrame {
            path,
            depth,
            entries: entries.into_iter(),
        }))
    }

    fn candidate(&mut self, path: &Path, is_dir: bool) -> Result<()> {
        if !self.filter.is_match(path) {
            return Ok(());
        }
        self.ctx.mark_result();
        self.sink.record(&Match {
            path: path.to_path_buf(),
            is_dir,
        })?;
        self.totals.matched += 1;
        Ok(())
    }

    /// Record an unreadable path. Strict mode turns it into the run's error.
    fn skip(&mut self, path: PathBuf, err: &io::Error) -> Result<()> {
        if self.strict {
            return Err(anyhow!("Error accessing {}: {}", path.display(), err));
        }
        error!("Error accessing {}: {}", path.display(), err);
        self.totals.skipped_paths.push((path, err.to_string()));
        Ok(())
    }
}

/// Entries of `dir` sorted by name, each with its own (non-following) file type.
fn list_dir(dir: &Path) -> io::Result<Vec<(PathBuf, io::Result<FileType>)>> {
    let mut entries = fs::read_dir(dir)?
        .map(|e| e.map(|e| (e.path(), e.file_type())))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
