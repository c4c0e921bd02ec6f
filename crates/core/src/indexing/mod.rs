//! Indexing state machine: decides between a full rebuild and an
//! incremental patch, and owns the run-scoped symbol maps.

mod full;
mod incremental;
mod scan;

use crate::cache::CacheStore;
use crate::error::Result;
use crate::model::{IndexMode, IndexReport, SkipReason, WriteFailure};
use crate::rank;
use std::path::PathBuf;
use tracing::debug;

/// Above this many stale files an incremental run is abandoned for a
/// full rebuild: mass edits or renames are cheaper to rebuild than to
/// chase through a potentially repository-wide propagation chain.
pub const FULL_REINDEX_THRESHOLD: usize = 100;

#[derive(Debug, Default)]
pub(crate) struct RunOutcome {
    pub(crate) written: Vec<PathBuf>,
    pub(crate) skipped: Vec<(PathBuf, SkipReason)>,
    pub(crate) write_failures: Vec<WriteFailure>,
}

pub struct IndexEngine {
    store: CacheStore,
}

impl IndexEngine {
    pub fn new(cache_root: PathBuf) -> Self {
        Self {
            store: CacheStore::new(cache_root),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Index the candidate paths, choosing full or incremental mode.
    ///
    /// Callers supply the file list; the engine never discovers files
    /// itself. At most one run may be active against a cache root at a
    /// time; serializing invocations is the caller's concern.
    pub fn index(&self, paths: &[PathBuf], force_full: bool) -> Result<IndexReport> {
        let mut report = IndexReport::default();

        let mut eligible = Vec::new();
        for path in paths {
            match scan::eligibility(path) {
                None => eligible.push(path.clone()),
                Some(reason) => report.skipped.push((path.clone(), reason)),
            }
        }

        let stale: Vec<PathBuf> = eligible
            .iter()
            .filter(|path| self.store.is_stale(path))
            .cloned()
            .collect();

        let full_rebuild =
            force_full || !self.store.has_records() || stale.len() > FULL_REINDEX_THRESHOLD;

        let outcome = if full_rebuild {
            report.mode = IndexMode::Full;
            full::run(&self.store, &eligible)?
        } else if stale.is_empty() {
            // Fast path: nothing stale, no reads, no writes.
            debug!("cache is current; nothing to index");
            report.mode = IndexMode::Clean;
            RunOutcome::default()
        } else {
            report.mode = IndexMode::Incremental;
            incremental::run(&self.store, &stale, &eligible)?
        };

        report.written = outcome.written;
        report.skipped.extend(outcome.skipped);
        report.write_failures = outcome.write_failures;
        Ok(report)
    }

    /// Rank the given paths by persisted relevance scores.
    pub fn relevance(&self, paths: &[PathBuf], top_n: usize) -> Vec<PathBuf> {
        rank::rank(&self.store, paths, top_n)
    }

    /// Drop the cache entirely; the next `index` call rebuilds from
    /// scratch.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}
