use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

/// Persisted per-file summary: what a file declares, which foreign
/// symbols it references, and the two aggregate counts relevance
/// ranking multiplies together.
///
/// `provides` values are always 0; the map shape is the on-disk record
/// format, semantically it is a set. `BTreeMap` keeps the encoded
/// record bytes deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub real_path: PathBuf,
    pub provides: BTreeMap<String, u64>,
    pub uses: BTreeMap<String, u64>,
    pub total_usecount: u64,
    pub total_refcount: u64,
}

impl CacheEntry {
    pub fn new(real_path: PathBuf) -> Self {
        Self {
            real_path,
            provides: BTreeMap::new(),
            uses: BTreeMap::new(),
            total_usecount: 0,
            total_refcount: 0,
        }
    }

    pub fn with_provides(real_path: PathBuf, symbols: BTreeSet<String>) -> Self {
        let mut entry = Self::new(real_path);
        entry.provides = symbols.into_iter().map(|s| (s, 0)).collect();
        entry
    }

    pub fn provides_symbol(&self, symbol: &str) -> bool {
        self.provides.contains_key(symbol)
    }
}

/// In-memory index state for one run: every known entry plus the two
/// derived symbol maps. Owned by the engine for the duration of a run
/// and reconstructed from persisted entries when needed; never a
/// process-wide singleton.
#[derive(Debug, Default)]
pub struct IndexState {
    pub entries: HashMap<PathBuf, CacheEntry>,
    /// symbol -> the one file currently providing it (last writer wins).
    pub providers: HashMap<String, PathBuf>,
    /// symbol -> total use count across all entries. Derived; only ever
    /// rebuilt wholesale, never edited piecemeal outside a rebuild.
    pub refcounts: HashMap<String, u64>,
}

impl IndexState {
    /// Rebuild `refcounts` from scratch by summing `uses` across every
    /// entry. Required after incremental changes: an added or removed
    /// provider shifts global counts even for untouched files.
    pub fn rebuild_refcounts(&mut self) {
        self.refcounts.clear();
        for entry in self.entries.values() {
            for (symbol, count) in &entry.uses {
                *self.refcounts.entry(symbol.clone()).or_insert(0) += count;
            }
        }
    }

    /// Recompute every entry's `total_refcount` as the sum of global
    /// refcounts over the symbols it provides.
    pub fn recompute_total_refcounts(&mut self) {
        for entry in self.entries.values_mut() {
            entry.total_refcount = entry
                .provides
                .keys()
                .map(|s| self.refcounts.get(s).copied().unwrap_or(0))
                .sum();
        }
    }
}

/// Which path `index` took for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Incremental run with nothing stale; no reads, no writes.
    Clean,
    Full,
    Incremental,
}

impl Default for IndexMode {
    fn default() -> Self {
        IndexMode::Clean
    }
}

/// Why a candidate path was excluded from scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownLanguage,
    NotRegularFile,
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-run outcome returned to the caller: which mode ran, which
/// records were persisted, and exactly which paths were skipped or
/// failed to persist.
#[derive(Debug, Default)]
pub struct IndexReport {
    pub mode: IndexMode,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub write_failures: Vec<WriteFailure>,
}
