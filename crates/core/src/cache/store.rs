//! Durable, path-addressed storage of per-file cache records.
//!
//! Each record lives at `<root>/<hex[..2]>/<hex>` where `hex` is the
//! xxh3-128 digest of the file path, bounding directory fan-out and
//! giving O(1) lookup without a directory scan. One msgpack map per
//! record, written independently, so a torn write never corrupts
//! sibling shards.

use crate::error::Result;
use crate::model::{CacheEntry, IndexState, WriteFailure};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;
use xxhash_rust::xxh3::xxh3_128;

pub enum WriteMode<'a> {
    /// Delete the whole cache tree first, then write every entry.
    ClearAndWriteAll,
    /// Write only the named entries, leaving other records untouched.
    Subset(&'a BTreeSet<PathBuf>),
}

pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Per-project cache root: `$HOME/.relscope/cache/<digest of root>`,
    /// so checkouts of different projects never share a shard tree.
    pub fn default_location(project_root: &Path) -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let digest = xxh3_128(project_root.to_string_lossy().as_bytes());
        Path::new(&home)
            .join(".relscope")
            .join("cache")
            .join(format!("{digest:032x}"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, real_path: &Path) -> PathBuf {
        let hex = format!("{:032x}", xxh3_128(real_path.to_string_lossy().as_bytes()));
        self.root.join(&hex[..2]).join(&hex)
    }

    /// A file needs reindexing iff it has no record or its mtime is
    /// strictly newer than its record's. Metadata only, no content read;
    /// an unreadable mtime on either side is treated as stale.
    pub fn is_stale(&self, real_path: &Path) -> bool {
        let Ok(record_meta) = fs::metadata(self.record_path(real_path)) else {
            return true;
        };
        let Ok(source_meta) = fs::metadata(real_path) else {
            return true;
        };
        match (source_meta.modified(), record_meta.modified()) {
            (Ok(source), Ok(record)) => source > record,
            _ => true,
        }
    }

    pub fn has_records(&self) -> bool {
        fs::read_dir(&self.root)
            .map(|mut dir| dir.next().is_some())
            .unwrap_or(false)
    }

    /// Decode a single record. Missing or corrupt records read as
    /// "never indexed": corrupt ones are logged and skipped, and the
    /// file will trip the staleness check on the next run.
    pub fn read_entry(&self, real_path: &Path) -> Option<CacheEntry> {
        let record = self.record_path(real_path);
        let bytes = fs::read(&record).ok()?;
        match rmp_serde::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(record = %record.display(), "skipping corrupt cache record: {e}");
                None
            }
        }
    }

    /// Walk the shard tree and reconstruct the full in-memory state:
    /// every entry plus the derived provider and refcount maps.
    pub fn read_all(&self) -> Result<IndexState> {
        let mut state = IndexState::default();
        if !self.root.exists() {
            return Ok(state);
        }

        for dir_entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if !dir_entry.file_type().is_file() {
                continue;
            }
            let bytes = match fs::read(dir_entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(record = %dir_entry.path().display(), "skipping unreadable cache record: {e}");
                    continue;
                }
            };
            let entry: CacheEntry = match rmp_serde::from_slice(&bytes) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(record = %dir_entry.path().display(), "skipping corrupt cache record: {e}");
                    continue;
                }
            };

            for symbol in entry.provides.keys() {
                state
                    .providers
                    .insert(symbol.clone(), entry.real_path.clone());
            }
            for (symbol, count) in &entry.uses {
                *state.refcounts.entry(symbol.clone()).or_insert(0) += count;
            }
            state.entries.insert(entry.real_path.clone(), entry);
        }

        Ok(state)
    }

    /// Persist entries per `mode`. A record that fails to encode or
    /// write is collected into the failure list and the remaining
    /// writes continue; only clearing or creating the root is fatal.
    pub fn write(&self, state: &IndexState, mode: WriteMode) -> Result<Vec<WriteFailure>> {
        if matches!(mode, WriteMode::ClearAndWriteAll) {
            self.clear()?;
        }
        fs::create_dir_all(&self.root)?;

        let entries: Vec<&CacheEntry> = match &mode {
            WriteMode::ClearAndWriteAll => state.entries.values().collect(),
            WriteMode::Subset(paths) => paths
                .iter()
                .filter_map(|path| state.entries.get(path))
                .collect(),
        };

        let mut failures = Vec::new();
        for entry in entries {
            if let Err(e) = self.write_record(entry) {
                warn!(path = %entry.real_path.display(), "failed to persist cache record: {e}");
                failures.push(WriteFailure {
                    path: entry.real_path.clone(),
                    error: e.to_string(),
                });
            }
        }
        Ok(failures)
    }

    fn write_record(&self, entry: &CacheEntry) -> Result<()> {
        // Named encoding keeps each record a self-describing map.
        let buf = rmp_serde::to_vec_named(entry)?;
        let record = self.record_path(&entry.real_path);
        if let Some(shard) = record.parent() {
            fs::create_dir_all(shard)?;
        }
        fs::write(&record, buf)?;
        Ok(())
    }

    /// Delete the cache root entirely. The next run falls back to a
    /// full rebuild.
    pub fn clear(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}
