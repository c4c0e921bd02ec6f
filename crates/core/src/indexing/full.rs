//! Full rebuild: two passes over every eligible file, then a
//! clear-and-write of the whole cache.

use super::{RunOutcome, scan};
use crate::cache::{CacheStore, WriteMode};
use crate::error::Result;
use crate::model::{CacheEntry, IndexState, SkipReason};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::info;

pub(crate) fn run(store: &CacheStore, eligible: &[PathBuf]) -> Result<RunOutcome> {
    info!(files = eligible.len(), "performing full reindex");

    let mut state = IndexState::default();
    let mut skipped: BTreeMap<PathBuf, SkipReason> = BTreeMap::new();

    // Pass 1: scan provides in parallel, then fold sequentially in
    // input order so provider collisions resolve last-writer-wins.
    let provide_scans: Vec<(PathBuf, std::result::Result<BTreeSet<String>, SkipReason>)> = eligible
        .par_iter()
        .map(|path| (path.clone(), scan::scan_provides(path)))
        .collect();

    for (path, scanned) in provide_scans {
        let symbols = match scanned {
            Ok(symbols) => symbols,
            Err(reason) => {
                // Unreadable files contribute no symbols but keep an
                // empty entry, so the run itself never fails.
                skipped.insert(path.clone(), reason);
                BTreeSet::new()
            }
        };
        let entry = CacheEntry::with_provides(path.clone(), symbols);
        for symbol in entry.provides.keys() {
            state.providers.insert(symbol.clone(), path.clone());
        }
        state.entries.insert(path, entry);
    }

    // Pass 2: re-read and tokenize in parallel against the complete
    // provider map; fold counts sequentially into the refcount map.
    type UseCounts = (BTreeMap<String, u64>, u64);
    let use_scans: Vec<(PathBuf, std::result::Result<UseCounts, SkipReason>)> = eligible
        .par_iter()
        .filter_map(|path| {
            let entry = state.entries.get(path)?;
            let counted = match scan::read_source(path) {
                Ok(source) => Ok(scan::count_uses(&source, &entry.provides, &state.providers)),
                Err(e) => Err(SkipReason::Unreadable(e.to_string())),
            };
            Some((path.clone(), counted))
        })
        .collect();

    for (path, counted) in use_scans {
        match counted {
            Ok((uses, total_usecount)) => {
                for (symbol, count) in &uses {
                    *state.refcounts.entry(symbol.clone()).or_insert(0) += count;
                }
                if let Some(entry) = state.entries.get_mut(&path) {
                    entry.uses = uses;
                    entry.total_usecount = total_usecount;
                }
            }
            Err(reason) => {
                skipped.insert(path, reason);
            }
        }
    }

    state.recompute_total_refcounts();

    let write_failures = store.write(&state, WriteMode::ClearAndWriteAll)?;
    let failed: BTreeSet<&PathBuf> = write_failures.iter().map(|f| &f.path).collect();
    let mut written: Vec<PathBuf> = state
        .entries
        .keys()
        .filter(|path| !failed.contains(path))
        .cloned()
        .collect();
    written.sort();

    Ok(RunOutcome {
        written,
        skipped: skipped.into_iter().collect(),
        write_failures,
    })
}
