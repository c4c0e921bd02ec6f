//! Incremental update: patch the stale files, then propagate through
//! the uses/provides dependency edges so files whose providers moved
//! get their counts redone without having changed themselves.

use super::{RunOutcome, scan};
use crate::cache::{CacheStore, WriteMode};
use crate::error::Result;
use crate::model::{CacheEntry, SkipReason};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::info;

pub(crate) fn run(
    store: &CacheStore,
    stale: &[PathBuf],
    eligible: &[PathBuf],
) -> Result<RunOutcome> {
    let mut state = store.read_all()?;
    let mut skipped: BTreeMap<PathBuf, SkipReason> = BTreeMap::new();

    let mut changed: BTreeSet<PathBuf> = stale.iter().cloned().collect();
    let mut provides_changed: BTreeSet<String> = BTreeSet::new();

    // A corrupt record passes the mtime check but was dropped by
    // read_all; with no valid baseline the file counts as stale too.
    let mut to_rescan: Vec<PathBuf> = stale.to_vec();
    for path in eligible {
        if !state.entries.contains_key(path) && changed.insert(path.clone()) {
            to_rescan.push(path.clone());
        }
    }
    info!(files = to_rescan.len(), "performing incremental update");

    // Re-scan provides for the stale files and diff against their old
    // entries to learn which symbols appeared, vanished, or moved.
    for path in &to_rescan {
        let symbols = match scan::scan_provides(path) {
            Ok(symbols) => symbols,
            Err(reason) => {
                skipped.insert(path.clone(), reason);
                BTreeSet::new()
            }
        };
        let old_provides: BTreeSet<String> = state
            .entries
            .get(path)
            .map(|entry| entry.provides.keys().cloned().collect())
            .unwrap_or_default();

        for added in symbols.difference(&old_provides) {
            provides_changed.insert(added.clone());
            state.providers.insert(added.clone(), path.clone());
        }
        for removed in old_provides.difference(&symbols) {
            provides_changed.insert(removed.clone());
            // Only drop the mapping if this file is still the recorded
            // provider; the symbol may have moved elsewhere already.
            if state.providers.get(removed).is_some_and(|p| p == path) {
                state.providers.remove(removed);
            }
        }

        state
            .entries
            .insert(path.clone(), CacheEntry::with_provides(path.clone(), symbols));
    }

    // Propagate: any other cached file whose uses mention a changed
    // symbol may now have wrong counts.
    let propagated: Vec<PathBuf> = state
        .entries
        .iter()
        .filter(|(path, _)| !changed.contains(*path))
        .filter(|(_, entry)| entry.uses.keys().any(|s| provides_changed.contains(s)))
        .map(|(path, _)| path.clone())
        .collect();
    changed.extend(propagated);

    // Re-scan provides across the whole changed set (idempotent for the
    // stale files) and point the provider map at them.
    for path in &changed {
        let symbols = match scan::scan_provides(path) {
            Ok(symbols) => symbols,
            Err(reason) => {
                skipped.insert(path.clone(), reason);
                BTreeSet::new()
            }
        };
        let entry = state
            .entries
            .entry(path.clone())
            .or_insert_with(|| CacheEntry::new(path.clone()));
        entry.provides = symbols.iter().cloned().map(|s| (s, 0)).collect();
        for symbol in symbols {
            state.providers.insert(symbol, path.clone());
        }
    }

    // Recompute uses for exactly the changed set against the updated
    // provider map.
    for path in &changed {
        let counted = match state.entries.get(path) {
            Some(entry) => match scan::read_source(path) {
                Ok(source) => Some(scan::count_uses(&source, &entry.provides, &state.providers)),
                Err(e) => {
                    skipped.insert(path.clone(), SkipReason::Unreadable(e.to_string()));
                    None
                }
            },
            None => None,
        };
        if let Some(entry) = state.entries.get_mut(path) {
            let (uses, total_usecount) = counted.unwrap_or_default();
            entry.uses = uses;
            entry.total_usecount = total_usecount;
        }
    }

    // Provider changes shift global counts even for untouched files, so
    // refcounts are rebuilt over every entry, changed or not.
    state.rebuild_refcounts();
    state.recompute_total_refcounts();

    let write_failures = store.write(&state, WriteMode::Subset(&changed))?;
    let failed: BTreeSet<&PathBuf> = write_failures.iter().map(|f| &f.path).collect();
    let written: Vec<PathBuf> = changed
        .iter()
        .filter(|path| !failed.contains(path))
        .cloned()
        .collect();

    Ok(RunOutcome {
        written,
        skipped: skipped.into_iter().collect(),
        write_failures,
    })
}
