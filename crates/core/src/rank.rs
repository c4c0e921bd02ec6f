//! Relevance ranking over persisted cache records.

use crate::cache::CacheStore;
use std::path::PathBuf;

/// Rank paths by how strongly they are coupled to the rest of the
/// indexed set: `score = total_usecount * total_refcount`, descending.
/// Paths without a record score 0. The sort is stable, so ties keep
/// the caller's order. Each call reads fresh from the store; no extra
/// caching.
pub fn rank(store: &CacheStore, paths: &[PathBuf], top_n: usize) -> Vec<PathBuf> {
    let mut scored: Vec<(&PathBuf, u64)> = paths
        .iter()
        .map(|path| {
            let score = store
                .read_entry(path)
                .map(|entry| entry.total_usecount * entry.total_refcount)
                .unwrap_or(0);
            (path, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(top_n)
        .map(|(path, _)| path.clone())
        .collect()
}
