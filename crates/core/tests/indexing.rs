use relscope_core::{IndexEngine, IndexMode, SkipReason};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use xxhash_rust::xxh3::xxh3_128;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn record_path(cache_root: &Path, real_path: &Path) -> PathBuf {
    let hex = format!("{:032x}", xxh3_128(real_path.to_string_lossy().as_bytes()));
    cache_root.join(&hex[..2]).join(&hex)
}

// Backdate a file's record so the source is strictly newer, without
// sleeping across filesystem timestamp granularity.
fn make_stale(cache_root: &Path, real_path: &Path) {
    let record = File::options()
        .write(true)
        .open(record_path(cache_root, real_path))
        .unwrap();
    record
        .set_modified(SystemTime::now() - Duration::from_secs(3600))
        .unwrap();
}

fn record_bytes(cache_root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut records = BTreeMap::new();
    if !cache_root.exists() {
        return records;
    }
    for shard in fs::read_dir(cache_root).unwrap() {
        let shard = shard.unwrap();
        for record in fs::read_dir(shard.path()).unwrap() {
            let record = record.unwrap();
            records.insert(record.path(), fs::read(record.path()).unwrap());
        }
    }
    records
}

#[test]
fn full_reindex_builds_provides_uses_and_refcounts() {
    let src = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let a = write_file(src.path(), "a.py", "def foo():\n    pass\n");
    let b = write_file(src.path(), "b.py", "foo()\nfoo()\n");

    let engine = IndexEngine::new(cache.path().join("cache"));
    let report = engine
        .index(&[a.clone(), b.clone()], true)
        .unwrap();

    assert_eq!(report.mode, IndexMode::Full);
    assert_eq!(report.written, vec![a.clone(), b.clone()]);
    assert!(report.skipped.is_empty());
    assert!(report.write_failures.is_empty());

    let entry_a = engine.store().read_entry(&a).unwrap();
    assert!(entry_a.provides_symbol("foo"));
    assert!(entry_a.uses.is_empty());
    assert_eq!(entry_a.total_usecount, 0);
    assert_eq!(entry_a.total_refcount, 2);

    let entry_b = engine.store().read_entry(&b).unwrap();
    assert!(entry_b.provides.is_empty());
    assert_eq!(entry_b.uses.get("foo"), Some(&2));
    assert_eq!(entry_b.total_usecount, 2);
    assert_eq!(entry_b.total_refcount, 0);

    // Both score 0 (0*2 and 2*0); the stable sort keeps input order.
    assert_eq!(engine.relevance(&[a.clone(), b.clone()], 1), vec![a]);
}

#[test]
fn relevance_orders_by_usecount_times_refcount() {
    let src = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let a = write_file(
        src.path(),
        "a.py",
        "def alpha():\n    pass\nbeta()\nbeta()\nbeta()\n",
    );
    let b = write_file(src.path(), "b.py", "def beta():\n    pass\nalpha()\n");
    let c = write_file(
        src.path(),
        "c.py",
        "def gamma():\n    pass\nalpha()\nalpha()\n",
    );

    let engine = IndexEngine::new(cache.path().join("cache"));
    engine
        .index(&[a.clone(), b.clone(), c.clone()], true)
        .unwrap();

    // refcounts: alpha=3, beta=3, gamma=0
    // scores: a = 3*3 = 9, b = 1*3 = 3, c = 2*0 = 0
    let paths = vec![c.clone(), b.clone(), a.clone()];
    assert_eq!(
        engine.relevance(&paths, 3),
        vec![a.clone(), b.clone(), c.clone()]
    );
    assert_eq!(engine.relevance(&paths, 2), vec![a, b]);
}

#[test]
fn second_run_with_no_changes_is_clean_and_writes_nothing() {
    let src = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let a = write_file(src.path(), "a.py", "def foo():\n    pass\n");
    let b = write_file(src.path(), "b.py", "foo()\n");
    let cache_root = cache.path().join("cache");

    let engine = IndexEngine::new(cache_root.clone());
    engine.index(&[a.clone(), b.clone()], true).unwrap();
    let before = record_bytes(&cache_root);

    let report = engine.index(&[a, b], false).unwrap();
    assert_eq!(report.mode, IndexMode::Clean);
    assert!(report.written.is_empty());
    assert_eq!(record_bytes(&cache_root), before);
}

#[test]
fn stale_count_above_threshold_forces_full_rebuild() {
    let src = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let cache_root = cache.path().join("cache");
    let paths: Vec<PathBuf> = (0..101)
        .map(|i| {
            write_file(
                src.path(),
                &format!("mod_{i}.py"),
                &format!("def sym_{i}():\n    pass\n"),
            )
        })
        .collect();

    let engine = IndexEngine::new(cache_root.clone());
    engine.index(&paths, false).unwrap();

    // 100 stale files stay within the incremental path.
    for path in &paths[..100] {
        make_stale(&cache_root, path);
    }
    let report = engine.index(&paths, false).unwrap();
    assert_eq!(report.mode, IndexMode::Incremental);

    // 101 stale files tip into a full clear-and-rewrite of everything.
    for path in &paths {
        make_stale(&cache_root, path);
    }
    let report = engine.index(&paths, false).unwrap();
    assert_eq!(report.mode, IndexMode::Full);
    assert_eq!(report.written.len(), paths.len());
}

#[test]
fn ineligible_paths_are_reported_with_reasons() {
    let src = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let a = write_file(src.path(), "a.py", "def foo():\n    pass\n");
    let readme = write_file(src.path(), "README.txt", "nothing to scan\n");
    let missing = src.path().join("gone.py");

    let engine = IndexEngine::new(cache.path().join("cache"));
    let report = engine
        .index(&[a.clone(), readme.clone(), missing.clone()], true)
        .unwrap();

    assert_eq!(report.written, vec![a]);
    assert!(
        report
            .skipped
            .contains(&(readme, SkipReason::UnknownLanguage))
    );
    assert!(
        report
            .skipped
            .contains(&(missing, SkipReason::NotRegularFile))
    );
}

#[test]
fn clear_drops_the_cache_and_next_run_rebuilds() {
    let src = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let a = write_file(src.path(), "a.py", "def foo():\n    pass\n");
    let cache_root = cache.path().join("cache");

    let engine = IndexEngine::new(cache_root.clone());
    engine.index(&[a.clone()], true).unwrap();
    assert!(cache_root.exists());

    engine.clear().unwrap();
    assert!(!cache_root.exists());

    let report = engine.index(&[a], false).unwrap();
    assert_eq!(report.mode, IndexMode::Full);
}
