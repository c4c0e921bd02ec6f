//! Per-file scan helpers shared by full and incremental runs. Each
//! scan is a pure function of one file's content, which is what lets
//! the full-rebuild passes fan out across rayon workers.

use crate::model::SkipReason;
use relscope_lang::{Language, identifier_tokens, provided_symbols};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// A path is indexable iff its language is known and it is an existing
/// regular file. Returns the reason when it is not.
pub(crate) fn eligibility(path: &Path) -> Option<SkipReason> {
    if !Language::from_path(path).is_known() {
        return Some(SkipReason::UnknownLanguage);
    }
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => None,
        _ => Some(SkipReason::NotRegularFile),
    }
}

/// Lossy read: invalid UTF-8 is replaced rather than treated as an
/// error, since the pattern heuristics tolerate mangled bytes.
pub(crate) fn read_source(path: &Path) -> std::io::Result<String> {
    Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned())
}

pub(crate) fn scan_provides(path: &Path) -> Result<BTreeSet<String>, SkipReason> {
    let source = read_source(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
    Ok(provided_symbols(Language::from_path(path), &source))
}

/// Count references to locally provided symbols in one file's source.
/// Tokens the file provides itself are not counted, nor are tokens no
/// indexed file provides (foreign and library symbols are out of
/// scope).
pub(crate) fn count_uses(
    source: &str,
    own_provides: &BTreeMap<String, u64>,
    providers: &HashMap<String, PathBuf>,
) -> (BTreeMap<String, u64>, u64) {
    let mut uses = BTreeMap::new();
    let mut total = 0u64;
    for token in identifier_tokens(source) {
        if own_provides.contains_key(token) {
            continue;
        }
        if !providers.contains_key(token) {
            continue;
        }
        *uses.entry(token.to_string()).or_insert(0) += 1;
        total += 1;
    }
    (uses, total)
}
