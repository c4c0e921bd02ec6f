use crate::{Language, patterns};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("identifier pattern"));

/// Extract the set of symbols a source file appears to declare.
///
/// Runs every pattern row for the language over the whole source,
/// flattens all participating capture groups, and dedupes across
/// categories. `Unknown` sources declare nothing.
pub fn provided_symbols(lang: Language, source: &str) -> BTreeSet<String> {
    let mut symbols = BTreeSet::new();
    for (_kind, re) in patterns::for_language(lang) {
        for caps in re.captures_iter(source) {
            for group in caps.iter().skip(1).flatten() {
                symbols.insert(group.as_str().to_string());
            }
        }
    }
    symbols
}

/// Every identifier-like token in the source, in order and with
/// multiplicity. Callers count occurrences against known providers.
pub fn identifier_tokens(source: &str) -> impl Iterator<Item = &str> {
    IDENTIFIER.find_iter(source).map(|m| m.as_str())
}
