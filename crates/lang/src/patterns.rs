//! Per-language declaration pattern tables.
//!
//! These are line-anchored textual heuristics, not grammars: multi-line
//! or unconventional formatting is allowed to under- or over-match.
//! The tables are compiled once on first use; adding a language means
//! adding a `Language` variant and a row here.

use crate::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Category of a matched declaration. Categories only label the table
/// rows; matches from every category are unioned into one symbol set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Method,
    Function,
    Struct,
    Macro,
    Template,
}

pub(crate) type PatternRow = (SymbolKind, Regex);

static TABLES: Lazy<HashMap<Language, Vec<PatternRow>>> = Lazy::new(build_tables);

pub(crate) fn for_language(lang: Language) -> &'static [PatternRow] {
    TABLES.get(&lang).map(Vec::as_slice).unwrap_or(&[])
}

fn compile(rows: &[(SymbolKind, &str)]) -> Vec<PatternRow> {
    rows.iter()
        .map(|(kind, pattern)| {
            let re = Regex::new(&format!("(?m){pattern}"))
                .unwrap_or_else(|e| panic!("invalid declaration pattern {pattern:?}: {e}"));
            (*kind, re)
        })
        .collect()
}

fn build_tables() -> HashMap<Language, Vec<PatternRow>> {
    use SymbolKind::*;

    let mut tables = HashMap::new();

    tables.insert(
        Language::C,
        compile(&[
            (Method, r"^\s*(?:\w+\s+)*(\w+)\s*\([^)]*\)\s*\{"),
            (Macro, r"^\s*#define\s+(\w+)"),
            (Struct, r"^\s*struct\s+(\w+)\s*\{"),
        ]),
    );
    tables.insert(
        Language::Cpp,
        compile(&[
            (Class, r"^\s*class\s+(\w+)"),
            (
                Method,
                r"^\s*(?:\w+\s+)*(\w+)\s*\([^)]*\)\s*(?:const)?\s*(?:override)?\s*\{",
            ),
            (Macro, r"^\s*#define\s+(\w+)"),
            (
                Template,
                r"^\s*template\s*<[^>]*>\s*(?:class|struct|typename)\s+(\w+)",
            ),
            (Struct, r"^\s*struct\s+(\w+)\s*\{"),
        ]),
    );
    tables.insert(
        Language::Python,
        compile(&[
            (Class, r"^\s*class\s+(\w+)"),
            (Method, r"^\s*def\s+(\w+)\s*\("),
        ]),
    );
    tables.insert(
        Language::Rust,
        compile(&[
            (Method, r"^\s*(?:pub\s+)?fn\s+(\w+)"),
            (Macro, r"^\s*macro_rules!\s+(\w+)"),
            (Struct, r"^\s*(?:pub\s+)?struct\s+(\w+)"),
        ]),
    );
    tables.insert(
        Language::JavaScript,
        compile(&[
            (Class, r"^\s*class\s+(\w+)"),
            (
                Method,
                r"^\s*(?:async\s+)?(?:function\s+(\w+)|(\w+)\s*=\s*(?:async\s+)?\([^)]*\)\s*=>)",
            ),
        ]),
    );
    tables.insert(
        Language::TypeScript,
        compile(&[
            (Class, r"^\s*(?:export\s+)?class\s+(\w+)"),
            (
                Method,
                r"^\s*(?:public|private|protected)?\s*(?:async\s+)?(?:(\w+)\s*\([^)]*\)|(\w+)\s*:\s*(?:async\s+)?\([^)]*\)\s*=>)",
            ),
            (Template, r"^\s*interface\s+(\w+)<[^>]*>"),
        ]),
    );
    tables.insert(
        Language::Java,
        compile(&[
            (
                Class,
                r"^\s*(?:public|private|protected)?\s*(?:abstract)?\s*class\s+(\w+)",
            ),
            (
                Method,
                r"^\s*(?:public|private|protected)?\s*(?:static)?\s*(?:\w+\s+)*(\w+)\s*\([^)]*\)\s*(?:throws\s+\w+(?:,\s*\w+)*)?\s*\{",
            ),
            (
                Template,
                r"^\s*(?:public|private|protected)?\s*interface\s+(\w+)<[^>]*>",
            ),
        ]),
    );
    tables.insert(
        Language::Zig,
        compile(&[
            (Function, r"^\s*(?:pub\s+)?fn\s+(\w+)"),
            (Struct, r"^\s*(?:pub\s+)?struct\s+(\w+)"),
        ]),
    );
    tables.insert(
        Language::Perl,
        compile(&[(Function, r"^\s*sub\s+(\w+)")]),
    );
    tables.insert(
        Language::Php,
        compile(&[
            (Class, r"^\s*class\s+(\w+)"),
            (
                Method,
                r"^\s*(?:public|private|protected)?\s*function\s+(\w+)",
            ),
        ]),
    );
    tables.insert(
        Language::VisualBasic,
        compile(&[
            (Class, r"^\s*(?:Public\s+|Private\s+)?Class\s+(\w+)"),
            (Method, r"^\s*(?:Public\s+|Private\s+)?(?:Function|Sub)\s+(\w+)"),
        ]),
    );
    tables.insert(
        Language::Go,
        compile(&[
            (Function, r"^\s*func\s+(\w+)"),
            (Struct, r"^\s*type\s+(\w+)\s+struct"),
        ]),
    );
    tables.insert(
        Language::Sql,
        compile(&[
            (Function, r"^\s*CREATE\s+FUNCTION\s+(\w+)"),
            (Function, r"^\s*CREATE\s+PROCEDURE\s+(\w+)"),
        ]),
    );
    tables.insert(
        Language::Fortran,
        compile(&[
            (Function, r"^\s*(?:RECURSIVE\s+)?FUNCTION\s+(\w+)"),
            (Function, r"^\s*(?:RECURSIVE\s+)?SUBROUTINE\s+(\w+)"),
        ]),
    );
    tables.insert(
        Language::Matlab,
        compile(&[(Function, r"^\s*function\s+(?:\[?[^\]]*\]?\s*=\s*)?(\w+)")]),
    );
    tables.insert(
        Language::R,
        compile(&[(Function, r"^\s*(\w+)\s*<-\s*function")]),
    );
    tables.insert(
        Language::Ruby,
        compile(&[
            (Class, r"^\s*class\s+(\w+)"),
            (Method, r"^\s*def\s+(\w+)"),
        ]),
    );
    tables.insert(
        Language::Kotlin,
        compile(&[
            (Class, r"^\s*(?:abstract\s+)?class\s+(\w+)"),
            (Function, r"^\s*fun\s+(\w+)"),
        ]),
    );
    tables.insert(
        Language::Swift,
        compile(&[
            (
                Class,
                r"^\s*(?:public\s+|private\s+|fileprivate\s+|internal\s+)?class\s+(\w+)",
            ),
            (
                Function,
                r"^\s*(?:public\s+|private\s+|fileprivate\s+|internal\s+)?func\s+(\w+)",
            ),
            (
                Struct,
                r"^\s*(?:public\s+|private\s+|fileprivate\s+|internal\s+)?struct\s+(\w+)",
            ),
        ]),
    );

    tables
}
