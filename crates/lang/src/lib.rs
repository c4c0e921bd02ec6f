//! Language classification and heuristic symbol extraction.
//!
//! Everything in this crate is a pure function of a path or a source
//! string; file I/O belongs to the caller.

mod patterns;
mod scanner;

pub use patterns::SymbolKind;
pub use scanner::{identifier_tokens, provided_symbols};

use std::path::Path;

/// Language tag derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp,
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Java,
    Zig,
    Perl,
    Php,
    VisualBasic,
    Go,
    Sql,
    Fortran,
    Matlab,
    R,
    Ruby,
    Kotlin,
    Swift,
    Unknown,
}

impl Language {
    /// Classify a path by extension, case-insensitively. Total: unmapped
    /// or missing extensions yield `Unknown`.
    pub fn from_path(path: &Path) -> Language {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("c") | Some("h") => Language::C,
            Some("cpp") | Some("hpp") | Some("cc") | Some("hh") => Language::Cpp,
            Some("py") => Language::Python,
            Some("rs") => Language::Rust,
            Some("js") => Language::JavaScript,
            Some("ts") => Language::TypeScript,
            Some("java") => Language::Java,
            Some("zig") => Language::Zig,
            Some("pl") => Language::Perl,
            Some("php") => Language::Php,
            Some("vb") => Language::VisualBasic,
            Some("go") => Language::Go,
            Some("sql") => Language::Sql,
            Some("f") | Some("f90") | Some("f95") => Language::Fortran,
            Some("m") => Language::Matlab,
            Some("r") => Language::R,
            Some("rb") => Language::Ruby,
            Some("kt") => Language::Kotlin,
            Some("swift") => Language::Swift,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Zig => "zig",
            Language::Perl => "perl",
            Language::Php => "php",
            Language::VisualBasic => "visualbasic",
            Language::Go => "go",
            Language::Sql => "sql",
            Language::Fortran => "fortran",
            Language::Matlab => "matlab",
            Language::R => "r",
            Language::Ruby => "ruby",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
            Language::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
