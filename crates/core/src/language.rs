//! Static language-to-identifier catalogue.
//!
//! Maps the short names a caller picks (`cpp`, `python`, ...) to the
//! execution-environment ids the remote service expects. Submissions
//! whose id is not listed here are rejected before any network call.

use crate::error::CoreError;
use crate::types::LanguageId;

/// One selectable execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Id sent as `language_id` on submission.
    pub id: LanguageId,
    /// Short lowercase key used for lookup, e.g. `"cpp"`.
    pub name: &'static str,
    /// Human-readable label including the toolchain version.
    pub label: &'static str,
}

const fn lang(id: LanguageId, name: &'static str, label: &'static str) -> Language {
    Language { id, name, label }
}

/// Every language the client accepts, ordered by label.
pub const LANGUAGES: &[Language] = &[
    lang(45, "assembly", "Assembly (NASM 2.14.02)"),
    lang(46, "bash", "Bash (5.0.0)"),
    lang(50, "c", "C (GCC 9.2.0)"),
    lang(54, "cpp", "C++ (GCC 9.2.0)"),
    lang(86, "clojure", "Clojure (1.10.1)"),
    lang(51, "csharp", "C# (Mono 6.6.0.161)"),
    lang(77, "cobol", "COBOL (GnuCOBOL 2.2)"),
    lang(55, "lisp", "Common Lisp (SBCL 2.0.0)"),
    lang(56, "d", "D (DMD 2.089.1)"),
    lang(57, "elixir", "Elixir (1.9.4)"),
    lang(58, "erlang", "Erlang (OTP 22.2)"),
    lang(87, "fsharp", "F# (.NET Core SDK 3.1.202)"),
    lang(59, "fortran", "Fortran (GFortran 9.2.0)"),
    lang(60, "go", "Go (1.13.5)"),
    lang(88, "groovy", "Groovy (3.0.3)"),
    lang(61, "haskell", "Haskell (GHC 8.8.1)"),
    lang(62, "java", "Java (OpenJDK 13.0.1)"),
    lang(63, "javascript", "JavaScript (Node.js 12.14.0)"),
    lang(78, "kotlin", "Kotlin (1.3.70)"),
    lang(64, "lua", "Lua (5.3.5)"),
    lang(79, "objectivec", "Objective-C (Clang 7.0.1)"),
    lang(65, "ocaml", "OCaml (4.09.0)"),
    lang(66, "octave", "Octave (5.1.0)"),
    lang(67, "pascal", "Pascal (FPC 3.0.4)"),
    lang(85, "perl", "Perl (5.28.1)"),
    lang(68, "php", "PHP (7.4.1)"),
    lang(43, "plaintext", "Plain Text"),
    lang(69, "prolog", "Prolog (GNU Prolog 1.4.5)"),
    lang(70, "python2", "Python (2.7.17)"),
    lang(71, "python", "Python (3.8.1)"),
    lang(80, "r", "R (4.0.0)"),
    lang(72, "ruby", "Ruby (2.7.0)"),
    lang(73, "rust", "Rust (1.40.0)"),
    lang(81, "scala", "Scala (2.13.2)"),
    lang(82, "sql", "SQL (SQLite 3.27.2)"),
    lang(83, "swift", "Swift (5.2.3)"),
    lang(74, "typescript", "TypeScript (3.7.4)"),
    lang(84, "vbnet", "Visual Basic.Net (vbnc 0.0.0.5943)"),
];

pub fn find_by_id(id: LanguageId) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.id == id)
}

/// Case-insensitive lookup by short name.
pub fn find_by_name(name: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.name.eq_ignore_ascii_case(name))
}

/// Resolve a user-supplied selector: a short name or a numeric id.
pub fn resolve(selector: &str) -> Result<&'static Language, CoreError> {
    let selector = selector.trim();
    if let Ok(id) = selector.parse::<LanguageId>() {
        return find_by_id(id).ok_or(CoreError::UnsupportedLanguageId(id));
    }
    find_by_name(selector).ok_or_else(|| CoreError::UnknownLanguage(selector.to_string()))
}
