//! Source languages.
//!
//! Every source file is routed to a compile rule by its language class,
//! which is derived from the file extension.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Language class of a source file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C language (default)
    #[default]
    C,
    /// C++ language
    #[serde(alias = "cpp", alias = "cxx", alias = "c++")]
    Cxx,
}

impl Language {
    /// All language classes, in the order unity batches are produced.
    pub const ALL: [Language; 2] = [Language::C, Language::Cxx];

    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }

    /// Short identifier used in generated file names.
    pub fn ident(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "cxx",
        }
    }

    /// Extension given to synthesized unity sources of this language.
    pub fn unity_extension(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "cpp",
        }
    }

    /// Classify a source file by its extension.
    ///
    /// `.C` (uppercase) is C++ on case-sensitive filesystems and is treated
    /// as such everywhere. Returns `None` for anything that is not a
    /// compilable C or C++ source.
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "c" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "c++" | "C" | "CPP" | "CC" | "CXX" => Some(Language::Cxx),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source path together with its language class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub lang: Language,
}

impl SourceFile {
    /// Classify `path`, or `None` if it is not a C or C++ source.
    pub fn classify(path: impl Into<PathBuf>) -> Option<SourceFile> {
        let path = path.into();
        let lang = Language::from_path(&path)?;
        Some(SourceFile { path, lang })
    }
}
