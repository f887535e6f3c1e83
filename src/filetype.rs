//! File-type gating for scan triggers.
//!
//! Only C sources and headers are scanned by default; permissive mode also
//! accepts C++.

use std::path::Path;
use std::str::FromStr;

/// Declared language of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Header,
    Cpp,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "c" => Some(Language::C),
            "h" => Some(Language::Header),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Some(Language::Cpp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Header => "h",
            Language::Cpp => "cpp",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_extension(&s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown language: {}. Use c, h or cpp", s))
    }
}

/// Which declared languages may be scanned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eligibility {
    /// Also accept C++ sources
    pub permissive: bool,
}

impl Eligibility {
    pub fn accepts(&self, lang: Option<Language>) -> bool {
        match lang {
            Some(Language::C | Language::Header) => true,
            Some(Language::Cpp) => self.permissive,
            None => false,
        }
    }

    pub fn accepts_path(&self, path: &Path) -> bool {
        self.accepts(Language::from_path(path))
    }
}
