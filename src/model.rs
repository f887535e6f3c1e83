//! Data model for scanned markers, format-agnostic.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Read-only snapshot of a source buffer.
///
/// Lines are joined with a single `\n` to form the flat text the scanner
/// walks; line numbers are recovered by counting newlines in a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    /// Build a document from an ordered sequence of lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.as_ref());
        }
        Document { text }
    }

    /// Build a document from flat text. A trailing newline yields a final
    /// empty line, so the text round-trips unchanged.
    pub fn from_text(text: &str) -> Self {
        Document {
            text: text.to_string(),
        }
    }

    /// The flat text buffer.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Iterate over the lines, without their `\n` separators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.text.bytes().filter(|&b| b == b'\n').count() + 1
    }

    /// 1-based line lookup. `None` when `n` is out of bounds.
    pub fn line(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.lines().nth(n - 1)
    }

    /// 1-based line number of the line containing byte `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        let end = offset.min(self.text.len());
        self.text.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }
}

/// The four recognized marker shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// `CALL(class, instance, method /params/)`
    Call,
    /// `NSCALL(namespace, function /params/)`
    NsCall,
    /// `MTD(class, method /params/)`
    MethodDef,
    /// `NSMTD(namespace, method /params/)`
    NsMethodDef,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 4] = [
        MarkerKind::Call,
        MarkerKind::NsCall,
        MarkerKind::MethodDef,
        MarkerKind::NsMethodDef,
    ];

    /// Literal keyword as it appears in source, without the `(`.
    pub fn keyword(self) -> &'static str {
        match self {
            MarkerKind::Call => "CALL",
            MarkerKind::NsCall => "NSCALL",
            MarkerKind::MethodDef => "MTD",
            MarkerKind::NsMethodDef => "NSMTD",
        }
    }

    /// Number of comma-delimited fields before the parameter section.
    pub fn leading_fields(self) -> usize {
        match self {
            MarkerKind::Call => 3,
            MarkerKind::NsCall | MarkerKind::MethodDef | MarkerKind::NsMethodDef => 2,
        }
    }

    /// True when the first field names a namespace rather than a class.
    pub fn is_namespaced(self) -> bool {
        matches!(self, MarkerKind::NsCall | MarkerKind::NsMethodDef)
    }

    pub fn from_keyword(keyword: &str) -> Option<MarkerKind> {
        MarkerKind::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    fn snake_name(self) -> &'static str {
        match self {
            MarkerKind::Call => "call",
            MarkerKind::NsCall => "ns_call",
            MarkerKind::MethodDef => "method_def",
            MarkerKind::NsMethodDef => "ns_method_def",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for MarkerKind {
    type Err = String;

    /// Accepts the source keyword (`NSCALL`) or the snake-case name (`ns_call`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkerKind::ALL
            .into_iter()
            .find(|k| k.keyword().eq_ignore_ascii_case(s) || k.snake_name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown marker kind: {}. Use CALL, NSCALL, MTD or NSMTD",
                    s
                )
            })
    }
}

/// One recognized marker, fully normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub kind: MarkerKind,
    /// Class (`CALL`, `MTD`) or namespace (`NSCALL`, `NSMTD`)
    pub owner: String,
    /// Instance name, `CALL` only
    pub instance: Option<String>,
    /// Method or function name
    pub name: String,
    /// Parameter section, emitted as one opaque string
    pub params: String,
    /// 1-based line of the marker keyword
    pub start_line: usize,
    /// 1-based line of the matching `)`
    pub end_line: usize,
}
