//! Placement of rendered markers below their source lines.
//!
//! Each rendering goes directly under the line holding the marker's closing
//! `)`, indented to the column where the marker keyword starts on that line.

use crate::model::{Document, MatchRecord};
use crate::render::render_record;
use crate::scanner::scan;

/// One rendering positioned in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// 1-based line the annotation is placed after
    pub line: usize,
    /// Whitespace reproducing the keyword's column (tabs kept as tabs)
    pub indent: String,
    pub text: String,
}

/// Compute annotations for `records` against `document`.
///
/// A record pointing past the end of the document (document changed since
/// the scan) is warned about and skipped. A record whose keyword does not
/// appear on its end line is skipped silently.
pub fn place(document: &Document, records: &[MatchRecord]) -> Vec<Annotation> {
    let mut annotations = Vec::with_capacity(records.len());
    for record in records {
        let Some(line) = document.line(record.end_line) else {
            tracing::warn!(
                "{} marker ends on line {}, past the end of the document ({} lines)",
                record.kind,
                record.end_line,
                document.line_count()
            );
            continue;
        };

        let needle = format!("{}(", record.kind.keyword());
        let Some(byte_col) = line.find(&needle) else {
            tracing::debug!(
                "no {} on line {}, skipping annotation",
                needle,
                record.end_line
            );
            continue;
        };

        let indent = line[..byte_col]
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        annotations.push(Annotation {
            line: record.end_line,
            indent,
            text: render_record(record),
        });
    }
    annotations
}

/// Current annotation set for one document.
///
/// `refresh` builds the new set completely before replacing the old one, so
/// readers see either the previous set or the new one, never a cleared or
/// partial set.
#[derive(Debug, Default)]
pub struct Overlay {
    annotations: Vec<Annotation>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescan `document` and swap in the new annotations.
    pub fn refresh(&mut self, document: &Document) -> &[Annotation] {
        let records = scan(document);
        self.annotations = place(document, &records);
        &self.annotations
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}
