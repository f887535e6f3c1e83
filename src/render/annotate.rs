//! Annotated source renderer.
//!
//! Reproduces the source and inserts each placed rendering on its own line
//! below the marker, the way an editor shows virtual lines.

use crate::model::{Document, MatchRecord};
use crate::overlay::place;
use crate::render::Renderer;
use anyhow::Result;

pub struct AnnotateRenderer;

impl Renderer for AnnotateRenderer {
    fn render(&self, _source: &str, doc: &Document, records: &[MatchRecord]) -> Result<String> {
        let annotations = place(doc, records);
        let mut lines: Vec<String> = Vec::with_capacity(doc.line_count() + annotations.len());

        for (i, line) in doc.lines().enumerate() {
            lines.push(line.to_string());
            // Reuse the source line's terminator so CRLF files stay CRLF
            let cr = if line.ends_with('\r') { "\r" } else { "" };
            for annotation in annotations.iter().filter(|a| a.line == i + 1) {
                lines.push(format!("{}{}{}", annotation.indent, annotation.text, cr));
            }
        }

        let mut out = lines.join("\n");
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}
