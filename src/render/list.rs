//! Plain list renderer: one `source:line: rendering` entry per record.

use crate::model::{Document, MatchRecord};
use crate::render::{render_record, Renderer};
use anyhow::Result;

pub struct ListRenderer;

impl Renderer for ListRenderer {
    fn render(&self, source: &str, _doc: &Document, records: &[MatchRecord]) -> Result<String> {
        let mut out = String::new();
        for record in records {
            if record.start_line == record.end_line {
                out.push_str(&format!("{}:{}: ", source, record.start_line));
            } else {
                out.push_str(&format!(
                    "{}:{}-{}: ",
                    source, record.start_line, record.end_line
                ));
            }
            out.push_str(&render_record(record));
            out.push('\n');
        }
        Ok(out)
    }
}
