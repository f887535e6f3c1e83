//! JSON Lines renderer: one object per record for tooling integration.

use crate::model::{Document, MarkerKind, MatchRecord};
use crate::render::{render_record, Renderer};
use anyhow::{Context, Result};
use serde::Serialize;

pub struct JsonRenderer;

/// Serialized view of a record, with field names that follow the kind.
#[derive(Serialize)]
struct JsonRecord<'a> {
    source: &'a str,
    kind: MarkerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<&'a str>,
    params: &'a str,
    start_line: usize,
    end_line: usize,
    rendering: String,
}

impl<'a> JsonRecord<'a> {
    fn new(source: &'a str, record: &'a MatchRecord) -> Self {
        let (class, namespace) = if record.kind.is_namespaced() {
            (None, Some(record.owner.as_str()))
        } else {
            (Some(record.owner.as_str()), None)
        };
        let (method, function) = match record.kind {
            MarkerKind::NsCall => (None, Some(record.name.as_str())),
            _ => (Some(record.name.as_str()), None),
        };
        JsonRecord {
            source,
            kind: record.kind,
            class,
            namespace,
            instance: record.instance.as_deref(),
            method,
            function,
            params: &record.params,
            start_line: record.start_line,
            end_line: record.end_line,
            rendering: render_record(record),
        }
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, source: &str, _doc: &Document, records: &[MatchRecord]) -> Result<String> {
        let mut out = String::new();
        for record in records {
            let line = serde_json::to_string(&JsonRecord::new(source, record))
                .context("failed to serialize record")?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}
