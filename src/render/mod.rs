//! Renderer module: one-line marker renderings and trait-based output
//! format dispatch.

pub mod annotate;
pub mod json;
pub mod list;

use crate::model::{Document, MarkerKind, MatchRecord};
use anyhow::{anyhow, Result};

/// Human-readable rendering of one record:
///
/// | Kind   | Rendering                             |
/// |--------|---------------------------------------|
/// | CALL   | `(<class>&)<instance>.<method>(<params>)` |
/// | NSCALL | `<namespace>::<function>(<params>)`   |
/// | MTD    | `<class>.<method>(<params>)`          |
/// | NSMTD  | `<namespace>::<method>(<params>)`     |
pub fn render_record(record: &MatchRecord) -> String {
    match record.kind {
        MarkerKind::Call => format!(
            "({}&){}.{}({})",
            record.owner,
            record.instance.as_deref().unwrap_or_default(),
            record.name,
            record.params
        ),
        MarkerKind::NsCall | MarkerKind::NsMethodDef => {
            format!("{}::{}({})", record.owner, record.name, record.params)
        }
        MarkerKind::MethodDef => format!("{}.{}({})", record.owner, record.name, record.params),
    }
}

/// Trait for rendering the records of one scanned source.
pub trait Renderer {
    /// `source` names the input (a path, or `<stdin>`).
    fn render(&self, source: &str, doc: &Document, records: &[MatchRecord]) -> Result<String>;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "list" => Ok(Box::new(list::ListRenderer)),
        "annotate" => Ok(Box::new(annotate::AnnotateRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!(
            "unknown format: {}. Use list, annotate, or json",
            format
        )),
    }
}
