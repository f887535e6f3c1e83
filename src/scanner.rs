//! Marker scanner.
//!
//! Walks the document text left to right looking for `CALL(`, `NSCALL(`,
//! `MTD(` and `NSMTD(`, balances parentheses to find each marker's end,
//! and splits the enclosed text into leading fields and a `/`-delimited
//! parameter section:
//!
//! ```text
//! CALL(class, instance, method /param1, param2/)
//! NSCALL(namespace, function /param1, param2/)
//! MTD(class, method /param1, param2/)
//! NSMTD(namespace, method /param1, param2/)
//! ```
//!
//! Malformed markers (unbalanced parentheses, missing `/`, too few leading
//! fields) produce no record; scanning always continues.

use crate::model::{Document, MarkerKind, MatchRecord};
use crate::normalize::normalize;
use regex::Regex;
use std::sync::LazyLock;

static RE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(NSCALL|NSMTD|CALL|MTD)\(").unwrap());

/// A located marker before field splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch<'a> {
    pub kind: MarkerKind,
    /// Byte offset of the keyword
    pub start: usize,
    /// Byte offset of the matching `)`
    pub close: usize,
    /// Text between the marker's `(` and its matching `)`
    pub body: &'a str,
}

/// Raw (unnormalized) field slices of one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub leading: Vec<&'a str>,
    pub params: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Comma,
    Other,
}

/// Paren depth over a byte stream. Bytes inside double-quoted strings and
/// single-quoted char literals are opaque; a quote preceded by an odd
/// number of backslashes is escaped.
#[derive(Debug, Default)]
struct DepthTracker {
    depth: usize,
    /// The quote byte that opened the current literal
    quote: Option<u8>,
    backslashes: usize,
}

impl DepthTracker {
    fn step(&mut self, b: u8) -> Token {
        let escaped = self.backslashes % 2 == 1;
        self.backslashes = if b == b'\\' { self.backslashes + 1 } else { 0 };

        if let Some(quote) = self.quote {
            if b == quote && !escaped {
                self.quote = None;
            }
            return Token::Other;
        }
        match b {
            b'"' | b'\'' if !escaped => {
                self.quote = Some(b);
                Token::Other
            }
            b'(' => {
                self.depth += 1;
                Token::Open
            }
            b')' => {
                self.depth = self.depth.saturating_sub(1);
                Token::Close
            }
            b',' => Token::Comma,
            _ => Token::Other,
        }
    }
}

/// Offset of the `)` matching the `(` at `open`, or `None` if the text ends
/// first.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut tracker = DepthTracker::default();
    for (i, &b) in text.as_bytes().iter().enumerate().skip(open) {
        if tracker.step(b) == Token::Close && tracker.depth == 0 {
            return Some(i);
        }
    }
    None
}

/// Split a marker body into its leading fields and parameter section.
///
/// All but the last leading field end at depth-0 commas. The last one runs
/// to the first `/` after that point; this search is a plain substring
/// search and does not track depth. The parameter section runs from that
/// `/` to one character before the closing `)`.
pub fn split_fields(body: &str, kind: MarkerKind) -> Option<RawFields<'_>> {
    let wanted = kind.leading_fields() - 1;
    let mut leading = Vec::with_capacity(kind.leading_fields());
    let mut start = 0;

    if wanted > 0 {
        let mut tracker = DepthTracker::default();
        for (i, &b) in body.as_bytes().iter().enumerate() {
            if tracker.step(b) == Token::Comma && tracker.depth == 0 {
                leading.push(&body[start..i]);
                start = i + 1;
                if leading.len() == wanted {
                    break;
                }
            }
        }
    }
    if leading.len() < wanted {
        return None;
    }

    let slash = start + body[start..].find('/')?;
    leading.push(&body[start..slash]);

    let params_start = slash + 1;
    let params_end = body
        .char_indices()
        .next_back()
        .map_or(0, |(i, _)| i)
        .max(params_start);

    Some(RawFields {
        leading,
        params: &body[params_start..params_end],
    })
}

/// Find the next marker at or after `*cursor`.
///
/// Unterminated markers are skipped: the cursor moves just past the keyword
/// and the search resumes. On success the cursor is left untouched; the
/// caller advances it past the match.
fn next_marker<'a>(text: &'a str, cursor: &mut usize) -> Option<RawMatch<'a>> {
    while let Some(m) = RE_MARKER.find_at(text, *cursor) {
        let open = m.end() - 1;
        let Some(kind) = MarkerKind::from_keyword(&text[m.start()..open]) else {
            *cursor = m.end();
            continue;
        };
        match matching_paren(text, open) {
            Some(close) => {
                return Some(RawMatch {
                    kind,
                    start: m.start(),
                    close,
                    body: &text[open + 1..close],
                });
            }
            None => {
                tracing::debug!("unterminated {} marker at byte {}", kind, m.start());
                *cursor = open;
            }
        }
    }
    None
}

fn build_record(document: &Document, raw: &RawMatch<'_>) -> Option<MatchRecord> {
    let fields = split_fields(raw.body, raw.kind)?;
    let owner = normalize(fields.leading[0], false);
    let (instance, name) = match raw.kind {
        MarkerKind::Call => (
            Some(normalize(fields.leading[1], false)),
            normalize(fields.leading[2], false),
        ),
        MarkerKind::NsCall | MarkerKind::MethodDef | MarkerKind::NsMethodDef => {
            (None, normalize(fields.leading[1], false))
        }
    };

    Some(MatchRecord {
        kind: raw.kind,
        owner,
        instance,
        name,
        params: normalize(fields.params, true),
        start_line: document.line_of(raw.start),
        end_line: document.line_of(raw.close),
    })
}

/// Scan a document for markers, in source order.
///
/// Pure: the same document always yields the same records.
pub fn scan(document: &Document) -> Vec<MatchRecord> {
    let text = document.text();
    let mut records = Vec::new();
    let mut cursor = 0;

    while let Some(raw) = next_marker(text, &mut cursor) {
        match build_record(document, &raw) {
            Some(record) => records.push(record),
            None => tracing::debug!(
                "dropping malformed {} marker on line {}",
                raw.kind,
                document.line_of(raw.start)
            ),
        }
        cursor = raw.close + 1;
    }

    tracing::trace!("scan found {} markers", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_text(text: &str) -> Vec<MatchRecord> {
        scan(&Document::from_text(text))
    }

    #[test]
    fn call_end_to_end() {
        let records = scan_text("CALL(Foo, obj, bar /x, y/)");
        assert_eq!(
            records,
            vec![MatchRecord {
                kind: MarkerKind::Call,
                owner: "Foo".to_string(),
                instance: Some("obj".to_string()),
                name: "bar".to_string(),
                params: "x, y".to_string(),
                start_line: 1,
                end_line: 1,
            }]
        );
    }

    #[test]
    fn nscall_fields() {
        let records = scan_text("NSCALL(MyNs, doThing /1, 2/)");
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.kind, MarkerKind::NsCall);
        assert_eq!(r.owner, "MyNs");
        assert_eq!(r.instance, None);
        assert_eq!(r.name, "doThing");
        assert_eq!(r.params, "1, 2");
    }

    #[test]
    fn method_def_kinds() {
        let records = scan_text("MTD(Widget, draw /Ctx *c/)\nNSMTD(gfx, init /void/)");
        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::MethodDef, MarkerKind::NsMethodDef]);
        assert_eq!(records[0].owner, "Widget");
        assert_eq!(records[0].name, "draw");
        assert_eq!(records[0].params, "Ctx *c");
        assert_eq!(records[1].owner, "gfx");
        assert_eq!(records[1].name, "init");
        assert_eq!(records[1].start_line, 2);
    }

    #[test]
    fn nested_commas_do_not_split_params() {
        let records = scan_text("CALL(A, B, C /f(x, y), g(1,2)/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params, "f(x, y), g(1,2)");
    }

    #[test]
    fn nested_commas_do_not_split_leading_fields() {
        let records = scan_text("MTD(outer(a, b), m /x/)");
        assert_eq!(records[0].owner, "outer(a, b)");
        assert_eq!(records[0].name, "m");
    }

    #[test]
    fn missing_separator_yields_nothing() {
        assert!(scan_text("CALL(A, B, C)").is_empty());
    }

    #[test]
    fn unterminated_marker_yields_nothing() {
        assert!(scan_text("CALL(A, B, C").is_empty());
        assert!(scan_text("NSCALL(").is_empty());
    }

    #[test]
    fn unterminated_marker_does_not_hide_later_ones() {
        let records = scan_text("CALL(A, B, C /x/\nMTD(K, m /y/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MarkerKind::MethodDef);
        assert_eq!(records[0].start_line, 2);
    }

    #[test]
    fn too_few_leading_fields_yields_nothing() {
        assert!(scan_text("CALL(A, m /x/)").is_empty());
        assert!(scan_text("MTD(m /x/)").is_empty());
    }

    #[test]
    fn continuation_in_class_field() {
        let records = scan_text("CALL(Fo\\\no, obj, bar /x/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner, "Foo");
        assert_eq!(records[0].start_line, 1);
        assert_eq!(records[0].end_line, 2);
    }

    #[test]
    fn multi_line_marker_lines() {
        let text = "void f() {\n    CALL(Widget,\n         w,\n         draw /ctx, \"hello  world\"/);\n}\n";
        let records = scan_text(text);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!((r.start_line, r.end_line), (2, 4));
        assert_eq!(r.owner, "Widget");
        assert_eq!(r.instance.as_deref(), Some("w"));
        assert_eq!(r.name, "draw");
        assert_eq!(r.params, "ctx, \"hello  world\"");
    }

    #[test]
    fn parens_inside_strings_are_ignored() {
        let records = scan_text(r#"CALL(A, b, m /")", x/)"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params, r#"")", x"#);
    }

    #[test]
    fn escaped_quote_inside_string() {
        let records = scan_text(r#"NSCALL(io, puts /"a \") b"/)"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params, r#""a \") b""#);
    }

    #[test]
    fn quote_char_literal_does_not_open_string() {
        let records = scan_text("MTD(K, m /'\"'/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params, "'\"'");
        assert_eq!(records[0].end_line, 1);
    }

    #[test]
    fn quote_char_literals_on_consecutive_lines() {
        let records = scan_text("MTD(K, m /'\"'/)\nNSCALL(n, f /'\"'/)");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].params, "'\"'");
        assert_eq!((records[0].start_line, records[0].end_line), (1, 1));
        assert_eq!(records[1].kind, MarkerKind::NsCall);
        assert_eq!(records[1].params, "'\"'");
        assert_eq!((records[1].start_line, records[1].end_line), (2, 2));
    }

    #[test]
    fn paren_char_literals_keep_depth() {
        let records = scan_text("CALL(p, t, put /')', '(', ','/)\nMTD(K, m /x/)");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].params, "')', '(', ','");
        assert_eq!(records[1].name, "m");
    }

    #[test]
    fn escaped_char_literal_quote() {
        let records = scan_text(r"MTD(K, m /'\'', ')'/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params, r"'\'', ')'");
    }

    #[test]
    fn source_order_is_preserved() {
        let records = scan_text("MTD(A, a /1/) NSCALL(B, b /2/)\nCALL(C, c, cc /3/)");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "cc"]);
    }

    #[test]
    fn nscall_is_not_read_as_call() {
        let records = scan_text("NSCALL(N, f /x/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MarkerKind::NsCall);
        let records = scan_text("NSMTD(N, f /x/)");
        assert_eq!(records[0].kind, MarkerKind::NsMethodDef);
    }

    #[test]
    fn keyword_has_no_word_boundary() {
        let records = scan_text("XCALL(A, b, c /d/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MarkerKind::Call);
    }

    #[test]
    fn keyword_without_paren_is_ignored() {
        assert!(scan_text("CALL (A, b, c /d/)").is_empty());
    }

    #[test]
    fn marker_inside_params_is_consumed_by_outer() {
        let records = scan_text("CALL(A, b, m /NSCALL(N, f /1/)/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MarkerKind::Call);
        assert_eq!(records[0].params, "NSCALL(N, f /1/)");
    }

    #[test]
    fn malformed_marker_is_committed() {
        // The `/`-less CALL still consumes its span, so nothing inside it is scanned.
        let records = scan_text("CALL(MTD(K, m /x/), b, c)");
        assert!(records.is_empty());
    }

    #[test]
    fn empty_fields_are_accepted() {
        let records = scan_text("MTD(, /x/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner, "");
        assert_eq!(records[0].name, "");
        assert_eq!(records[0].params, "x");
    }

    #[test]
    fn empty_params() {
        let records = scan_text("MTD(K, m /)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params, "");
    }

    #[test]
    fn leading_comma_in_params_is_stripped() {
        let records = scan_text("CALL(A, b, m /, x, y/)");
        assert_eq!(records[0].params, "x, y");
    }

    #[test]
    fn slash_search_is_not_depth_aware() {
        // A `/` nested inside the last leading field ends it early.
        let records = scan_text("NSCALL(ns, f(a/b) /x/)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "f(a");
        assert_eq!(records[0].params, "b) /x");
    }

    #[test]
    fn slash_in_earlier_fields_is_skipped() {
        let records = scan_text("CALL(a/b, obj, m /x/)");
        assert_eq!(records[0].owner, "a/b");
        assert_eq!(records[0].name, "m");
        assert_eq!(records[0].params, "x");
    }

    #[test]
    fn multibyte_last_char_does_not_panic() {
        let records = scan_text("MTD(K, m /xé)");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params, "x");
    }

    #[test]
    fn scan_is_idempotent() {
        let doc = Document::from_text("CALL(A, b, c /1/)\nNSMTD(n, m /\"  s  \"/)\nCALL(oops");
        assert_eq!(scan(&doc), scan(&doc));
    }

    #[test]
    fn matching_paren_tracks_depth() {
        assert_eq!(matching_paren("f(a(b)c)", 1), Some(7));
        assert_eq!(matching_paren("f(a(b c", 1), None);
    }

    #[test]
    fn split_fields_raw_slices() {
        let fields = split_fields("Foo, obj, bar /x, y/", MarkerKind::Call).unwrap();
        assert_eq!(fields.leading, vec!["Foo", " obj", " bar "]);
        assert_eq!(fields.params, "x, y");
    }
}
