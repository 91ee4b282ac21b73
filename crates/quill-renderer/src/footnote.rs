//! Footnote extraction and reference resolution.
//!
//! A pre-pass strips footnote definitions out of the raw Markdown and
//! builds an ordered footnote table; the [`FootnoteReference`] extension
//! then resolves `[^label]` occurrences in the body against that table.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::extension::{Extension, ExtensionKind, ExtensionLevel, ExtensionToken, RenderContext};
use crate::fence::FenceTracker;

/// `[^label]: first content fragment` — up to three leading spaces.
static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}\[\^([^\]]+)\]:\s?(.*)$").unwrap());

/// One extracted footnote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FootnoteRecord {
    /// User-written reference key.
    pub label: String,
    /// 1-based index, assigned in order of first definition encountered.
    pub index: usize,
    /// Joined and trimmed content fragments (raw Markdown).
    pub content: String,
}

/// Label → index lookup for one document's render pass.
///
/// Built once from the extracted records and immutable afterwards; each
/// load rebuilds its own lookup, so concurrent loads never share one.
#[derive(Clone, Debug, Default)]
pub struct FootnoteLookup {
    indexes: HashMap<String, usize>,
}

impl FootnoteLookup {
    /// An empty lookup: every reference is unresolved.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the lookup from extracted records.
    #[must_use]
    pub fn from_records(records: &[FootnoteRecord]) -> Self {
        Self {
            indexes: records
                .iter()
                .map(|r| (r.label.clone(), r.index))
                .collect(),
        }
    }

    /// Resolve a label to its 1-based index.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.indexes.get(label).copied()
    }
}

struct PendingFootnote {
    label: String,
    index: usize,
    fragments: Vec<String>,
}

/// Strip footnote definitions from raw Markdown.
///
/// Returns the body (definitions removed, everything else verbatim) and
/// the ordered footnote list. Scanning is line based:
///
/// - lines inside a code fence are never footnote syntax;
/// - a definition line starts (or re-opens) a label and contributes its
///   first fragment;
/// - lines indented by one to four spaces continue the active label;
/// - any other line clears the active label and belongs to the body.
///
/// Only footnotes whose joined, trimmed content is non-empty survive; the
/// result is ordered by assigned index.
#[must_use]
pub fn extract_footnotes(text: &str) -> (String, Vec<FootnoteRecord>) {
    let normalized = text.replace("\r\n", "\n");

    let mut body: Vec<&str> = Vec::new();
    let mut pending: Vec<PendingFootnote> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut active: Option<usize> = None;
    let mut fence = FenceTracker::new();

    for line in normalized.split('\n') {
        if fence.observe(line) {
            active = None;
            body.push(line);
            continue;
        }
        if fence.in_fence() {
            body.push(line);
            continue;
        }

        if let Some(caps) = DEFINITION.captures(line) {
            let label = &caps[1];
            let position = *positions.entry(label.to_owned()).or_insert_with(|| {
                pending.push(PendingFootnote {
                    label: label.to_owned(),
                    index: pending.len() + 1,
                    fragments: Vec::new(),
                });
                pending.len() - 1
            });

            let rest = caps[2].trim_end();
            if !rest.is_empty() {
                pending[position].fragments.push(rest.to_owned());
            }
            active = Some(position);
            continue;
        }

        if let Some(position) = active {
            if let Some(fragment) = strip_continuation_indent(line) {
                pending[position].fragments.push(fragment.trim_end().to_owned());
                continue;
            }
        }

        active = None;
        body.push(line);
    }

    let records = pending
        .into_iter()
        .filter_map(|p| {
            let content = p.fragments.join("\n").trim().to_owned();
            (!content.is_empty()).then_some(FootnoteRecord {
                label: p.label,
                index: p.index,
                content,
            })
        })
        .collect();

    (body.join("\n"), records)
}

/// Strip one to four leading whitespace characters; `None` when the line
/// is not indented at all.
fn strip_continuation_indent(line: &str) -> Option<&str> {
    let mut stripped = 0;
    let mut offset = 0;
    for c in line.chars() {
        if stripped == 4 || !c.is_whitespace() {
            break;
        }
        stripped += 1;
        offset += c.len_utf8();
    }
    (stripped > 0).then(|| &line[offset..])
}

/// Inline `[^label]` references.
pub struct FootnoteReference;

impl FootnoteReference {
    fn parse(src: &str) -> Option<(usize, &str)> {
        let inner = src.strip_prefix("[^")?;
        let end = inner.find(']')?;
        let label = &inner[..end];
        if label.is_empty() {
            return None;
        }
        // raw length: "[^" + label + "]"
        Some((2 + end + 1, label))
    }
}

impl Extension for FootnoteReference {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::FootnoteRef
    }

    fn level(&self) -> ExtensionLevel {
        ExtensionLevel::Inline
    }

    fn probe(&self, src: &str) -> Option<usize> {
        let mut start = 0;
        while let Some(found) = src[start..].find("[^") {
            let abs = start + found;
            if Self::parse(&src[abs..]).is_some() {
                return Some(abs);
            }
            start = abs + 2;
        }
        None
    }

    fn tokenize(&self, src: &str) -> Option<ExtensionToken> {
        let (raw_len, label) = Self::parse(src)?;
        Some(ExtensionToken::FootnoteRef {
            raw: src[..raw_len].to_owned(),
            label: label.to_owned(),
        })
    }

    fn render(&self, token: &ExtensionToken, cx: &RenderContext<'_>) -> String {
        match token {
            ExtensionToken::FootnoteRef { raw, label } => match cx.footnotes.index_of(label) {
                Some(index) => format!(
                    r##"<sup class="footnote-ref"><a id="fnref-{index}" href="#fn-{index}">{index}</a></sup>"##
                ),
                // Unresolved references degrade to their literal text.
                None => raw.clone(),
            },
            other => other.raw().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_footnotes_passes_through() {
        let input = "# Title\n\nPlain paragraph.\n\n- list\n";
        let (body, records) = extract_footnotes(input);
        assert_eq!(body, input);
        assert!(records.is_empty());
    }

    #[test]
    fn test_basic_definition() {
        let input = "# Title\n\nSee [^note].\n\n[^note]: Explanation text.";
        let (body, records) = extract_footnotes(input);

        assert_eq!(body.trim_end(), "# Title\n\nSee [^note].");
        assert_eq!(
            records,
            [FootnoteRecord {
                label: "note".into(),
                index: 1,
                content: "Explanation text.".into()
            }]
        );
    }

    #[test]
    fn test_index_follows_definition_order_not_reference_order() {
        let input = "See [^b] then [^a].\n\n[^a]: First defined.\n[^b]: Second defined.";
        let (_, records) = extract_footnotes(input);

        assert_eq!(records.len(), 2);
        assert_eq!((records[0].label.as_str(), records[0].index), ("a", 1));
        assert_eq!((records[1].label.as_str(), records[1].index), ("b", 2));
    }

    #[test]
    fn test_continuation_lines() {
        let input = "[^long]: first line\n    second line\n  third line\nbody resumes";
        let (body, records) = extract_footnotes(input);

        assert_eq!(records[0].content, "first line\nsecond line\nthird line");
        assert_eq!(body, "body resumes");
    }

    #[test]
    fn test_unindented_line_ends_continuation() {
        let input = "[^n]: content\nnot a continuation";
        let (body, records) = extract_footnotes(input);

        assert_eq!(records[0].content, "content");
        assert_eq!(body, "not a continuation");
    }

    #[test]
    fn test_definitions_inside_fence_are_verbatim() {
        let input = "```\n[^not]: inside a fence\n```\nafter";
        let (body, records) = extract_footnotes(input);

        assert!(records.is_empty());
        assert_eq!(body, input);
    }

    #[test]
    fn test_empty_footnotes_dropped() {
        let input = "[^empty]:\n\n[^full]: has content";
        let (_, records) = extract_footnotes(input);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "full");
        // Index 2 is kept even though index 1 was dropped.
        assert_eq!(records[0].index, 2);
    }

    #[test]
    fn test_crlf_normalized() {
        let input = "line one\r\n[^n]: content\r\nline two";
        let (body, records) = extract_footnotes(input);

        assert_eq!(body, "line one\nline two");
        assert_eq!(records[0].content, "content");
    }

    #[test]
    fn test_duplicate_label_continues_record() {
        let input = "[^x]: part one\n\n[^x]: part two";
        let (_, records) = extract_footnotes(input);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "part one\npart two");
    }

    #[test]
    fn test_reference_parse() {
        assert_eq!(FootnoteReference::parse("[^abc] rest"), Some((6, "abc")));
        assert_eq!(FootnoteReference::parse("[^] empty"), None);
        assert_eq!(FootnoteReference::parse("[not a ref]"), None);
        assert_eq!(FootnoteReference::parse("[^unclosed"), None);
    }

    #[test]
    fn test_reference_render_resolved() {
        let records = [FootnoteRecord {
            label: "n".into(),
            index: 1,
            content: "c".into(),
        }];
        let lookup = FootnoteLookup::from_records(&records);
        let cx = RenderContext {
            footnotes: &lookup,
        };
        let token = FootnoteReference.tokenize("[^n]").unwrap();
        let html = FootnoteReference.render(&token, &cx);

        assert_eq!(
            html,
            r##"<sup class="footnote-ref"><a id="fnref-1" href="#fn-1">1</a></sup>"##
        );
    }

    #[test]
    fn test_reference_render_unresolved_is_literal() {
        let lookup = FootnoteLookup::empty();
        let cx = RenderContext {
            footnotes: &lookup,
        };
        let token = FootnoteReference.tokenize("[^ghost]").unwrap();
        assert_eq!(FootnoteReference.render(&token, &cx), "[^ghost]");
    }

    #[test]
    fn test_probe_skips_invalid_candidates() {
        assert_eq!(FootnoteReference.probe("text [^ok] more"), Some(5));
        assert_eq!(FootnoteReference.probe("no refs"), None);
        assert_eq!(FootnoteReference.probe("[^] then [^ok]"), Some(9));
    }
}
