//! The per-article render pipeline.
//!
//! One pass over one article's Markdown: footnote extraction, body
//! rendering, sanitization, deferred highlighting, and footnote fragment
//! rendering. The footnote lookup is built here and lives only for this
//! pass, so overlapping loads can never see each other's labels.

use quill_renderer::{
    ExtensionSet, FootnoteLookup, TocEntry, extract_footnotes, render_document, render_fragment,
};
use quill_sanitize::sanitize;

use crate::highlight::Highlighter;

/// One footnote, rendered and ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFootnote {
    /// User-written reference key.
    pub label: String,
    /// 1-based index matching the `fn-{index}` anchors in the body.
    pub index: usize,
    /// Sanitized HTML of the footnote content.
    pub html: String,
}

/// Everything derived from one article body.
pub(crate) struct RenderedArticle {
    /// Body with footnote definitions removed.
    pub body: String,
    /// Sanitized, highlighted HTML.
    pub html: String,
    /// Flat TOC in encounter order.
    pub toc: Vec<TocEntry>,
    /// Ordered footnote list.
    pub footnotes: Vec<RenderedFootnote>,
}

pub(crate) fn render_article(
    text: &str,
    extensions: &ExtensionSet,
    highlighter: &Highlighter,
) -> RenderedArticle {
    let (body, records) = extract_footnotes(text);
    let lookup = FootnoteLookup::from_records(&records);

    let result = render_document(&body, &lookup, extensions);
    let html = highlighter.highlight_blocks(&sanitize(&result.html));

    let footnotes = records
        .iter()
        .map(|record| RenderedFootnote {
            label: record.label.clone(),
            index: record.index,
            html: sanitize(&render_fragment(&record.content, &lookup, extensions)),
        })
        .collect();

    RenderedArticle {
        body,
        html,
        toc: result.toc,
        footnotes,
    }
}
