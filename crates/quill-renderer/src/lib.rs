//! Markdown rendering pipeline for the quill blog engine.
//!
//! Takes an article body (after front matter removal) and produces HTML
//! plus a table of contents, with a small set of grammar extensions on top
//! of GitHub-flavored Markdown:
//!
//! - inline math (`$...$`) and block math (`$$` fenced) rendered to MathML
//! - footnote references (`[^label]`) resolved against a per-document
//!   lookup built by the footnote extractor
//! - a fresh anchor id per heading, collected into a flat TOC that can be
//!   regrouped into a tree
//!
//! # Pipeline
//!
//! ```text
//! raw body ──extract_footnotes──▶ (body, records)
//!   body ──scanner (extensions)──▶ text + placeholders
//!        ──pulldown-cmark──▶ HTML ──substitute──▶ final HTML + TOC
//! ```
//!
//! # Example
//!
//! ```
//! use quill_renderer::{ExtensionSet, FootnoteLookup, extract_footnotes, render_document};
//!
//! let (body, records) = extract_footnotes("# Title\n\nSee [^a].\n\n[^a]: A note.");
//! let lookup = FootnoteLookup::from_records(&records);
//! let result = render_document(&body, &lookup, &ExtensionSet::standard());
//! assert!(result.html.contains("fnref-1"));
//! ```

mod extension;
mod fence;
mod footnote;
mod math;
mod renderer;
mod scanner;
mod state;

pub use extension::{
    Extension, ExtensionKind, ExtensionLevel, ExtensionSet, ExtensionToken, RenderContext,
};
pub use footnote::{FootnoteLookup, FootnoteRecord, FootnoteReference, extract_footnotes};
pub use math::{BlockMath, InlineMath};
pub use renderer::{RenderResult, render_document, render_fragment};
pub use state::{TocEntry, TocNode, article_toc, build_tree, escape_html};
