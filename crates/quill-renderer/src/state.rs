//! Heading collection and table-of-contents structures.

use uuid::Uuid;

/// Flat table-of-contents entry, recorded in encounter order during the
/// render pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Anchor id, freshly generated each render.
    pub id: String,
    /// Heading depth (1-6).
    pub level: u8,
    /// Plain-text heading label.
    pub text: String,
}

/// A node in the nested table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocNode {
    /// Anchor id of the heading.
    pub id: String,
    /// Heading depth (1-6).
    pub level: u8,
    /// Plain-text heading label.
    pub text: String,
    /// Nested sub-headings, in document order.
    pub children: Vec<TocNode>,
}

impl From<&TocEntry> for TocNode {
    fn from(entry: &TocEntry) -> Self {
        Self {
            id: entry.id.clone(),
            level: entry.level,
            text: entry.text.clone(),
            children: Vec::new(),
        }
    }
}

/// Generate a fresh short anchor id.
///
/// Ten hex characters of a v4 UUID; collisions within one document are
/// negligible.
fn new_anchor() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("h-{}", &hex[..10])
}

/// Tracks the heading currently being rendered and accumulates the flat
/// TOC.
#[derive(Default)]
pub(crate) struct HeadingCollector {
    current: Option<u8>,
    text: String,
    html: String,
    entries: Vec<TocEntry>,
}

impl HeadingCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether a heading is currently open.
    pub(crate) fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Begin a heading of the given depth.
    pub(crate) fn start(&mut self, level: u8) {
        self.current = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Append to the plain-text label buffer.
    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append to the inline-HTML buffer.
    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn html_buffer(&mut self) -> &mut String {
        &mut self.html
    }

    /// Close the open heading: records a flat TOC entry with a fresh
    /// anchor and returns `(level, id, inline_html)` for emission.
    pub(crate) fn finish(&mut self) -> Option<(u8, String, String)> {
        let level = self.current.take()?;
        let id = new_anchor();
        self.entries.push(TocEntry {
            id: id.clone(),
            level,
            text: self.text.trim().to_owned(),
        });
        Some((level, id, std::mem::take(&mut self.html)))
    }

    pub(crate) fn take_entries(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.entries)
    }
}

/// Regroup a flat, depth-tagged heading list into a tree.
///
/// Stack-based: a node at level L nests under the nearest preceding node
/// with a smaller level. Nodes are never reordered, only regrouped.
#[must_use]
pub fn build_tree(entries: &[TocEntry]) -> Vec<TocNode> {
    let root = TocNode {
        id: String::new(),
        level: 0,
        text: String::new(),
        children: Vec::new(),
    };

    let mut stack = vec![root];
    for entry in entries {
        let node = TocNode::from(entry);
        while stack.len() > 1 && stack.last().is_some_and(|top| top.level >= node.level) {
            fold_top(&mut stack);
        }
        stack.push(node);
    }
    while stack.len() > 1 {
        fold_top(&mut stack);
    }

    stack.pop().map(|root| root.children).unwrap_or_default()
}

/// Pop the top node and attach it to the new stack top.
fn fold_top(stack: &mut Vec<TocNode>) {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        }
    }
}

/// Table of contents for an article: the sub-headings under the leading
/// level-1 heading (the article's own title).
///
/// Returns an empty list when the document does not start with a level-1
/// heading.
#[must_use]
pub fn article_toc(entries: &[TocEntry]) -> Vec<TocNode> {
    let tree = build_tree(entries);
    match tree.into_iter().next() {
        Some(first) if first.level == 1 => first.children,
        _ => Vec::new(),
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
