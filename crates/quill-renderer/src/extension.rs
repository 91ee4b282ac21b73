//! Tokenizer extension machinery.
//!
//! Extensions are a closed set of grammar rules layered on top of the base
//! Markdown parser. Each one implements a uniform probe/tokenize/render
//! triple and is registered into an ordered [`ExtensionSet`] consumed by
//! the scanner loop: at each scan position the extensions are tried in
//! declared order and the first successful match wins.

use crate::footnote::{FootnoteLookup, FootnoteReference};
use crate::math::{BlockMath, InlineMath};

/// The closed set of extension kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionKind {
    /// `$...$` spans rendered to inline MathML.
    InlineMath,
    /// `$$`-fenced blocks rendered to display MathML.
    BlockMath,
    /// `[^label]` references resolved to superscript links.
    FootnoteRef,
}

/// Grammar level an extension participates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionLevel {
    /// Matched inside line content.
    Inline,
    /// Matched at a line boundary, may span lines.
    Block,
}

/// A token produced by a successful extension match.
///
/// `raw` is always the exact source slice that was consumed, so the
/// scanner can advance and so unresolved matches can degrade to their
/// literal text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtensionToken {
    /// Inline math span; `text` is the trimmed LaTeX between delimiters.
    InlineMath { raw: String, text: String },
    /// Block math; `text` is the trimmed LaTeX between the `$$` lines.
    BlockMath { raw: String, text: String },
    /// Footnote reference; `label` is the user-written key.
    FootnoteRef { raw: String, label: String },
}

impl ExtensionToken {
    /// The exact source text consumed by this token.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::InlineMath { raw, .. }
            | Self::BlockMath { raw, .. }
            | Self::FootnoteRef { raw, .. } => raw,
        }
    }
}

/// Per-render context passed to extension renderers.
///
/// Carries the footnote label→index lookup for exactly one document's
/// render pass; it is rebuilt for every load and never shared between
/// documents.
pub struct RenderContext<'a> {
    /// Footnote lookup for the document being rendered.
    pub footnotes: &'a FootnoteLookup,
}

/// A pluggable grammar rule.
pub trait Extension: Send + Sync {
    /// Which member of the closed set this is.
    fn kind(&self) -> ExtensionKind;

    /// Grammar level this extension matches at.
    fn level(&self) -> ExtensionLevel;

    /// Cheapest index at which the pattern could possibly begin in `src`,
    /// or `None` if it cannot occur at all.
    fn probe(&self, src: &str) -> Option<usize>;

    /// Try to match a token at the very start of `src`.
    fn tokenize(&self, src: &str) -> Option<ExtensionToken>;

    /// Render a token to an HTML fragment. Must not panic; failures
    /// degrade to best-effort output.
    fn render(&self, token: &ExtensionToken, cx: &RenderContext<'_>) -> String;
}

/// Ordered extension registry.
pub struct ExtensionSet {
    extensions: Vec<Box<dyn Extension>>,
}

impl ExtensionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    /// The standard set: inline math, block math, footnote references.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(InlineMath)
            .with(BlockMath)
            .with(FootnoteReference)
    }

    /// Append an extension; declaration order is match order.
    #[must_use]
    pub fn with<E: Extension + 'static>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Extensions of the given level, in declared order.
    pub(crate) fn at_level(
        &self,
        level: ExtensionLevel,
    ) -> impl Iterator<Item = &dyn Extension> + '_ {
        self.extensions
            .iter()
            .map(Box::as_ref)
            .filter(move |ext| ext.level() == level)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::standard()
    }
}
