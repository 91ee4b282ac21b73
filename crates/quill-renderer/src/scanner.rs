//! The extension tokenizer loop.
//!
//! Runs before the base Markdown parse. Extension matches are replaced by
//! per-render placeholder tokens; the rendered fragments are substituted
//! back into the HTML after the parse, so extension output never passes
//! through the Markdown grammar.
//!
//! The scan is fence aware and, within a line, honors backslash escapes
//! and inline code spans, so extension syntax inside code is left alone.

use uuid::Uuid;

use crate::extension::{ExtensionLevel, ExtensionSet, RenderContext};
use crate::fence::FenceTracker;

/// One placeholder substitution produced by the scan.
pub(crate) struct Substitution {
    /// Placeholder token embedded in the scanned text.
    pub placeholder: String,
    /// Exact source consumed; used to restore TOC text.
    pub raw: String,
    /// Rendered HTML fragment.
    pub html: String,
    /// Whether the match was block level (placeholder stands alone).
    pub block: bool,
}

/// Scan output: text with placeholders plus the substitution table.
pub(crate) struct ScannedText {
    pub text: String,
    pub substitutions: Vec<Substitution>,
}

pub(crate) fn scan(src: &str, extensions: &ExtensionSet, cx: &RenderContext<'_>) -> ScannedText {
    Scanner::new(extensions, cx).run(src)
}

struct Scanner<'a> {
    extensions: &'a ExtensionSet,
    cx: &'a RenderContext<'a>,
    nonce: String,
    substitutions: Vec<Substitution>,
    out: String,
}

impl<'a> Scanner<'a> {
    fn new(extensions: &'a ExtensionSet, cx: &'a RenderContext<'a>) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self {
            extensions,
            cx,
            nonce: hex[..8].to_owned(),
            substitutions: Vec::new(),
            out: String::new(),
        }
    }

    fn placeholder(&self, ordinal: usize) -> String {
        format!("{{{{qx-{}-{ordinal}}}}}", self.nonce)
    }

    fn run(mut self, src: &str) -> ScannedText {
        self.out.reserve(src.len());
        let mut fence = FenceTracker::new();
        let mut rest = src;

        while !rest.is_empty() {
            let line_end = rest.find('\n').map_or(rest.len(), |i| i + 1);
            let line = &rest[..line_end];
            let line_body = line.trim_end_matches('\n').trim_end_matches('\r');

            if fence.observe(line_body) || fence.in_fence() {
                self.out.push_str(line);
                rest = &rest[line_end..];
                continue;
            }

            if let Some(consumed) = self.try_block(rest) {
                rest = &rest[consumed..];
                continue;
            }

            self.scan_inline(line);
            rest = &rest[line_end..];
        }

        ScannedText {
            text: self.out,
            substitutions: self.substitutions,
        }
    }

    /// Try block-level extensions at the start of `rest` (a line
    /// boundary). Returns the number of bytes consumed.
    fn try_block(&mut self, rest: &str) -> Option<usize> {
        for ext in self.extensions.at_level(ExtensionLevel::Block) {
            if ext.probe(rest) != Some(0) {
                continue;
            }
            if let Some(token) = ext.tokenize(rest) {
                let consumed = token.raw().len();
                let html = ext.render(&token, self.cx);
                let placeholder = self.placeholder(self.substitutions.len());
                self.out.push_str(&placeholder);
                self.substitutions.push(Substitution {
                    placeholder,
                    raw: token.raw().to_owned(),
                    html,
                    block: true,
                });
                return Some(consumed);
            }
        }
        None
    }

    /// Scan one line (trailing newline included) for inline extensions.
    fn scan_inline(&mut self, line: &str) {
        let mut i = 0;
        while i < line.len() {
            let rest = &line[i..];
            let c = match rest.chars().next() {
                Some(c) => c,
                None => break,
            };

            match c {
                // A backslash escape shields the next character.
                '\\' => {
                    let step = c.len_utf8()
                        + rest[c.len_utf8()..]
                            .chars()
                            .next()
                            .map_or(0, char::len_utf8);
                    self.out.push_str(&rest[..step]);
                    i += step;
                }
                '`' => {
                    let consumed = self.copy_code_span(rest);
                    i += consumed;
                }
                _ => {
                    if let Some(consumed) = self.try_inline(rest) {
                        i += consumed;
                    } else {
                        self.out.push(c);
                        i += c.len_utf8();
                    }
                }
            }
        }
    }

    /// Try inline extensions at the start of `rest`, in declared order.
    fn try_inline(&mut self, rest: &str) -> Option<usize> {
        for ext in self.extensions.at_level(ExtensionLevel::Inline) {
            if ext.probe(rest) != Some(0) {
                continue;
            }
            if let Some(token) = ext.tokenize(rest) {
                let consumed = token.raw().len();
                let html = ext.render(&token, self.cx);
                let placeholder = self.placeholder(self.substitutions.len());
                self.out.push_str(&placeholder);
                self.substitutions.push(Substitution {
                    placeholder,
                    raw: token.raw().to_owned(),
                    html,
                    block: false,
                });
                return Some(consumed);
            }
        }
        None
    }

    /// Copy an inline code span verbatim. The closing run must have the
    /// same length as the opening run; an unmatched opener is copied as
    /// literal backticks.
    fn copy_code_span(&mut self, rest: &str) -> usize {
        let open_len = rest.chars().take_while(|c| *c == '`').count();
        let after_open = &rest[open_len..];

        let mut pos = 0;
        while let Some(found) = after_open[pos..].find('`') {
            let run_start = pos + found;
            let run_len = after_open[run_start..]
                .chars()
                .take_while(|c| *c == '`')
                .count();
            if run_len == open_len {
                let total = open_len + run_start + run_len;
                self.out.push_str(&rest[..total]);
                return total;
            }
            pos = run_start + run_len;
        }

        // No closing run: the backticks are literal.
        self.out.push_str(&rest[..open_len]);
        open_len
    }
}
