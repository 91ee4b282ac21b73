//! Inline and block math extensions.
//!
//! Both render through a LaTeX-subset-to-MathML converter. A formula that
//! fails to convert degrades to an escaped literal marker instead of
//! aborting the document render.

use latex2mathml::{DisplayStyle, latex_to_mathml};

use crate::extension::{Extension, ExtensionKind, ExtensionLevel, ExtensionToken, RenderContext};
use crate::state::escape_html;

/// Render LaTeX to MathML, falling back to a visible error marker.
fn render_math(tex: &str, display: bool) -> String {
    let style = if display {
        DisplayStyle::Block
    } else {
        DisplayStyle::Inline
    };
    match latex_to_mathml(tex, style) {
        Ok(mathml) => mathml,
        Err(_) => format!(r#"<span class="math-error">{}</span>"#, escape_html(tex)),
    }
}

/// Inline math: `$...$` with a single unescaped dollar delimiter.
///
/// The opening `$` must not be followed by another `$`; the span must
/// close on the same line; `\$` does not close it.
pub struct InlineMath;

impl Extension for InlineMath {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::InlineMath
    }

    fn level(&self) -> ExtensionLevel {
        ExtensionLevel::Inline
    }

    fn probe(&self, src: &str) -> Option<usize> {
        // First `$` not immediately followed by another `$`.
        let mut iter = src.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            if c == '$' && iter.peek().map(|(_, next)| *next) != Some('$') {
                return Some(i);
            }
        }
        None
    }

    fn tokenize(&self, src: &str) -> Option<ExtensionToken> {
        let mut chars = src.char_indices();
        let (_, first) = chars.next()?;
        if first != '$' || src[1..].starts_with('$') {
            return None;
        }

        let mut escaped = false;
        for (i, c) in chars {
            if c == '\n' {
                return None;
            }
            if !escaped && c == '$' {
                let raw = &src[..i + 1];
                let text = raw[1..raw.len() - 1].trim().to_owned();
                return Some(ExtensionToken::InlineMath {
                    raw: raw.to_owned(),
                    text,
                });
            }
            escaped = !escaped && c == '\\';
        }
        None
    }

    fn render(&self, token: &ExtensionToken, _cx: &RenderContext<'_>) -> String {
        match token {
            ExtensionToken::InlineMath { text, .. } => render_math(text, false),
            other => other.raw().to_owned(),
        }
    }
}

/// Block math: a `$$` line, content, then a closing `$$` line.
pub struct BlockMath;

impl Extension for BlockMath {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::BlockMath
    }

    fn level(&self) -> ExtensionLevel {
        ExtensionLevel::Block
    }

    fn probe(&self, src: &str) -> Option<usize> {
        let mut offset = 0;
        for line in src.split_inclusive('\n') {
            if line.trim() == "$$" {
                return Some(offset);
            }
            offset += line.len();
        }
        None
    }

    fn tokenize(&self, src: &str) -> Option<ExtensionToken> {
        let mut lines = src.split_inclusive('\n');
        let opener = lines.next()?;
        // The opener must be a whole `$$` line, not `$$` at end of input.
        if opener.trim() != "$$" || !opener.ends_with('\n') {
            return None;
        }

        let content_start = opener.len();
        let mut offset = content_start;
        for line in lines {
            let body = line.trim_end_matches('\n').trim_end_matches('\r');
            if body.trim() == "$$" {
                let text = src[content_start..offset].trim().to_owned();
                if text.is_empty() {
                    return None;
                }
                let raw = src[..offset + body.len()].to_owned();
                return Some(ExtensionToken::BlockMath { raw, text });
            }
            offset += line.len();
        }
        None
    }

    fn render(&self, token: &ExtensionToken, _cx: &RenderContext<'_>) -> String {
        match token {
            ExtensionToken::BlockMath { text, .. } => {
                format!(r#"<div class="math-block">{}</div>"#, render_math(text, true))
            }
            other => other.raw().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::footnote::FootnoteLookup;

    fn cx_lookup() -> FootnoteLookup {
        FootnoteLookup::empty()
    }

    #[test]
    fn test_inline_probe_skips_double_dollar() {
        // The second `$` of a `$$` pair is a valid candidate, matching the
        // original `\$(?!\$)` probe.
        assert_eq!(InlineMath.probe("cost is $$x$$ and $y$"), Some(9));
        assert_eq!(InlineMath.probe("no math here"), None);
    }

    #[test]
    fn test_inline_tokenize_basic() {
        let token = InlineMath.tokenize("$a+b$ rest").unwrap();
        assert_eq!(
            token,
            ExtensionToken::InlineMath {
                raw: "$a+b$".into(),
                text: "a+b".into()
            }
        );
    }

    #[test]
    fn test_inline_tokenize_rejects_double_dollar() {
        assert!(InlineMath.tokenize("$$a$$").is_none());
    }

    #[test]
    fn test_inline_tokenize_rejects_newline_before_close() {
        assert!(InlineMath.tokenize("$a+b\nc$").is_none());
    }

    #[test]
    fn test_inline_tokenize_rejects_unclosed() {
        assert!(InlineMath.tokenize("$a+b").is_none());
    }

    #[test]
    fn test_escaped_dollar_does_not_close() {
        let token = InlineMath.tokenize(r"$a \$ b$").unwrap();
        assert_eq!(token.raw(), r"$a \$ b$");
    }

    #[test]
    fn test_inline_render_produces_mathml() {
        let lookup = cx_lookup();
        let cx = RenderContext {
            footnotes: &lookup,
        };
        let token = InlineMath.tokenize("$a+b$").unwrap();
        let html = InlineMath.render(&token, &cx);
        assert!(html.contains("<math"), "got: {html}");
    }

    #[test]
    fn test_math_error_degrades() {
        let out = render_math(r"\undefined{\oops", false);
        assert!(out.contains("math-error"));
    }

    #[test]
    fn test_block_tokenize_basic() {
        let src = "$$\nE = mc^2\n$$\n\nafter";
        let token = BlockMath.tokenize(src).unwrap();
        assert_eq!(
            token,
            ExtensionToken::BlockMath {
                raw: "$$\nE = mc^2\n$$".into(),
                text: "E = mc^2".into()
            }
        );
    }

    #[test]
    fn test_block_tokenize_rejects_triple_dollar_line() {
        assert!(BlockMath.tokenize("$$$ x\nmore\n$$").is_none());
    }

    #[test]
    fn test_block_tokenize_rejects_unclosed() {
        assert!(BlockMath.tokenize("$$\nE = mc^2\n").is_none());
    }

    #[test]
    fn test_block_tokenize_rejects_empty_content() {
        assert!(BlockMath.tokenize("$$\n\n$$").is_none());
    }

    #[test]
    fn test_block_render_wraps_in_container() {
        let lookup = cx_lookup();
        let cx = RenderContext {
            footnotes: &lookup,
        };
        let token = BlockMath.tokenize("$$\nx^2\n$$").unwrap();
        let html = BlockMath.render(&token, &cx);
        assert!(html.starts_with(r#"<div class="math-block">"#));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_block_probe_finds_line() {
        assert_eq!(BlockMath.probe("text\n$$\nx\n$$"), Some(5));
        assert_eq!(BlockMath.probe("no block"), None);
    }
}
