//! Deferred syntax highlighting over rendered HTML.
//!
//! Runs after sanitization: locates `<pre><code class="language-…">`
//! blocks, unescapes their text, and replaces it with class-annotated
//! markup. A block whose language is unknown, or whose highlighting
//! fails, is left exactly as it was; sibling blocks are unaffected.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

const OPEN: &str = "<pre><code";
const CLOSE: &str = "</code></pre>";

pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Create a highlighter with the bundled syntax definitions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlight every code block in `html` that names a known language.
    #[must_use]
    pub fn highlight_blocks(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut rest = html;

        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let block = &rest[start..];
            match self.rewrite_block(block) {
                Some((consumed, replacement)) => {
                    out.push_str(&replacement);
                    rest = &block[consumed..];
                }
                None => {
                    out.push_str(OPEN);
                    rest = &block[OPEN.len()..];
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Rewrite one block starting at `<pre><code`. Returns the number of
    /// bytes consumed and the replacement markup, or `None` to leave the
    /// block untouched.
    fn rewrite_block(&self, block: &str) -> Option<(usize, String)> {
        let attrs_end = OPEN.len() + block[OPEN.len()..].find('>')?;
        let attrs = &block[OPEN.len()..attrs_end];
        let lang = attrs
            .split("class=\"language-")
            .nth(1)?
            .split('"')
            .next()?;

        let content_start = attrs_end + 1;
        let content_len = block[content_start..].find(CLOSE)?;
        let code = unescape(&block[content_start..content_start + content_len]);

        let highlighted = self.highlight_code(lang, &code)?;
        let consumed = content_start + content_len + CLOSE.len();
        Some((
            consumed,
            format!("{}{highlighted}{CLOSE}", &block[..content_start]),
        ))
    }

    fn highlight_code(&self, lang: &str, code: &str) -> Option<String> {
        let Some(syntax) = self.syntaxes.find_syntax_by_token(lang) else {
            debug!(lang, "no syntax definition, leaving block unhighlighted");
            return None;
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntaxes,
            ClassStyle::Spaced,
        );
        for line in LinesWithEndings::from(code) {
            if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
                debug!(lang, %err, "highlighting failed, leaving block unhighlighted");
                return None;
            }
        }
        Some(generator.finalize())
    }
}

/// Reverse the entity escaping applied when the code block was rendered.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_known_language_gets_spans() {
        let html = r#"<p>intro</p><pre><code class="language-rust" data-lang="rust">fn main() {}
</code></pre>"#;
        let out = Highlighter::new().highlight_blocks(html);

        assert!(out.contains("<span"), "got: {out}");
        assert!(out.starts_with("<p>intro</p>"));
        assert!(out.contains(r#"class="language-rust" data-lang="rust""#));
        assert!(out.ends_with("</code></pre>"));
    }

    #[test]
    fn test_unknown_language_untouched() {
        let html = r#"<pre><code class="language-klingon" data-lang="klingon">nuqneH
</code></pre>"#;
        assert_eq!(Highlighter::new().highlight_blocks(html), html);
    }

    #[test]
    fn test_plain_block_untouched() {
        let html = "<pre><code>no language here\n</code></pre>";
        assert_eq!(Highlighter::new().highlight_blocks(html), html);
    }

    #[test]
    fn test_failed_block_does_not_affect_siblings() {
        let html = concat!(
            r#"<pre><code class="language-klingon" data-lang="klingon">nuqneH</code></pre>"#,
            r#"<pre><code class="language-rust" data-lang="rust">let x = 1;</code></pre>"#,
        );
        let out = Highlighter::new().highlight_blocks(html);

        assert!(out.contains(r#"data-lang="klingon">nuqneH</code>"#));
        assert!(out.contains("<span"), "second block should highlight");
    }

    #[test]
    fn test_no_code_blocks_is_identity() {
        let html = "<p>just <strong>text</strong></p>";
        assert_eq!(Highlighter::new().highlight_blocks(html), html);
    }

    #[test]
    fn test_unescape_round_trip() {
        assert_eq!(
            unescape("let s = &quot;a &lt; b &amp;&amp; c&quot;;"),
            r#"let s = "a < b && c";"#
        );
    }
}
