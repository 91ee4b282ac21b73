//! Allow-list HTML sanitization.
//!
//! Filters rendered article HTML against an explicit allow-list before it
//! reaches the display surface. The allow-list extends ammonia's standard
//! HTML profile with the MathML and SVG elements produced by the math
//! renderer, so formulas survive the pass.
//!
//! [`sanitize`] is a pure function and idempotent: sanitizing already
//! sanitized output yields the same output.

use std::sync::LazyLock;

use ammonia::Builder;

/// Elements produced by math rendering that must survive sanitization.
const MATH_TAGS: &[&str] = &["math", "mrow", "mi", "mo", "mn", "msup"];

/// Vector-graphics elements used by math and icon output.
const SVG_TAGS: &[&str] = &["svg", "path", "g"];

/// Attributes needed for math, graphics, and code block rendering.
///
/// The HTML parser lowercases attribute names, so camel-case SVG
/// attributes are listed in both spellings.
const GENERIC_ATTRS: &[&str] = &[
    "class",
    "style",
    "data-lang",
    "width",
    "height",
    "viewBox",
    "viewbox",
    "preserveAspectRatio",
    "preserveaspectratio",
    "focusable",
    "xmlns",
    "d",
    "fill",
    "id",
    "stroke",
    "stroke-width",
];

static CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    builder
        .add_tags(MATH_TAGS.iter().copied())
        .add_tags(SVG_TAGS.iter().copied())
        .add_generic_attributes(GENERIC_ATTRS.iter().copied())
        .add_generic_attribute_prefixes(["aria-", "data-"]);
    builder
});

/// Sanitize rendered HTML against the engine's allow-list.
///
/// Removes every element and attribute outside the allow-list while
/// preserving math and SVG output. Idempotent.
#[must_use]
pub fn sanitize(html: &str) -> String {
    CLEANER.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_markup_passes() {
        let html = "<p>Hello <strong>world</strong></p>";
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_script_removed() {
        let out = sanitize("<p>ok</p><script>alert(1)</script>");
        assert!(!out.contains("script"));
        assert!(out.contains("<p>ok</p>"));
    }

    #[test]
    fn test_event_handler_attribute_removed() {
        let out = sanitize(r#"<p onclick="steal()">text</p>"#);
        assert!(!out.contains("onclick"));
        assert!(out.contains("text"));
    }

    #[test]
    fn test_math_elements_survive() {
        let html = r#"<math><mrow><mi>a</mi><mo>+</mo><mn>1</mn></mrow></math>"#;
        let out = sanitize(html);
        assert!(out.contains("<mi>a</mi>"));
        assert!(out.contains("<mo>+</mo>"));
        assert!(out.contains("<mn>1</mn>"));
    }

    #[test]
    fn test_svg_elements_survive() {
        let html = r#"<svg width="16" height="16"><g fill="none"><path d="M0 0"></path></g></svg>"#;
        let out = sanitize(html);
        assert!(out.contains("<svg"));
        assert!(out.contains(r#"d="M0 0""#));
        assert!(out.contains(r#"fill="none""#));
    }

    #[test]
    fn test_aria_and_data_attributes_survive() {
        let out = sanitize(r#"<span aria-hidden="true" data-lang="rust">x</span>"#);
        assert!(out.contains(r#"aria-hidden="true""#));
        assert!(out.contains(r#"data-lang="rust""#));
    }

    #[test]
    fn test_heading_ids_survive() {
        let out = sanitize(r#"<h2 id="h-1a2b3c4d5e">Section</h2>"#);
        assert!(out.contains(r#"id="h-1a2b3c4d5e""#));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<p>plain</p>",
            r#"<p onclick="x">mixed</p><script>bad</script>"#,
            r#"<math><msup><mi>x</mi><mn>2</mn></msup></math>"#,
            "<unknown-tag>text</unknown-tag>",
            r#"<a href="javascript:alert(1)">link</a>"#,
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }
}
