//! YAML front matter splitting.
//!
//! A front matter block is a YAML document delimited by `---` lines at the
//! very start of an article file:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-01-05
//! tags: [rust, blog]
//! ---
//! Body starts here.
//! ```

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::MetaError;

/// Front matter fields recognized by the engine.
///
/// All fields are optional; unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    /// Explicit article title.
    #[serde(default)]
    pub title: Option<String>,
    /// Creation date.
    #[serde(default)]
    pub date: Option<String>,
    /// Last-update date.
    #[serde(default)]
    pub updated: Option<String>,
    /// Tag set.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Category set.
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Publish flag; unset means published.
    #[serde(default)]
    pub published: Option<bool>,
}

/// Split a document into front matter and body.
///
/// Returns `(None, text)` when the document has no front matter block.
/// The body never includes the delimiter lines.
///
/// # Errors
///
/// Returns [`MetaError::FrontMatter`] if a block is present but is not
/// valid YAML.
pub fn split_front_matter(text: &str) -> Result<(Option<FrontMatter>, &str), MetaError> {
    let Some(rest) = text.strip_prefix("---") else {
        return Ok((None, text));
    };
    // The opening delimiter must be a whole line.
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return Ok((None, text));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let matter = if yaml.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(yaml).map_err(|e| MetaError::FrontMatter(e.to_string()))?
            };
            return Ok((Some(matter), body));
        }
        offset += line.len();
    }

    // Unterminated block: treat the whole document as body.
    Ok((None, text))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_front_matter() {
        let (matter, body) = split_front_matter("# Title\n\nBody").unwrap();
        assert!(matter.is_none());
        assert_eq!(body, "# Title\n\nBody");
    }

    #[test]
    fn test_basic_front_matter() {
        let text = "---\ntitle: Hello\ndate: 2024-01-05\ntags: [b, a]\n---\n# Body\n";
        let (matter, body) = split_front_matter(text).unwrap();
        let matter = matter.unwrap();

        assert_eq!(matter.title.as_deref(), Some("Hello"));
        assert_eq!(matter.date.as_deref(), Some("2024-01-05"));
        assert_eq!(
            matter.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            ["a", "b"]
        );
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_empty_front_matter_block() {
        let (matter, body) = split_front_matter("---\n---\nBody").unwrap();
        assert_eq!(matter, Some(FrontMatter::default()));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unterminated_block_is_body() {
        let text = "---\ntitle: Hello\nno closing delimiter";
        let (matter, body) = split_front_matter(text).unwrap();
        assert!(matter.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_inline_dashes_are_not_front_matter() {
        let text = "--- not a delimiter\nBody";
        let (matter, body) = split_front_matter(text).unwrap();
        assert!(matter.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_malformed_yaml_errors() {
        let text = "---\ntitle: [unclosed\n---\nBody";
        assert!(split_front_matter(text).is_err());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let text = "---\ntitle: T\ncustom_thing: 12\n---\nBody";
        let (matter, _) = split_front_matter(text).unwrap();
        assert_eq!(matter.unwrap().title.as_deref(), Some("T"));
    }
}
