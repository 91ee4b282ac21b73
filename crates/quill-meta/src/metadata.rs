//! Article metadata records and title derivation.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Metadata record for one article.
///
/// Supplied per article by the external index-loading collaborator and
/// replaced wholesale on navigation. Tags and categories are sets; the
/// `BTreeSet` representation serializes them as sorted sequences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Stable article identifier (also the content file name).
    pub uuid: String,
    /// Explicit article title. May be empty, in which case the title is
    /// derived from the content (see [`derive_title`]).
    #[serde(default)]
    pub title: String,
    /// Creation date, `YYYY-MM-DD`.
    #[serde(default)]
    pub created: String,
    /// Last-update date, `YYYY-MM-DD`.
    #[serde(default)]
    pub updated: String,
    /// Tag set, order irrelevant.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Category set, order irrelevant.
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

/// Lookup table from article identifier to metadata.
#[derive(Clone, Debug, Default)]
pub struct ArticleIndex {
    entries: HashMap<String, ArticleMetadata>,
}

impl ArticleIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from metadata records, keyed by uuid.
    pub fn from_entries(entries: impl IntoIterator<Item = ArticleMetadata>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|meta| (meta.uuid.clone(), meta))
                .collect(),
        }
    }

    /// Look up metadata by article identifier.
    #[must_use]
    pub fn get(&self, uuid: &str) -> Option<&ArticleMetadata> {
        self.entries.get(uuid)
    }

    /// Number of indexed articles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the display title for an article.
///
/// An explicit non-blank title wins. Otherwise the first non-blank line of
/// the content is used, with leading `#` heading markers stripped, which
/// covers both "first heading" and "first non-blank line".
#[must_use]
pub fn derive_title(content: &str, explicit: Option<&str>) -> String {
    if let Some(title) = explicit {
        let trimmed = title.trim();
        if !trimmed.is_empty() {
            return trimmed.to_owned();
        }
    }

    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches('#').trim().to_owned())
        .unwrap_or_default()
}
