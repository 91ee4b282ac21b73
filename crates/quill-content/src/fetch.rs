//! Content fetch abstraction.
//!
//! Provides the [`ContentFetcher`] trait for retrieving raw article
//! Markdown by identifier, along with [`FetchError`] for unified error
//! handling across backends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Error returned by a fetch backend.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP-like status failure (404 for missing content).
    #[error("content request failed with status {0}")]
    Status(u16),
    /// Underlying I/O failure.
    #[error("content read failed: {0}")]
    Io(#[from] std::io::Error),
    /// Backend-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Retrieves raw article Markdown (UTF-8) by article identifier.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, uuid: &str) -> Result<String, FetchError>;
}

/// Filesystem fetch backend.
///
/// Articles live at `{root}/posts/{uuid}.md`. A missing file surfaces as
/// [`FetchError::Status`] 404, matching the HTTP-backed layout the same
/// content tree is served from.
#[derive(Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn article_path(&self, uuid: &str) -> PathBuf {
        self.root.join("posts").join(format!("{uuid}.md"))
    }
}

#[async_trait]
impl ContentFetcher for FsFetcher {
    async fn fetch(&self, uuid: &str) -> Result<String, FetchError> {
        match tokio::fs::read_to_string(self.article_path(uuid)).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::Status(404))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory fetch backend for testing.
///
/// Configured entirely through builder methods before use; a per-article
/// delay lets ordering tests hold one fetch in flight while another
/// completes.
///
/// # Example
///
/// ```
/// use quill_content::{ContentFetcher, MockFetcher};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let fetcher = MockFetcher::new()
///     .with_article("abc", "# Hello\n\nBody.")
///     .with_failure("bad", 503);
///
/// assert!(fetcher.fetch("abc").await.is_ok());
/// assert!(fetcher.fetch("bad").await.is_err());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    articles: HashMap<String, String>,
    failures: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an article with the given identifier and raw Markdown.
    #[must_use]
    pub fn with_article(mut self, uuid: impl Into<String>, text: impl Into<String>) -> Self {
        self.articles.insert(uuid.into(), text.into());
        self
    }

    /// Make fetches of the given identifier fail with a status code.
    #[must_use]
    pub fn with_failure(mut self, uuid: impl Into<String>, status: u16) -> Self {
        self.failures.insert(uuid.into(), status);
        self
    }

    /// Delay fetches of the given identifier.
    #[must_use]
    pub fn with_delay(mut self, uuid: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(uuid.into(), delay);
        self
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, uuid: &str) -> Result<String, FetchError> {
        if let Some(delay) = self.delays.get(uuid) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(status) = self.failures.get(uuid) {
            return Err(FetchError::Status(*status));
        }
        self.articles
            .get(uuid)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_mock_returns_configured_article() {
        let fetcher = MockFetcher::new().with_article("abc", "# Hello");
        assert_eq!(fetcher.fetch("abc").await.unwrap(), "# Hello");
    }

    #[tokio::test]
    async fn test_mock_missing_article_is_404() {
        let fetcher = MockFetcher::new();
        assert!(matches!(
            fetcher.fetch("ghost").await,
            Err(FetchError::Status(404))
        ));
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let fetcher = MockFetcher::new()
            .with_article("abc", "text")
            .with_failure("abc", 503);
        assert!(matches!(
            fetcher.fetch("abc").await,
            Err(FetchError::Status(503))
        ));
    }

    #[tokio::test]
    async fn test_fs_fetcher_reads_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        std::fs::create_dir(&posts).unwrap();
        std::fs::write(posts.join("abc.md"), "# From disk").unwrap();

        let fetcher = FsFetcher::new(dir.path());
        assert_eq!(fetcher.fetch("abc").await.unwrap(), "# From disk");
    }

    #[tokio::test]
    async fn test_fs_fetcher_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FsFetcher::new(dir.path());
        assert!(matches!(
            fetcher.fetch("ghost").await,
            Err(FetchError::Status(404))
        ));
    }
}
