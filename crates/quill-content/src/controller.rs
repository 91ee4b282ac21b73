//! Content state controller.
//!
//! Owns the loaded article's state and every view derived from it. One
//! controller serves one display surface; `load` and `clear` drive the
//! state machine and `view` hands out cloned snapshots.
//!
//! Overlapping loads follow last-write-wins: each load takes the next
//! value of a sequence counter and re-checks it before committing, so a
//! stale slower load can never overwrite a newer one. Nothing is retried
//! and no timeout is imposed; a hung fetch leaves the state `Loading`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use quill_meta::{ArticleIndex, ArticleMetadata, derive_title, split_front_matter};
use quill_renderer::{ExtensionSet, TocEntry, TocNode, article_toc};

use crate::fetch::ContentFetcher;
use crate::highlight::Highlighter;
use crate::pipeline::{RenderedFootnote, render_article};

/// Load state of the controller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No content loaded.
    #[default]
    Empty,
    /// A fetch or render is in flight.
    Loading,
    /// Content and derived views are available.
    Loaded,
    /// The last load failed; views are cleared and the message is
    /// user-facing.
    Error(String),
}

/// Cloned snapshot of the controller's visible state.
#[derive(Clone, Debug, Default)]
pub struct ContentView {
    pub state: LoadState,
    /// Resolved display title.
    pub title: String,
    /// Creation date, `YYYY-MM-DD`; empty when nothing is loaded.
    pub created: String,
    /// Last-update date; empty when absent.
    pub updated: String,
    /// Sorted tag list.
    pub tags: Vec<String>,
    /// Sorted category list.
    pub categories: Vec<String>,
    /// Sanitized, highlighted article HTML.
    pub html: String,
    /// Nested table of contents under the article's title heading.
    pub toc: Vec<TocNode>,
    /// Ordered footnote list, each rendered and sanitized.
    pub footnotes: Vec<RenderedFootnote>,
}

#[derive(Default)]
struct Inner {
    state: LoadState,
    meta: Option<ArticleMetadata>,
    title: String,
    html: String,
    toc: Vec<TocEntry>,
    footnotes: Vec<RenderedFootnote>,
}

impl Inner {
    /// Replace everything, keeping only the new state.
    fn reset(&mut self, state: LoadState) {
        *self = Self {
            state,
            ..Self::default()
        };
    }
}

/// Drives article loading and owns the resulting state.
pub struct ContentController {
    index: ArticleIndex,
    fetcher: Arc<dyn ContentFetcher>,
    extensions: ExtensionSet,
    highlighter: Highlighter,
    seq: AtomicU64,
    inner: Mutex<Inner>,
}

impl ContentController {
    /// Create a controller over an article index and a fetch backend.
    #[must_use]
    pub fn new(index: ArticleIndex, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            index,
            fetcher,
            extensions: ExtensionSet::standard(),
            highlighter: Highlighter::new(),
            seq: AtomicU64::new(0),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load an article by identifier.
    ///
    /// Never returns an error: an unknown identifier or a failed fetch
    /// transitions the state to [`LoadState::Error`] with a user-facing
    /// message.
    pub async fn load(&self, uuid: &str) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(uuid, seq, "content load started");
        self.lock().reset(LoadState::Loading);

        let Some(meta) = self.index.get(uuid).cloned() else {
            self.fail(seq, uuid, format!("article {uuid} is not in the index"));
            return;
        };

        let text = match self.fetcher.fetch(uuid).await {
            Ok(text) => text,
            Err(err) => {
                self.fail(seq, uuid, err.to_string());
                return;
            }
        };
        if !self.is_current(seq) {
            debug!(uuid, seq, "stale load discarded after fetch");
            return;
        }

        let (matter, body) = match split_front_matter(&text) {
            Ok(parts) => parts,
            Err(err) => {
                self.fail(seq, uuid, err.to_string());
                return;
            }
        };
        let body = body.trim();

        // The index title wins; a title in the file's own front matter is
        // the fallback before deriving one from the body.
        let explicit = if meta.title.trim().is_empty() {
            matter.and_then(|m| m.title)
        } else {
            Some(meta.title.clone())
        };
        let title = derive_title(body, explicit.as_deref());

        let article = render_article(body, &self.extensions, &self.highlighter);

        let mut inner = self.lock();
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(uuid, seq, "stale load discarded after render");
            return;
        }
        inner.state = LoadState::Loaded;
        inner.meta = Some(meta);
        inner.title = title;
        inner.html = article.html;
        inner.toc = article.toc;
        inner.footnotes = article.footnotes;
        info!(uuid, seq, "article loaded");
    }

    /// Discard everything and return to `Empty`. In-flight loads are
    /// invalidated.
    pub fn clear(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
        self.lock().reset(LoadState::Empty);
        debug!("content cleared");
    }

    /// Snapshot the visible state.
    #[must_use]
    pub fn view(&self) -> ContentView {
        let inner = self.lock();
        let meta = inner.meta.as_ref();
        ContentView {
            state: inner.state.clone(),
            title: inner.title.clone(),
            created: meta.map(|m| m.created.clone()).unwrap_or_default(),
            updated: meta.map(|m| m.updated.clone()).unwrap_or_default(),
            tags: meta
                .map(|m| m.tags.iter().cloned().collect())
                .unwrap_or_default(),
            categories: meta
                .map(|m| m.categories.iter().cloned().collect())
                .unwrap_or_default(),
            html: inner.html.clone(),
            toc: article_toc(&inner.toc),
            footnotes: inner.footnotes.clone(),
        }
    }

    fn is_current(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == seq
    }

    /// Commit an error state, unless a newer load has taken over.
    fn fail(&self, seq: u64, uuid: &str, message: String) {
        let mut inner = self.lock();
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(uuid, seq, "stale failed load discarded");
            return;
        }
        warn!(uuid, seq, error = %message, "content load failed");
        inner.reset(LoadState::Error(message));
    }
}
