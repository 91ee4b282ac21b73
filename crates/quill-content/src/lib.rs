//! Async content loading and state management for the quill blog engine.
//!
//! Ties the rendering crates together behind a single controller: fetch
//! raw Markdown by article identifier, run it through the render pipeline
//! (footnote extraction, Markdown rendering, sanitization, deferred
//! syntax highlighting), and expose the result as cloned view snapshots
//! driven by an explicit load/clear state machine.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use quill_content::{ContentController, FsFetcher, LoadState};
//! use quill_meta::ArticleIndex;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let controller = ContentController::new(
//!     ArticleIndex::new(),
//!     Arc::new(FsFetcher::new("content")),
//! );
//! controller.load("0b84c0de").await;
//!
//! let view = controller.view();
//! if view.state == LoadState::Loaded {
//!     println!("{}: {} headings", view.title, view.toc.len());
//! }
//! # });
//! ```

mod controller;
mod fetch;
mod highlight;
mod pipeline;

pub use controller::{ContentController, ContentView, LoadState};
pub use fetch::{ContentFetcher, FetchError, FsFetcher, MockFetcher};
pub use highlight::Highlighter;
pub use pipeline::RenderedFootnote;
