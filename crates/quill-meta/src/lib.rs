//! Article metadata for the quill blog engine.
//!
//! Provides [`ArticleMetadata`] (the per-article record supplied by the
//! index-loading collaborator), [`ArticleIndex`] for identifier lookup,
//! YAML front matter splitting, and display-title derivation.

mod front_matter;
mod metadata;

pub use front_matter::{FrontMatter, split_front_matter};
pub use metadata::{ArticleIndex, ArticleMetadata, derive_title};

/// Error type for metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// The front matter block is not valid YAML.
    #[error("invalid front matter: {0}")]
    FrontMatter(String),
}
