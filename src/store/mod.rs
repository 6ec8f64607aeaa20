//! Content store - the data-access layer for posts and comments
//!
//! [`Repository`] is the facade the rest of the crate talks to. It assigns
//! ids and dates, fills in the author identity and placeholder image, and
//! applies the listing order. The physical storage sits behind the
//! [`ContentStore`] trait, implemented by a JSON document file, an in-process
//! document, and (with the `sqlite` feature) a SQLite document database.

mod error;
mod json_file;
mod memory;
mod repository;
#[cfg(feature = "sqlite")]
mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::{Comment, Post, PostPatch};

pub use error::{ErrorKind, Result, StoreError};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use repository::{Author, ImagePlaceholder, Repository};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// What a cascade delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    pub posts: usize,
    pub comments: usize,
}

/// Physical storage for posts and comments.
///
/// Implementations return records in whatever order they hold them; the
/// [`Repository`] sorts. Every method may block on I/O.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    async fn posts(&self) -> Result<Vec<Post>>;

    async fn post(&self, id: &str) -> Result<Option<Post>>;

    /// Durably write a fully populated post
    async fn insert_post(&self, post: &Post) -> Result<()>;

    /// Merge `patch` onto the stored post. `Ok(None)` when `id` is unknown;
    /// must not create a record in that case.
    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<Option<Post>>;

    /// Remove the post and every comment whose `post_id` is `id`.
    /// Removing an unknown post is not an error.
    async fn remove_post_cascade(&self, id: &str) -> Result<Removed>;

    async fn comments_for(&self, post_id: &str) -> Result<Vec<Comment>>;

    async fn insert_comment(&self, comment: &Comment) -> Result<()>;
}

/// The whole content set as one document: `{ "posts": [...], "comments": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Document {
    pub fn post(&self, id: &str) -> Option<Post> {
        self.posts.iter().find(|p| p.id == id).cloned()
    }

    pub fn update_post(&mut self, id: &str, patch: &PostPatch) -> Option<Post> {
        let post = self.posts.iter_mut().find(|p| p.id == id)?;
        patch.apply(post);
        Some(post.clone())
    }

    pub fn remove_post_cascade(&mut self, id: &str) -> Removed {
        let posts_before = self.posts.len();
        let comments_before = self.comments.len();
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post_id != id);
        Removed {
            posts: posts_before - self.posts.len(),
            comments: comments_before - self.comments.len(),
        }
    }

    pub fn comments_for(&self, post_id: &str) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect()
    }
}
