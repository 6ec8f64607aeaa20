//! In-process store

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ContentStore, Document, Removed, Result};
use crate::content::{Comment, Post, PostPatch};

/// Holds the content document in memory. Each instance is independent and
/// lives as long as its owner; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RwLock<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing content
    pub fn with_document(doc: Document) -> Self {
        Self {
            doc: RwLock::new(doc),
        }
    }

    /// Copy of the current content
    pub async fn snapshot(&self) -> Document {
        self.doc.read().await.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        Ok(self.doc.read().await.posts.clone())
    }

    async fn post(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.doc.read().await.post(id))
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.doc.write().await.posts.push(post.clone());
        Ok(())
    }

    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<Option<Post>> {
        Ok(self.doc.write().await.update_post(id, patch))
    }

    async fn remove_post_cascade(&self, id: &str) -> Result<Removed> {
        Ok(self.doc.write().await.remove_post_cascade(id))
    }

    async fn comments_for(&self, post_id: &str) -> Result<Vec<Comment>> {
        Ok(self.doc.read().await.comments_for(post_id))
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.doc.write().await.comments.push(comment.clone());
        Ok(())
    }
}
