//! Repository facade over a [`ContentStore`]

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{ContentStore, Removed, Result};
use crate::content::{Comment, NewComment, NewPost, Post, PostPatch};
use crate::helpers::now_millis;

/// The fixed author identity stamped on every post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub image: String,
}

/// Source of placeholder cover images. `:seed` in the template is replaced
/// by a fresh random token for each post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlaceholder {
    template: String,
}

impl ImagePlaceholder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn url(&self) -> String {
        let seed = Uuid::new_v4().simple().to_string();
        self.template.replace(":seed", &seed[..12])
    }
}

/// Create/read/update/delete for posts and comments, independent of the
/// backing store.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn ContentStore>,
    author: Author,
    placeholder: ImagePlaceholder,
}

impl Repository {
    pub fn new(store: Arc<dyn ContentStore>, author: Author, placeholder: ImagePlaceholder) -> Self {
        Self {
            store,
            author,
            placeholder,
        }
    }

    /// Name of the backing store
    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// All posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.store.posts().await?;
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(posts)
    }

    /// Posts whose title, content or tags contain `query`, ignoring case.
    /// A blank query lists everything.
    pub async fn search_posts(&self, query: &str) -> Result<Vec<Post>> {
        let posts = self.list_posts().await?;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(posts);
        }
        Ok(posts.into_iter().filter(|p| p.matches(&query)).collect())
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        self.store.post(id).await
    }

    pub async fn create_post(&self, new: NewPost) -> Result<Post> {
        let image_url = match new.image_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => self.placeholder.url(),
        };

        let post = Post {
            id: new_id("post"),
            title: new.title,
            subtitle: new.subtitle,
            content: new.content,
            author: self.author.name.clone(),
            author_image: self.author.image.clone(),
            date: now_millis(),
            tags: new.tags,
            image_url,
            image_hint: new.image_hint,
        };

        self.store.insert_post(&post).await?;
        tracing::debug!("Created post {} in {} store", post.id, self.backend());
        Ok(post)
    }

    /// Merge `patch` onto an existing post; `Ok(None)` if there is no such post
    pub async fn update_post(&self, id: &str, patch: PostPatch) -> Result<Option<Post>> {
        if patch.is_empty() {
            return self.store.post(id).await;
        }
        let updated = self.store.update_post(id, &patch).await?;
        if updated.is_none() {
            tracing::debug!("Update skipped, post {} not found", id);
        }
        Ok(updated)
    }

    /// Delete a post together with its comments. Safe to repeat.
    pub async fn delete_post_cascade(&self, id: &str) -> Result<Removed> {
        let removed = self.store.remove_post_cascade(id).await?;
        tracing::debug!(
            "Cascade delete of {} removed {} post(s) and {} comment(s)",
            id,
            removed.posts,
            removed.comments
        );
        Ok(removed)
    }

    /// Comments on a post, newest first
    pub async fn list_comments_by_post(&self, post_id: &str) -> Result<Vec<Comment>> {
        let mut comments = self.store.comments_for(post_id).await?;
        comments.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(comments)
    }

    pub async fn create_comment(&self, new: NewComment) -> Result<Comment> {
        let comment = Comment {
            id: new_id("comment"),
            post_id: new.post_id,
            author: new.author,
            content: new.content,
            date: now_millis(),
        };

        self.store.insert_comment(&comment).await?;
        tracing::debug!("Created comment {} on post {}", comment.id, comment.post_id);
        Ok(comment)
    }
}

fn new_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
