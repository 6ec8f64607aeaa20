//! Single JSON document store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{ContentStore, Document, Removed, Result, StoreError};
use crate::content::{Comment, Post, PostPatch};

/// Keeps all content in one JSON file (`{"posts": [...], "comments": [...]}`).
///
/// The file is read in full for every operation and rewritten in full on every
/// mutation. A missing file is an empty store; a file that does not parse is a
/// storage fault. Mutations within this process run one at a time, but two
/// processes sharing the file still race (last write wins).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document
    pub async fn read(&self) -> Result<Document> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Document::default()),
            Ok(content) => {
                let doc = serde_json::from_str(&content).map_err(|e| {
                    StoreError::serialization(format!("Malformed store file {:?}: {}", self.path, e))
                        .with_source(e)
                })?;
                Ok(doc)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(StoreError::io(format!("Failed to read {:?}: {}", self.path, e)).with_source(e)),
        }
    }

    /// Replace the file with `doc`. The content goes to a sibling temp file
    /// first and is renamed into place, so readers never see a torn write.
    async fn write(&self, doc: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error("create directory for", e))?;
            }
        }

        let content = serde_json::to_string_pretty(doc)?;
        let tmp_path = self.tmp_path();

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| self.io_error("create temp file for", e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| self.io_error("write", e))?;
        file.sync_all()
            .await
            .map_err(|e| self.io_error("sync", e))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error("replace", e))?;

        tracing::debug!(
            "Wrote {:?} ({} posts, {} comments)",
            self.path,
            doc.posts.len(),
            doc.comments.len()
        );
        Ok(())
    }

    /// Read-modify-write under the process-wide write lock
    async fn mutate<T>(&self, f: impl FnOnce(&mut Document) -> (T, bool)) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read().await?;
        let (out, changed) = f(&mut doc);
        if changed {
            self.write(&doc).await?;
        }
        Ok(out)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "db.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> StoreError {
        StoreError::io(format!("Failed to {} {:?}: {}", action, self.path, err)).with_source(err)
    }
}

#[async_trait]
impl ContentStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        Ok(self.read().await?.posts)
    }

    async fn post(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.read().await?.post(id))
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.mutate(|doc| {
            doc.posts.push(post.clone());
            ((), true)
        })
        .await
    }

    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<Option<Post>> {
        self.mutate(|doc| {
            let updated = doc.update_post(id, patch);
            let changed = updated.is_some();
            (updated, changed)
        })
        .await
    }

    async fn remove_post_cascade(&self, id: &str) -> Result<Removed> {
        self.mutate(|doc| {
            let removed = doc.remove_post_cascade(id);
            let changed = removed != Removed::default();
            (removed, changed)
        })
        .await
    }

    async fn comments_for(&self, post_id: &str) -> Result<Vec<Comment>> {
        Ok(self.read().await?.comments_for(post_id))
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.mutate(|doc| {
            doc.comments.push(comment.clone());
            ((), true)
        })
        .await
    }
}
