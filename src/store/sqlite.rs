//! SQLite document store
//!
//! Each record is kept as a JSON document next to the columns used for
//! filtering and ordering. Cascade delete runs in a single transaction.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::{ContentStore, Removed, Result, StoreError};
use crate::content::{Comment, Post, PostPatch};
use crate::helpers::date_iso;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id   TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    body TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS comments (
    id      TEXT PRIMARY KEY,
    post_id TEXT NOT NULL,
    date    TEXT NOT NULL,
    body    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);
"#;

/// Document database backend on a single SQLite connection
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::debug!("Opened SQLite store at {:?}", path.as_ref());
        Self::with_connection(conn)
    }

    /// Private database that disappears with the store
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` on the connection without blocking the async runtime
    async fn call<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::database("SQLite connection mutex poisoned"))?;
            f(&mut guard)
        })
        .await?
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: String) -> Result<T> {
    Ok(serde_json::from_str(&body)?)
}

fn load_post(conn: &Connection, id: &str) -> Result<Option<Post>> {
    let body: Option<String> = conn
        .query_row("SELECT body FROM posts WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    body.map(decode).transpose()
}

#[async_trait]
impl ContentStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        self.call(|conn| {
            let mut stmt = conn.prepare("SELECT body FROM posts")?;
            let bodies = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            bodies.into_iter().map(decode).collect()
        })
        .await
    }

    async fn post(&self, id: &str) -> Result<Option<Post>> {
        let id = id.to_string();
        self.call(move |conn| load_post(conn, &id)).await
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        let body = serde_json::to_string(post)?;
        let id = post.id.clone();
        let date = date_iso(&post.date);
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO posts (id, date, body) VALUES (?1, ?2, ?3)",
                params![id, date, body],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<Option<Post>> {
        let id = id.to_string();
        let patch = patch.clone();
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let Some(mut post) = load_post(&tx, &id)? else {
                return Ok(None);
            };
            patch.apply(&mut post);
            tx.execute(
                "UPDATE posts SET date = ?1, body = ?2 WHERE id = ?3",
                params![date_iso(&post.date), serde_json::to_string(&post)?, id],
            )?;
            tx.commit()?;
            Ok(Some(post))
        })
        .await
    }

    async fn remove_post_cascade(&self, id: &str) -> Result<Removed> {
        let id = id.to_string();
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let comments = tx.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
            let posts = tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(Removed { posts, comments })
        })
        .await
    }

    async fn comments_for(&self, post_id: &str) -> Result<Vec<Comment>> {
        let post_id = post_id.to_string();
        self.call(move |conn| {
            let mut stmt = conn.prepare("SELECT body FROM comments WHERE post_id = ?1")?;
            let bodies = stmt
                .query_map(params![post_id], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            bodies.into_iter().map(decode).collect()
        })
        .await
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        let body = serde_json::to_string(comment)?;
        let id = comment.id.clone();
        let post_id = comment.post_id.clone();
        let date = date_iso(&comment.date);
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO comments (id, post_id, date, body) VALUES (?1, ?2, ?3, ?4)",
                params![id, post_id, date, body],
            )?;
            Ok(())
        })
        .await
    }
}
