//! Post and Comment models

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::helpers::iso;

/// A blog post as stored by the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Opaque unique id, assigned at creation
    pub id: String,

    /// Post title
    pub title: String,

    /// Subtitle shown under the title
    #[serde(default)]
    pub subtitle: String,

    /// Body text
    pub content: String,

    /// Display name of the author
    pub author: String,

    /// Avatar of the author
    #[serde(default)]
    pub author_image: String,

    /// Creation date
    #[serde(with = "iso")]
    pub date: DateTime<Utc>,

    /// Post tags, in the order they were given
    #[serde(default)]
    pub tags: Vec<String>,

    /// Cover image reference
    #[serde(default)]
    pub image_url: String,

    /// Short description of the cover image
    #[serde(default)]
    pub image_hint: String,
}

impl Post {
    /// Whether `query` (already lowercased) occurs in the title, the content or a tag
    pub fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.content.to_lowercase().contains(query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(query))
    }
}

/// A reader comment attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Id of the post this comment belongs to. Not checked on write.
    pub post_id: String,
    pub author: String,
    pub content: String,
    #[serde(with = "iso")]
    pub date: DateTime<Utc>,
}

/// Caller-supplied fields for a new post
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub subtitle: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Replaced by a placeholder when absent or blank
    pub image_url: Option<String>,
    pub image_hint: String,
}

/// Partial update of a post. `None` leaves the stored field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl PostPatch {
    /// Merge the supplied fields onto `post`
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(subtitle) = &self.subtitle {
            post.subtitle = subtitle.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(tags) = &self.tags {
            post.tags = tags.clone();
        }
        if let Some(image_url) = &self.image_url {
            post.image_url = image_url.clone();
        }
        if let Some(image_hint) = &self.image_hint {
            post.image_hint = image_hint.clone();
        }
        if let Some(date) = self.date {
            post.date = date.trunc_subsecs(3);
        }
    }

    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Caller-supplied fields for a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: String,
    pub author: String,
    pub content: String,
}
