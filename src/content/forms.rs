//! Author- and reader-submitted forms, validated before reaching the repository

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use super::tags::{optional_tags_field, tags_field};
use super::{NewComment, NewPost, PostPatch};
use crate::helpers::iso;

/// A new post as submitted by the admin
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Subtitle must not be empty"))]
    pub subtitle: String,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    pub content: String,
    #[serde(default, deserialize_with = "tags_field")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_hint: Option<String>,
}

impl PostForm {
    pub fn into_new_post(self, default_hint: &str) -> NewPost {
        NewPost {
            title: self.title,
            subtitle: self.subtitle,
            content: self.content,
            tags: self.tags,
            image_url: self.image_url,
            image_hint: self.image_hint.unwrap_or_else(|| default_hint.to_string()),
        }
    }
}

/// Edits to an existing post; absent fields stay as they are
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostEditForm {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Subtitle must not be empty"))]
    pub subtitle: Option<String>,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "optional_tags_field")]
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
    #[serde(default, with = "iso::option")]
    pub date: Option<DateTime<Utc>>,
}

impl From<PostEditForm> for PostPatch {
    fn from(form: PostEditForm) -> Self {
        PostPatch {
            title: form.title,
            subtitle: form.subtitle,
            content: form.content,
            tags: form.tags,
            image_url: form.image_url,
            image_hint: form.image_hint,
            date: form.date,
        }
    }
}

/// A reader comment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub author: String,
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub content: String,
}

impl CommentForm {
    pub fn into_new_comment(self, post_id: impl Into<String>) -> NewComment {
        NewComment {
            post_id: post_id.into(),
            author: self.author,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form_length_rules() {
        let form = PostForm {
            title: "Ok!".to_string(),
            subtitle: "B".to_string(),
            content: "C".repeat(10),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        let short = PostForm {
            title: "Oi".to_string(),
            ..form.clone()
        };
        let errors = short.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_post_form_defaults_hint() {
        let form: PostForm = serde_json::from_str(
            r#"{"title": "Ética", "subtitle": "S", "content": "0123456789", "tags": "a,b"}"#,
        )
        .unwrap();
        let post = form.into_new_post("filosofia abstrata");
        assert_eq!(post.image_hint, "filosofia abstrata");
        assert_eq!(post.tags, vec!["a", "b"]);
        assert!(post.image_url.is_none());
    }

    #[test]
    fn test_edit_form_skips_absent_fields() {
        let form: PostEditForm =
            serde_json::from_str(r#"{"title": "Novo", "date": "2024-01-15T10:30:00.000Z"}"#).unwrap();
        assert!(form.validate().is_ok());

        let patch = PostPatch::from(form);
        assert_eq!(patch.title.as_deref(), Some("Novo"));
        assert!(patch.content.is_none());
        assert!(patch.tags.is_none());
        assert!(patch.date.is_some());
    }

    #[test]
    fn test_edit_form_validates_supplied_fields() {
        let form = PostEditForm {
            content: Some("curto".to_string()),
            ..Default::default()
        };
        assert!(form.validate().is_err());
        assert!(PostEditForm::default().validate().is_ok());
    }

    #[test]
    fn test_comment_form() {
        let form = CommentForm {
            author: "B".to_string(),
            content: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("author"));
        assert!(errors.field_errors().contains_key("content"));
    }
}
