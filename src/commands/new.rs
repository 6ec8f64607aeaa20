//! Create a new post

use anyhow::Result;
use validator::Validate;

use crate::content::{parse_tags, Post, PostForm};
use crate::Anomia;

/// Fields for a post created from the command line
#[derive(Debug, Clone, Default)]
pub struct NewPostArgs {
    pub title: String,
    pub subtitle: String,
    pub content: String,
    /// Comma-separated
    pub tags: String,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
}

/// Validate and store a new post
pub async fn create_post(anomia: &Anomia, args: NewPostArgs) -> Result<Post> {
    let form = PostForm {
        title: args.title,
        subtitle: args.subtitle,
        content: args.content,
        tags: parse_tags(&args.tags),
        image_url: args.image_url,
        image_hint: args.image_hint,
    };
    if let Err(errors) = form.validate() {
        anyhow::bail!("Invalid post: {}", errors);
    }

    let repo = anomia.open_repository()?;
    let post = repo
        .create_post(form.into_new_post(&anomia.config.images.default_hint))
        .await?;

    println!("Created: {} [{}]", post.title, post.id);
    Ok(post)
}
