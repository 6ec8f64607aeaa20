//! Show a post with its discussion

use anyhow::Result;

use crate::helpers::{relative_date, short_date};
use crate::Anomia;

pub async fn run(anomia: &Anomia, id: &str) -> Result<()> {
    let repo = anomia.open_repository()?;
    let Some(post) = repo.get_post(id).await? else {
        anyhow::bail!("Post not found: {}", id);
    };
    let comments = repo.list_comments_by_post(id).await?;

    println!("{}", post.title);
    if !post.subtitle.is_empty() {
        println!("{}", post.subtitle);
    }
    println!("{} - {}", post.author, short_date(&post.date));
    if !post.tags.is_empty() {
        println!("Tags: {}", post.tags.join(", "));
    }
    println!("Image: {}", post.image_url);
    println!();
    println!("{}", post.content);
    println!();
    println!("Comments ({}):", comments.len());
    for comment in comments {
        println!("  {} ({})", comment.author, relative_date(&comment.date));
        println!("    {}", comment.content);
    }

    Ok(())
}
