//! List site content

use anyhow::Result;
use std::collections::HashMap;

use crate::helpers::{relative_date, short_date};
use crate::Anomia;

/// List site content by type
pub async fn run(anomia: &Anomia, content_type: &str, query: Option<&str>) -> Result<()> {
    let repo = anomia.open_repository()?;

    match content_type {
        "post" | "posts" => {
            let posts = repo.search_posts(query.unwrap_or_default()).await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!("  {} - {} [{}]", short_date(&post.date), post.title, post.id);
            }
        }
        "tag" | "tags" => {
            let posts = repo.list_posts().await?;
            let mut tags: HashMap<String, usize> = HashMap::new();
            for post in &posts {
                for tag in &post.tags {
                    *tags.entry(tag.clone()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "comment" | "comments" => {
            let Some(post_id) = query else {
                anyhow::bail!("Listing comments needs a post id");
            };
            let comments = repo.list_comments_by_post(post_id).await?;
            println!("Comments ({}):", comments.len());
            for comment in comments {
                println!(
                    "  {} - {}: {}",
                    relative_date(&comment.date),
                    comment.author,
                    comment.content
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, comment",
                content_type
            );
        }
    }

    Ok(())
}
