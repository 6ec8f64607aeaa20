//! Add a comment to a post

use anyhow::Result;
use validator::Validate;

use crate::content::{Comment, CommentForm};
use crate::Anomia;

/// Validate and store a comment. The post is not required to exist.
pub async fn add_comment(
    anomia: &Anomia,
    post_id: &str,
    author: &str,
    content: &str,
) -> Result<Comment> {
    let form = CommentForm {
        author: author.to_string(),
        content: content.to_string(),
    };
    if let Err(errors) = form.validate() {
        anyhow::bail!("Invalid comment: {}", errors);
    }

    let repo = anomia.open_repository()?;
    let comment = repo.create_comment(form.into_new_comment(post_id)).await?;

    println!("Comment added: {}", comment.id);
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_comment() {
        let dir = tempfile::tempdir().unwrap();
        let anomia = Anomia::new(dir.path()).unwrap();

        let comment = add_comment(&anomia, "post_1", "Bia", "Bom texto").await.unwrap();
        assert!(comment.id.starts_with("comment_"));

        let comments = anomia
            .open_repository()
            .unwrap()
            .list_comments_by_post("post_1")
            .await
            .unwrap();
        assert_eq!(comments, vec![comment]);

        assert!(add_comment(&anomia, "post_1", "B", "x").await.is_err());
    }
}
