//! Delete a post and its comments

use anyhow::Result;

use crate::store::Removed;
use crate::Anomia;

pub async fn run(anomia: &Anomia, id: &str) -> Result<Removed> {
    let repo = anomia.open_repository()?;
    let removed = repo.delete_post_cascade(id).await?;

    if removed.posts == 0 {
        println!("No post {}, removed {} orphan comment(s)", id, removed.comments);
    } else {
        println!("Deleted {} and {} comment(s)", id, removed.comments);
    }
    Ok(removed)
}
