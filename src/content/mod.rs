//! Content module - post and comment records, submitted forms and tag handling

mod forms;
mod post;
mod tags;

pub use forms::{CommentForm, PostEditForm, PostForm};
pub use post::{Comment, NewComment, NewPost, Post, PostPatch};
pub use tags::{optional_tags_field, parse_tags, tags_field};
