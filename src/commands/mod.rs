//! CLI commands

pub mod comment;
pub mod delete;
pub mod init;
pub mod list;
pub mod new;
pub mod show;
