//! Helper functions shared by the store, server and CLI

mod date;

pub use date::*;
