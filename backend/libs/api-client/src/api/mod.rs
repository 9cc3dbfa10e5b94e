//! Typed endpoint wrappers, one module per resource.

mod auth;
mod hashtags;
mod posts;
mod users;
