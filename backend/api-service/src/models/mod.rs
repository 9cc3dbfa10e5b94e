/// Data models for the API service
///
/// - `user`: accounts, public profiles and the compact author summary
/// - `post`: posts as stored and the enriched view returned to clients
/// - `comment`, `media`, `hashtag`: post attachments
/// - `token`: refresh, reset and verification credentials
pub mod comment;
pub mod hashtag;
pub mod media;
pub mod post;
pub mod token;
pub mod user;

pub use comment::{Comment, CommentView};
pub use hashtag::TrendingHashtag;
pub use media::{Media, MediaType};
pub use post::{PostRow, PostView};
pub use token::{PasswordResetRequest, RefreshToken};
pub use user::{PublicUser, User, UserSummary};
