/// Business logic layer
///
/// Services own a `PgPool` clone and translate repository results into
/// `AppError`s with client-facing messages.
pub mod auth;
pub mod comments;
pub mod email;
pub mod email_verification;
pub mod hashtags;
pub mod media;
pub mod password_reset;
pub mod posts;
pub mod reactions;
pub mod users;

pub use auth::{AuthService, AuthSession};
pub use comments::CommentService;
pub use email::EmailService;
pub use email_verification::EmailVerificationService;
pub use hashtags::HashtagService;
pub use media::MediaService;
pub use password_reset::PasswordResetService;
pub use posts::PostService;
pub use reactions::ReactionService;
pub use users::UserService;
