mod admin;
mod audit_log;
mod password_reset;
mod user;

pub use admin::*;
pub use audit_log::*;
pub use password_reset::*;
pub use user::*;
