mod audit_service;
mod auth_service;
mod dashboard_service;
mod password_reset_service;
mod user_service;

pub use audit_service::*;
pub use auth_service::*;
pub use dashboard_service::*;
pub use password_reset_service::*;
pub use user_service::*;
