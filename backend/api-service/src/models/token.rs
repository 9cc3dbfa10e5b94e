use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshToken {
    pub fn is_valid(&self) -> bool {
        !self.revoked && Utc::now() < self.expires_at
    }
}

/// One-shot token for password reset or email verification
#[derive(Debug, Clone, FromRow)]
pub struct OneTimeToken {
    pub id: i64,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Admin-mediated password reset request
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PasswordResetRequest {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(revoked: bool, expires_in: Duration) -> RefreshToken {
        RefreshToken {
            id: 1,
            user_id: 1,
            token_hash: "h".into(),
            expires_at: Utc::now() + expires_in,
            revoked,
        }
    }

    #[test]
    fn test_refresh_token_validity() {
        assert!(token(false, Duration::hours(1)).is_valid());
        assert!(!token(true, Duration::hours(1)).is_valid());
        assert!(!token(false, Duration::seconds(-1)).is_valid());
    }
}
