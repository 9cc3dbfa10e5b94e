//! Input validation for account and content fields
//!
//! Each validator returns the normalized value or a client-facing
//! `AppError::ValidationError`.

use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;
pub const MAX_POST_CONTENT: usize = 280;
pub const MAX_COMMENT_CONTENT: usize = 500;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username regex"));

static DANGEROUS_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        // XSS
        Regex::new(r"(?i)(<script|</script|javascript:|on\w+\s*=)").expect("valid xss regex"),
        // SQL injection
        Regex::new(r"(?i)(;\s*DROP\s+TABLE|;\s*DELETE\s+FROM|';\s*--)").expect("valid sql regex"),
    ]
});

fn invalid(msg: &str) -> AppError {
    AppError::ValidationError(msg.to_string())
}

fn contains_dangerous_pattern(s: &str) -> bool {
    DANGEROUS_PATTERNS.iter().any(|re| re.is_match(s))
}

pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(invalid("email cannot be empty"));
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(invalid("email is too long (max 255 characters)"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(invalid("invalid email format"));
    }
    if contains_dangerous_pattern(email) {
        return Err(invalid("content contains invalid characters"));
    }

    Ok(email.to_string())
}

/// Passwords are not trimmed
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(invalid("password cannot be empty"));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(invalid("password must be at least 8 characters"));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(invalid("password is too long (max 128 characters)"));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(invalid("username cannot be empty"));
    }

    let length = username.chars().count();
    if length < MIN_USERNAME_LENGTH {
        return Err(invalid("username must be at least 3 characters"));
    }
    if length > MAX_USERNAME_LENGTH {
        return Err(invalid("username is too long (max 30 characters)"));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(invalid(
            "username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(username.to_string())
}

pub fn validate_post_content(content: &str) -> Result<String> {
    validate_text(content, MAX_POST_CONTENT, "post content is too long (max 280 characters)")
}

pub fn validate_comment_content(content: &str) -> Result<String> {
    validate_text(
        content,
        MAX_COMMENT_CONTENT,
        "comment content is too long (max 500 characters)",
    )
}

fn validate_text(content: &str, max: usize, too_long: &str) -> Result<String> {
    let content = content.trim();

    if content.is_empty() {
        return Err(invalid("content cannot be empty"));
    }
    if content.chars().count() > max {
        return Err(invalid(too_long));
    }

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: AppError) -> String {
        err.client_message().to_string()
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(validate_email("  a.b@example.com ").unwrap(), "a.b@example.com");
        assert_eq!(message(validate_email("").unwrap_err()), "email cannot be empty");
        assert_eq!(message(validate_email("not-an-email").unwrap_err()), "invalid email format");

        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            message(validate_email(&long).unwrap_err()),
            "email is too long (max 255 characters)"
        );
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("password1").is_ok());
        assert_eq!(
            message(validate_password("short").unwrap_err()),
            "password must be at least 8 characters"
        );
        assert!(validate_password(&"x".repeat(129)).is_err());
        // Counted in characters, not bytes
        assert!(validate_password("パスワードです。").is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(validate_username(" alice_01 ").unwrap(), "alice_01");
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert_eq!(
            message(validate_username("bad-name").unwrap_err()),
            "username can only contain letters, numbers, and underscores"
        );
    }

    #[test]
    fn test_post_content_rules() {
        assert_eq!(validate_post_content("  hello  ").unwrap(), "hello");
        assert_eq!(
            message(validate_post_content("   ").unwrap_err()),
            "content cannot be empty"
        );
        assert!(validate_post_content(&"あ".repeat(280)).is_ok());
        assert!(validate_post_content(&"あ".repeat(281)).is_err());
    }

    #[test]
    fn test_comment_content_rules() {
        assert!(validate_comment_content(&"x".repeat(500)).is_ok());
        assert_eq!(
            message(validate_comment_content(&"x".repeat(501)).unwrap_err()),
            "comment content is too long (max 500 characters)"
        );
    }

    #[test]
    fn test_dangerous_patterns() {
        assert!(contains_dangerous_pattern("<script>alert(1)</script>"));
        assert!(contains_dangerous_pattern("x'; DROP TABLE users"));
        assert!(contains_dangerous_pattern("img onerror = x"));
        assert!(!contains_dangerous_pattern("plain text"));
    }
}
