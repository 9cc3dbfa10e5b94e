/// Outgoing mail for verification and password reset links
use crate::config::{AppConfig, EmailConfig};
use crate::error::{AppError, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

/// SMTP transport, or a log-only fallback when `SMTP_HOST` is empty
#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    frontend_url: String,
}

impl EmailService {
    pub fn new(config: &EmailConfig, app: &AppConfig) -> Result<Self> {
        let from = config
            .from_email
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid FROM_EMAIL address: {e}")))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; emails will be logged instead of sent");
            None
        } else {
            let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to configure SMTP transport: {e}")))?
                .port(config.smtp_port);

            let builder = if config.smtp_username.is_empty() {
                builder
            } else {
                builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ))
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            frontend_url: app.frontend_url.trim_end_matches('/').to_string(),
        })
    }

    /// Log-only service for tests
    pub fn disabled(frontend_url: &str) -> Self {
        Self {
            transport: None,
            from: Mailbox::new(None, "noreply@example.com".parse().expect("static address")),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub fn password_reset_link(&self, token: &str) -> String {
        format!("{}/auth/password-reset/confirm?token={token}", self.frontend_url)
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/auth/email/verify?token={token}", self.frontend_url)
    }

    pub async fn send_password_reset_email(&self, recipient: &str, token: &str) -> Result<()> {
        let link = self.password_reset_link(token);
        let body = format!(
            "We received a request to reset your password.\n\n\
             Open the following link to choose a new password:\n{link}\n\n\
             This link expires in 1 hour. If you did not request a reset, ignore this email."
        );
        self.send_mail(recipient, "Reset your password", &body, &link)
            .await
    }

    pub async fn send_verification_email(&self, recipient: &str, token: &str) -> Result<()> {
        let link = self.verification_link(token);
        let body = format!(
            "Welcome!\n\nPlease confirm your email address by opening this link:\n{link}\n\n\
             This link expires in 24 hours."
        );
        self.send_mail(recipient, "Verify your email address", &body, &link)
            .await
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str, link: &str) -> Result<()> {
        let Some(transport) = &self.transport else {
            info!(recipient, subject, link, "SMTP disabled; email not sent");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {e}")))?;

        info!(subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_use_frontend_url() {
        let service = EmailService::disabled("https://sns.example/");
        assert!(!service.is_enabled());
        assert_eq!(
            service.password_reset_link("abc"),
            "https://sns.example/auth/password-reset/confirm?token=abc"
        );
        assert_eq!(
            service.verification_link("xyz"),
            "https://sns.example/auth/email/verify?token=xyz"
        );
    }

    #[tokio::test]
    async fn test_disabled_service_succeeds_without_sending() {
        let service = EmailService::disabled("http://localhost:5173");
        assert!(service
            .send_verification_email("user@example.com", "token")
            .await
            .is_ok());
    }
}
