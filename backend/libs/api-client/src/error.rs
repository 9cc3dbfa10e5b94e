use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    /// The session could not be refreshed; the user has to log in again
    #[error("session expired")]
    SessionExpired,

    /// The session refresh this request was waiting on was cancelled twice
    #[error("session refresh interrupted")]
    RefreshInterrupted,

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl ClientError {
    /// Build an `Api` error from a non-success response body
    pub(crate) fn from_body(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => ClientError::Api {
                status,
                code: parsed.error.code,
                message: parsed.error.message,
            },
            Err(_) => ClientError::Api {
                status,
                code: None,
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }

    /// Message suitable for showing to the user in an alert
    pub fn alert_message(&self) -> String {
        match self {
            ClientError::Http(e) if e.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            ClientError::Http(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            ClientError::RefreshInterrupted => {
                "The request was interrupted. Please try again.".to_string()
            }
            ClientError::Decode(_) => {
                "Received an unexpected response from the server.".to_string()
            }
            ClientError::InvalidUrl(_) => {
                "The API address is not configured correctly.".to_string()
            }
            ClientError::Api {
                status, message, ..
            } => match *status {
                StatusCode::UNAUTHORIZED => {
                    "Your session has expired. Please log in again.".to_string()
                }
                StatusCode::FORBIDDEN => {
                    "You do not have permission to perform this action.".to_string()
                }
                StatusCode::NOT_FOUND => "The requested item was not found.".to_string(),
                StatusCode::TOO_MANY_REQUESTS => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                s if s.is_server_error() => {
                    "A server error occurred. Please try again later.".to_string()
                }
                // Validation and conflict messages are written for end users
                _ if !message.is_empty() => message.clone(),
                _ => "The request could not be completed.".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_parses_error_envelope() {
        let err = ClientError::from_body(
            StatusCode::TOO_MANY_REQUESTS,
            br#"{"error":{"code":"RATE_LIMIT_EXCEEDED","message":"Too many requests."}}"#,
        );
        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(code.as_deref(), Some("RATE_LIMIT_EXCEEDED"));
                assert_eq!(message, "Too many requests.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_body_without_envelope() {
        let err = ClientError::from_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    fn api(status: StatusCode, message: &str) -> ClientError {
        ClientError::Api {
            status,
            code: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_alert_messages_by_status() {
        assert_eq!(
            api(StatusCode::FORBIDDEN, "unauthorized").alert_message(),
            "You do not have permission to perform this action."
        );
        assert_eq!(
            api(StatusCode::NOT_FOUND, "post not found").alert_message(),
            "The requested item was not found."
        );
        assert_eq!(
            api(StatusCode::TOO_MANY_REQUESTS, "").alert_message(),
            "Too many requests. Please wait a moment and try again."
        );
        assert_eq!(
            api(StatusCode::SERVICE_UNAVAILABLE, "db down").alert_message(),
            "A server error occurred. Please try again later."
        );
    }

    #[test]
    fn test_client_errors_surface_server_message() {
        assert_eq!(
            api(StatusCode::CONFLICT, "already liked").alert_message(),
            "already liked"
        );
        assert_eq!(
            api(StatusCode::BAD_REQUEST, "").alert_message(),
            "The request could not be completed."
        );
    }

    #[test]
    fn test_session_expired() {
        let err = ClientError::SessionExpired;
        assert!(err.is_session_expired());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(
            err.alert_message(),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn test_interrupted_refresh_is_not_an_expired_session() {
        let err = ClientError::RefreshInterrupted;
        assert!(!err.is_session_expired());
        assert_eq!(err.status(), None);
        assert_eq!(
            err.alert_message(),
            "The request was interrupted. Please try again."
        );
    }
}
