use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Message used when the server gives none
pub const GENERIC_MESSAGE: &str = "API call failed";

/// Maximum length for error response bodies in log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// The API client's single error type.
///
/// Every variant produced from a server response carries the server's
/// `message` field when it sent one, else [`GENERIC_MESSAGE`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success status, or a write acknowledged with `success: false`
    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request body could not be encoded; nothing was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// The `message` field of a JSON error body, if there is one
    fn server_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::server_message(body).unwrap_or_else(|| GENERIC_MESSAGE.to_string());
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            code @ 500..=599 => ApiError::ServerError {
                status: code,
                message,
            },
            code => ApiError::Rejected {
                status: Some(code),
                message,
            },
        }
    }

    /// A write the server answered with `success: false`
    pub fn rejected(message: Option<String>) -> Self {
        ApiError::Rejected {
            status: None,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
        }
    }

    /// Message to show the user
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(m)
            | ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::ServerError { message: m, .. }
            | ApiError::Rejected { message: m, .. } => m.clone(),
            ApiError::NetworkError(e) => format!("Network error: {}", e),
            ApiError::InvalidResponse(_) => GENERIC_MESSAGE.to_string(),
            ApiError::InvalidRequest(_) => self.to_string(),
        }
    }

    /// HTTP status behind this error, when it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::ServerError { status, .. } => Some(*status),
            ApiError::Rejected { status, .. } => *status,
            ApiError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_server_message() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"not found"}"#);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.message(), "not found");
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_from_status_falls_back_to_generic() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");
        assert!(matches!(err, ApiError::ServerError { status: 502, .. }));
        assert_eq!(err.message(), GENERIC_MESSAGE);

        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"error":"no token"}"#);
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == GENERIC_MESSAGE));

        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"message":""}"#);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.message(), GENERIC_MESSAGE);
    }

    #[test]
    fn test_rejected_ack() {
        assert_eq!(
            ApiError::rejected(Some("Artifact already liked".to_string())).message(),
            "Artifact already liked"
        );
        assert_eq!(ApiError::rejected(None).message(), GENERIC_MESSAGE);
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
