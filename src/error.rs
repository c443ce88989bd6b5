use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Validation error: {0}")]
    ValidatorError(#[from] validator::ValidationErrors),
}

// 便利函数，用于创建常见错误
impl AppError {
    pub fn unauthorized(msg: &str) -> Self {
        Self::Authentication(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }

    /// 根据HTTP状态码构造错误
    pub fn from_status(status: StatusCode, code: Option<String>, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Authentication(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Api {
                status,
                code,
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        match self {
            AppError::Authentication(_) => true,
            AppError::Api { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// 面向用户的提示文本（原样展示在提示框中）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api { message, .. }
            | AppError::Authentication(message)
            | AppError::Validation(message)
            | AppError::NotFound(message) => message.clone(),
            AppError::ValidatorError(e) => {
                let fields = e
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Invalid value for: {}", fields)
            }
            AppError::Request(_) | AppError::WebSocket(_) => {
                "Unable to reach the server, please try again later".to_string()
            }
            _ => "Something went wrong, please try again later".to_string(),
        }
    }
}

#[cfg(feature = "websocket")]
impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        AppError::WebSocket(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        let err = AppError::from_status(StatusCode::UNAUTHORIZED, None, "expired".into());
        assert!(err.is_unauthorized());

        let err = AppError::from_status(StatusCode::NOT_FOUND, None, "no story".into());
        assert!(matches!(err, AppError::NotFound(_)));

        let err = AppError::from_status(
            StatusCode::CONFLICT,
            Some("ALREADY_FAVORITED".into()),
            "already in favorites".into(),
        );
        match err {
            AppError::Api { status, code, .. } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(code.as_deref(), Some("ALREADY_FAVORITED"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::internal("mutex poisoned at line 42");
        assert_eq!(err.user_message(), "Something went wrong, please try again later");

        let err = AppError::validation("Passwords do not match");
        assert_eq!(err.user_message(), "Passwords do not match");
    }
}
