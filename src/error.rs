use log::error;

use crate::protocol::ErrorCode;

#[derive(serde::Serialize, Debug)]
pub struct ApiError {
    #[serde(skip)]
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            message: msg.to_string(),
            error: None,
        }
    }
    pub fn not_found(msg: &str) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: msg.to_string(),
            error: None,
        }
    }
    pub fn internal(msg: &str, cause: &str) -> Self {
        Self {
            code: ErrorCode::InternalServerError,
            message: msg.to_string(),
            error: Some(cause.to_string()),
        }
    }

    /// Re-labels a 500 with the context of the operation that failed, the
    /// previous message and cause become the `error` description.
    /// Validation and not-found errors pass through unchanged.
    pub fn context(self, msg: &str) -> Self {
        match self.code {
            ErrorCode::InternalServerError => {
                let cause = self.to_string();
                error!("{}: {}", msg, cause);
                Self::internal(msg, &cause)
            }
            _ => self,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            Some(cause) => write!(f, "{}: {}", self.message, cause),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Utility function for mapping any error into an Internal Server Error
pub fn internal_error<E>(msg: &str, err: E) -> ApiError
where
    E: std::error::Error,
{
    error!("{}: {:?}", msg, err);
    ApiError::internal(msg, &err.to_string())
}
