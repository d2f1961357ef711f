use reqwest::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("API Error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Network Error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage Error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Config Error: {0}")]
    Config(String),
}

impl ClientError {
    /// Message suitable for an inline, dismissible error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg)
            | ClientError::Unauthorized(msg)
            | ClientError::Forbidden(msg)
            | ClientError::NotFound(msg)
            | ClientError::Config(msg) => msg.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Network(err) => {
                if err.is_timeout() {
                    "Request timed out".to_string()
                } else {
                    err.to_string()
                }
            }
            ClientError::Serialization(_) => "Unexpected response from server".to_string(),
            ClientError::Storage(err) => format!("Failed to access local session: {}", err),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

// Flatten field errors into one readable line, e.g. "email: invalid email; password: too short"
impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let detail = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    format!("{}: {}", field, detail)
                })
            })
            .collect();
        messages.sort();
        ClientError::Validation(messages.join("; "))
    }
}
