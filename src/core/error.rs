use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Status API transport error: {0}")]
    Transport(String),

    #[error("Status API returned a malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
#[error("Failed to deliver message to chat {chat_id}: {reason}")]
pub struct DeliveryError {
    pub chat_id: String,
    pub reason: String,
}
