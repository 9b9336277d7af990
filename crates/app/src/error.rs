use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] receipt_client::ClientError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("aborted: {0}")]
    Aborted(String),
}
