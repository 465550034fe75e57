use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid connection string: {0}")]
    InvalidUri(String),
    #[error("document store unreachable: {0}")]
    Unreachable(String),
}
