use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache record encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("cache record decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RelscopeError>;
