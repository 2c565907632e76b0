//! Player error types.

use thiserror::Error;

pub type PlayerResult<T> = Result<T, PlayerError>;

#[derive(Debug, Error, PartialEq)]
pub enum PlayerError {
    #[error("Invalid simulation parameter: {0}")]
    InvalidParameter(String),
}

impl PlayerError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
