use ml::MlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RlError {
    #[error("{what}: expected length {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("cannot train on an empty batch")]
    EmptyBatch,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Engine(#[from] MlError),
}

pub type Result<T, E = RlError> = std::result::Result<T, E>;

/// Fails with [`RlError::ShapeMismatch`] unless `actual == expected`.
pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RlError::ShapeMismatch { what, expected, actual })
    }
}
