use std::io;

use thiserror::Error;

use crate::lzf::LzfError;

/// Failure of a whole parse call. No partial point set accompanies an error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read point cloud file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed PCD container: {0}")]
    Malformed(String),

    #[error("corrupt compressed data section: {0}")]
    Corrupt(#[from] LzfError),

    #[error("truncated data section: need {expected} bytes, have {available}")]
    Truncated { expected: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, LoadError>;
