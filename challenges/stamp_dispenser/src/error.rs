use thiserror::Error;

/// A denomination list that cannot back a [`StampDispenser`](crate::StampDispenser).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("denomination list is empty")]
    Empty,

    #[error("denominations must be strictly descending: {value} at index {index} follows {previous}")]
    NotDescending {
        index: usize,
        previous: i64,
        value: i64,
    },

    #[error("smallest denomination must be 1, found {last}")]
    MissingUnit { last: i64 },

    #[error("invalid denomination: {input:?}")]
    InvalidDenomination { input: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: cannot parse {token:?}")]
    Parse { line: usize, token: String },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("unexpected end of input")]
    UnexpectedEof,
}

pub type Result<T> = std::result::Result<T, Error>;
