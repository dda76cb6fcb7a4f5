use thiserror::Error;

/// Errors produced while scanning configuration text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("'{0}' is not a valid date/time")]
    InvalidTimestamp(String),

    #[error("'{0}' is not a valid integer")]
    InvalidInteger(String),

    #[error("'{0}' is not a valid floating-point number")]
    InvalidNumber(String),

    #[error("'{0}' is out of range")]
    OutOfRange(String),

    #[error("'{0}' is not a valid range")]
    InvalidRange(String),

    #[error("'{0}' is not a valid interval")]
    InvalidInterval(String),
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
