//! Application error types.

use std::num::ParseIntError;

use common::ParsePersonIdError;
use thiserror::Error;

/// A line from the input source that is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}, try `help`")]
    UnknownCommand(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("birth year {value:?} is not a number: {source}")]
    InvalidBirthYear {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    InvalidId(#[from] ParsePersonIdError),

    #[error("`{command}` takes no arguments")]
    UnexpectedArgument { command: &'static str },
}

/// Errors that end the application loop.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
