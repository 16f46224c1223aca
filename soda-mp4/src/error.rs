use thiserror::Error;

/// The errors that may occur while unlocking a file.
///
/// Every variant is terminal for the call. Retrying with the same inputs
/// always fails the same way.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The `PlayAuth` token is malformed or fails a bounds check while being deobfuscated.
    #[error("invalid play auth token: {0}")]
    InvalidToken(String),

    /// A required box is missing or its header is inconsistent.
    #[error("malformed container: required '{0}' box not found")]
    MalformedContainer(String),

    /// Reconstructed media data does not have the length of the original payload.
    #[error("decrypted mdat payload is {actual} bytes but expected {expected} bytes")]
    SizeMismatch { expected: usize, actual: usize },
}

impl Error {
    pub(crate) fn token<T: Into<String>>(reason: T) -> Self {
        Self::InvalidToken(reason.into())
    }

    pub(crate) fn missing(name: &str) -> Self {
        Self::MalformedContainer(name.to_owned())
    }

    /// Returns true if the error was caused by the token rather than the file.
    pub fn is_token_err(&self) -> bool {
        matches!(self, Self::InvalidToken(_))
    }

    /// Returns true if the error was caused by the file structure.
    pub fn is_container_err(&self) -> bool {
        matches!(self, Self::MalformedContainer(_))
    }
}
