use thiserror::Error;

/// Errors surfaced by the library.
///
/// Callers mostly care about two kinds: their arguments were rejected before
/// any request went out (`InvalidInput`), or the IMF service answered with a
/// failure or an unexpected shape (`Remote`). Chart rendering adds a third.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Error::Remote(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Remote(e.to_string())
    }
}
