//! Defines the errors which can occur when loading a batch.
//!
//! Everything below the [session store](crate::session::SessionStore) reports failures as plain
//! `anyhow::Error` with some context attached. Only when crossing the public boundary these are
//! wrapped into a [LoadError], so that callers can tell a failed transport from a load which was
//! discarded due to a logout.
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Enumerates the possible errors when loading a batch.
#[derive(Debug)]
pub enum LoadError {
    /// Represents a failure of the underlying payload source (IO, parsing, network...).
    Transport(anyhow::Error),

    /// Signals that the session was invalidated while the payload was being fetched.
    ///
    /// The fetched payload has been discarded and wasn't stored.
    Invalidated,
}

impl From<anyhow::Error> for LoadError {
    fn from(err: anyhow::Error) -> LoadError {
        LoadError::Transport(err)
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            LoadError::Transport(e) => write!(f, "Failed to load data: {:#}", e),
            LoadError::Invalidated => write!(f, "The session was invalidated while loading data"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            LoadError::Transport(ref e) => Some(&**e),
            LoadError::Invalidated => None,
        }
    }
}

/// Represents the result of loading a batch.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
