//! Error types for the core library.

use std::fmt;

use crate::ServerId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a [`crate::LoadBalancer`].
///
/// Only conditions the design treats as recoverable live here. Operating on
/// an empty ring and removing an absent server are *not* among them: the
/// design requires those to fail fast and terminate the process with a
/// diagnostic, with no recovery path, so this library reports them by
/// panicking rather than by returning an `Err` a caller could swallow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `add_server` was called with an id that is already live.
    DuplicateServer(ServerId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateServer(id) => write!(f, "server {id} is already registered"),
        }
    }
}

impl std::error::Error for Error {}
