//! Process error types.

use std::io;

/// Errors that can occur while launching or supervising a child process.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    /// fork() failed.
    #[error("fork failed: {0}")]
    Fork(#[source] io::Error),

    /// kill() failed.
    #[error("signal failed: {0}")]
    Signal(#[source] io::Error),

    /// waitpid() failed.
    #[error("waitpid failed: {0}")]
    Wait(#[source] io::Error),

    /// Invalid path (contains null bytes).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Invalid argument string (contains null bytes).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
