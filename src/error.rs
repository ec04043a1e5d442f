//! Error types for the generation dispatcher.

use thiserror::Error;

/// Result type alias using [`GenerateError`].
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Everything that can go wrong between receiving a generation request and
/// the generator script exiting.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Missing or conflicting source, or a project name that cannot be
    /// derived. Raised before any process is spawned.
    #[error("{0}")]
    ClientInput(String),

    /// The generator script ran and exited with a non-zero status.
    #[error("generator script exited with code {return_code}")]
    ProcessExecution {
        return_code: i32,
        stdout: String,
        stderr: String,
    },

    /// Interpreter or script could not be found on this host.
    #[error("{0}")]
    Configuration(String),

    /// Anything else raised while invoking the generator.
    #[error("{0}")]
    Internal(String),
}
