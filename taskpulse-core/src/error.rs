use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The input is not a collection of task-like records.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A pluggable advisor could not serve the call.
    #[error("advisor `{advisor}` unavailable: {reason}")]
    AdvisorUnavailable { advisor: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
