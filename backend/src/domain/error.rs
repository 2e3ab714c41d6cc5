use thiserror::Error;

/// Failure taxonomy for the domain services.
///
/// `Store` wraps dependency failures (database unreachable, query error) and
/// is the only variant the dashboard aggregator itself can produce; an empty
/// month is a valid report, never an error.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("storage error: {0}")]
    Store(#[from] anyhow::Error),
}
