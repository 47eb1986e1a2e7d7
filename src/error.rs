use thiserror::Error;

/// Catch-all error type for backend adapters and listeners. Adapters may
/// fail with whatever concrete error their storage medium produces; the
/// repository normalizes everything into [`DalError::Access`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by repository operations
#[derive(Debug, Error)]
pub enum DalError {
    /// A caller-side mistake: an object of the wrong runtime type was passed
    /// to one of the loosely-typed overloads. Raised synchronously, never
    /// wrapped, never routed through the listener pipeline.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Any failure from a backend adapter call or from listener business
    /// logic, with the original failure preserved as the source. Callers can
    /// branch on "DAL failed" without knowing the backend.
    #[error("Data access failed: {0}")]
    Access(#[source] BoxError),
}

impl DalError {
    /// The underlying backend/listener failure, if this is an access error
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match self {
            DalError::InvalidArgument(_) => None,
            DalError::Access(cause) => Some(cause.as_ref()),
        }
    }
}

/// Diagnostic side channel notified of every access error the repository
/// constructs. Passed into the repository at construction time rather than
/// held in process-wide state, so it can be scoped and tested per instance.
///
/// A failure returned from `on_error` is reported via `tracing::error!` and
/// suppressed; creating an error never fails the operation that triggered it.
pub trait ErrorObserver: Send + Sync {
    fn on_error(&self, error: &DalError) -> Result<(), BoxError>;
}
