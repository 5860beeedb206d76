//! Session error taxonomy.

use thiserror::Error;

/// Errors surfaced by session operations.
///
/// None of these panic the session. Precondition failures reject the
/// offending request and leave state untouched; service failures and
/// timeouts abandon the pending anchor operation; a missing collaborator
/// is reported once at startup, after which dependent calls no-op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Request rejected because current state does not allow it.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The platform anchor service reported a failure.
    #[error("anchor service failure: {reason}")]
    Service { reason: String },

    /// A platform collaborator was never wired in.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A pending operation outlived its deadline.
    #[error("{operation} timed out after {seconds:.0}s")]
    Timeout {
        operation: &'static str,
        seconds: f32,
    },
}
