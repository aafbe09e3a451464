use thiserror::Error;

/// Failures of a backend call, split the way the panel reports them:
/// transport problems become generic network errors, application-level
/// failures carry the backend's own message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network unreachable, non-2xx status, or a request that never
    /// completed.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered but not with the shape this panel expects.
    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),

    /// The backend answered `{"success": false}`; the message is the
    /// backend's `error` field, surfaced to the operator near-verbatim.
    #[error("{0}")]
    Backend(String),
}
