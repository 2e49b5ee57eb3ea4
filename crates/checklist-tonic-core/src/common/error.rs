//! Error types for the checklist gRPC service.
//!
//! This module defines the central `Error` enum surfaced by request handlers.
//! It implements `From<Error>` for `tonic::Status` so store failures reach
//! clients verbatim, each with its matching status code.
//!
//! ## Error Cases
//! - `Store`: a failure reported by the checklist store (`InvalidArgument`,
//!   `NotFound` or `Internal`).
//! - `ServiceShutdown`: a request arrived while the service was shutting
//!   down.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the checklist service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] checklist::Error),

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Store(err) => {
                let message = err.to_string();
                match err {
                    checklist::Error::InvalidArgument { .. } => Status::invalid_argument(message),
                    checklist::Error::NotFound { .. } => Status::not_found(message),
                    checklist::Error::Internal { .. } => Status::internal(message),
                }
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}
