//! Error types for the todo client.
//!
//! # Design
//! `ApiError` describes one failed exchange with the backend. `NotFound`
//! gets its own variant because a 404 on update/delete means the task is
//! gone remotely; every other non-2xx lands in `HttpError` with the raw
//! status and body. `SyncError` is what `TodoList` operations return and
//! wraps `ApiError` together with the operation that failed.

use thiserror::Error;

use crate::http::TransportError;
use crate::state::{OpKind, Ticket};
use crate::types::TaskId;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Input rejected before any request is issued. The messages are meant to
/// be shown to the user as-is.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a task before adding!")]
    EmptyDraft,
    #[error("Task cannot be empty!")]
    EmptyEdit,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no task is being edited")]
    NotEditing,

    #[error("no task with id {0}")]
    UnknownTask(TaskId),

    #[error("no request in flight for ticket {0}")]
    UnknownTicket(Ticket),

    #[error("{op} failed: {source}")]
    Request {
        op: OpKind,
        #[source]
        source: ApiError,
    },
}

impl SyncError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }
}
