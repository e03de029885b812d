//! Client-side state synchronization for a REST to-do collection.
//!
//! # Overview
//! `TodoList` holds the local task list, the new-task draft and the single
//! edit session, and turns user operations into `HttpRequest` values. The
//! host executes those requests and feeds the responses back, so the core
//! stays free of I/O and fully deterministic under test.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only the collection URL and splits
//!   each endpoint into `build_*` and `parse_*`.
//! - Every request `TodoList` issues carries a `Ticket`; completions may
//!   arrive in any order and stale update responses are discarded.
//! - Failures come back as `SyncError` values. Nothing is retried.

pub mod client;
pub mod error;
pub mod http;
pub mod state;
pub mod types;

pub use client::TodoClient;
pub use error::{ApiError, SyncError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportError};
pub use state::{Applied, OpKind, Outgoing, Ticket, TodoList};
pub use types::{Task, TaskFields, TaskId};
