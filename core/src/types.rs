//! Domain DTOs for the todo collection.
//!
//! # Design
//! These types mirror the reference backend's schema but are defined
//! independently; integration tests catch schema drift. `TaskId` is opaque:
//! backends disagree on whether ids are numbers or strings, so the client
//! keeps whatever form it received and only compares and formats it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Number(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

/// A single task as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

/// Request payload for both create and update. Updates are full replaces,
/// so both fields are always sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFields {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}
