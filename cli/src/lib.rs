//! Interactive terminal host for `todo-sync`.
//!
//! Reads commands from stdin, executes the requests `TodoList` issues on the
//! blocking pool, and feeds their outcomes back on the same single-threaded
//! event loop that handles user input.

pub mod app;
pub mod command;
pub mod config;
pub mod transport;
pub mod view;
