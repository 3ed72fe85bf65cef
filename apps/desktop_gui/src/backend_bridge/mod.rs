//! Bridge between the UI thread and the backend worker that owns the tracker.

pub mod commands;
pub mod runtime;
