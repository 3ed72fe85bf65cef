//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ScoreSnapshot, StatusSnapshot, TrackerError};

pub enum UiEvent {
    Info(String),
    StatusChanged(StatusSnapshot),
    ScoresReplaced(ScoreSnapshot),
    FileSelected { filename: String },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Busy,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Upload,
    Refresh,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("already in progress") {
            UiErrorCategory::Busy
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("no file selected")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("failed to reach")
            || message_lower.contains("gateway rejected")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_tracker_error(context: UiErrorContext, err: &TrackerError) -> Self {
        let message = format!("{err:#}");
        if err.is_busy() {
            return Self {
                category: UiErrorCategory::Busy,
                context,
                message,
            };
        }
        Self::from_message(context, message)
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
