//! User-facing notices.
//!
//! The engine never prints or logs; anything the user should see is emitted
//! as a [`Notice`] through callbacks registered on the session. Front ends
//! decide presentation (toast, status line, dialog). Failures inside a user
//! flow are terminal and local: they surface as exactly one notice and are
//! never propagated as errors.

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// A flow completed as intended.
    Success,
    /// The user's input prevented the flow (nothing was changed).
    Warning,
    /// The flow failed against current state (nothing was changed).
    Error,
}

/// One user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity, for presentation.
    pub level: NoticeLevel,
    /// The message text.
    pub message: String,
}

impl Notice {
    /// Create a notice.
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// An [`NoticeLevel::Info`] notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    /// A [`NoticeLevel::Success`] notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    /// A [`NoticeLevel::Warning`] notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    /// An [`NoticeLevel::Error`] notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Callback invoked for every emitted notice.
pub type NoticeCallback = Box<dyn FnMut(&Notice) + Send>;
