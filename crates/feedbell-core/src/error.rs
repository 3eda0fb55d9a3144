use std::fmt;

use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No session credential available")]
    NotAuthenticated,

    #[error("Push stream error: {message}")]
    Stream { message: String },

    #[error("Config error: {message}")]
    Config { message: String },
}

impl FeedError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            FeedError::Status { status, .. } => match *status {
                401 | 403 => "Your session has expired. Please sign in again.".to_string(),
                404 => "That notification no longer exists.".to_string(),
                429 => "Too many requests. Please wait a moment.".to_string(),
                500..=599 => {
                    "The notification service is unavailable. Try again shortly.".to_string()
                }
                _ => format!("The server rejected the request ({}).", status),
            },
            FeedError::Request(e) if e.is_timeout() => {
                "The server took too long to respond.".to_string()
            }
            FeedError::Request(_) | FeedError::Stream { .. } => {
                "Could not reach the server. Check your connection.".to_string()
            }
            FeedError::Decode(_) => "Received an unexpected response from the server.".to_string(),
            FeedError::NotAuthenticated => "You need to sign in to see notifications.".to_string(),
            FeedError::Config { message } => format!("Configuration problem: {}", message),
        }
    }
}

/// Which user-visible operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    LoadNotifications,
    LoadMore,
    MarkRead,
    MarkAllRead,
}

impl ErrorContext {
    fn headline(&self) -> &'static str {
        match self {
            ErrorContext::LoadNotifications => "Couldn't load notifications.",
            ErrorContext::LoadMore => "Couldn't load more notifications.",
            ErrorContext::MarkRead => "Couldn't mark the notification as read.",
            ErrorContext::MarkAllRead => "Couldn't mark all notifications as read.",
        }
    }
}

/// A dismissible error exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    pub context: ErrorContext,
    pub message: String,
}

impl fmt::Display for UserFacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Shared error-reporting sink. Holds at most one visible error; a newer
/// report replaces the older one.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    current: Mutex<Option<UserFacingError>>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, context: ErrorContext, error: &FeedError) -> UserFacingError {
        tracing::warn!(?context, error = %error, "notification operation failed");
        let surfaced = UserFacingError {
            context,
            message: format!("{} {}", context.headline(), error.user_message()),
        };
        *self.current.lock() = Some(surfaced.clone());
        surfaced
    }

    pub fn current(&self) -> Option<UserFacingError> {
        self.current.lock().clone()
    }

    pub fn dismiss(&self) {
        self.current.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        let unauthorized = FeedError::Status {
            status: 401,
            body: String::new(),
        };
        assert!(unauthorized.user_message().contains("session has expired"));

        let unavailable = FeedError::Status {
            status: 503,
            body: "down".to_string(),
        };
        assert!(unavailable.user_message().contains("unavailable"));
    }

    #[test]
    fn test_report_and_dismiss() {
        let reporter = ErrorReporter::new();
        assert!(reporter.current().is_none());

        reporter.report(ErrorContext::MarkRead, &FeedError::NotAuthenticated);
        let current = reporter.current().unwrap();
        assert_eq!(current.context, ErrorContext::MarkRead);
        assert!(current.message.starts_with("Couldn't mark the notification as read."));

        reporter.dismiss();
        assert!(reporter.current().is_none());
        // Dismissing twice is harmless
        reporter.dismiss();
    }

    #[test]
    fn test_newer_report_replaces_older() {
        let reporter = ErrorReporter::new();
        reporter.report(ErrorContext::LoadMore, &FeedError::NotAuthenticated);
        reporter.report(
            ErrorContext::MarkAllRead,
            &FeedError::Stream {
                message: "reset".to_string(),
            },
        );
        assert_eq!(
            reporter.current().map(|e| e.context),
            Some(ErrorContext::MarkAllRead)
        );
    }
}
