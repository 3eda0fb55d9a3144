//! Application-wide constants
//!
//! Defaults for the notification subsystem and the REST/event-stream paths
//! exposed by the community server.

use std::time::Duration;

/// Default server base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default number of records requested per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default badge polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(15_000);

/// Shortest polling interval accepted; smaller values are raised to this
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Delay before the single reconnection attempt after a push transport error
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2_000);

/// Distance from the bottom of the list (in px) that triggers "load more"
pub const DEFAULT_SCROLL_THRESHOLD_PX: u32 = 48;

/// Number of items shown while the panel is collapsed
pub const DEFAULT_PREVIEW_LIMIT: usize = 5;

/// Badge values above this are rendered as "99+"
pub const BADGE_DISPLAY_CAP: u64 = 99;

// REST and event-stream paths, relative to the base URL
pub mod paths {
    /// Cursor-paginated list, filtered by `status`
    pub const LIST: &str = "/api/notifications";
    /// Authoritative unread badge count
    pub const UNREAD_COUNT: &str = "/api/notifications/unread-count";
    /// Bulk mark-read
    pub const READ_ALL: &str = "/api/notifications/read-all";
    /// Server-sent event stream
    pub const SUBSCRIBE: &str = "/api/notifications/subscribe";

    /// Single mark-read for one notification
    pub fn mark_read(id: &str) -> String {
        format!("/api/notifications/{}/read", id)
    }
}

// Named events carried by the subscription stream
pub mod events {
    pub const NOTIFICATION: &str = "notification";
    pub const CONNECTED: &str = "connected";
    pub const HEARTBEAT: &str = "heartbeat";
}
