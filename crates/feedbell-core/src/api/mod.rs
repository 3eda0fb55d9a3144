//! REST collaborators consumed by the controller.
//!
//! The server owns list pagination, the unread counter and read-state
//! mutations; this module only describes the calls and supplies an HTTP
//! implementation.

pub mod http;
pub mod session;

use async_trait::async_trait;

use crate::error::FeedError;
use crate::models::{Cursor, NotificationRecord, TabMode};

pub use http::HttpNotificationApi;
pub use session::{SessionProvider, StaticSession};

/// Parameters for one page of the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub mode: TabMode,
    pub size: usize,
    /// Absent for the first page
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    pub fn first(mode: TabMode, size: usize) -> Self {
        Self {
            mode,
            size,
            cursor: None,
        }
    }

    pub fn after(mode: TabMode, size: usize, cursor: Cursor) -> Self {
        Self {
            mode,
            size,
            cursor: Some(cursor),
        }
    }
}

#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Records for `request.mode`, newest first, at most `request.size`
    async fn list_page(&self, request: &PageRequest) -> Result<Vec<NotificationRecord>, FeedError>;

    /// Authoritative badge value
    async fn unread_count(&self) -> Result<u64, FeedError>;

    async fn mark_read(&self, id: &str) -> Result<(), FeedError>;

    async fn mark_all_read(&self) -> Result<(), FeedError>;
}
