use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of activity that produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Follow,
    Comment,
    Reply,
    Post,
    Rating,
    Like,
    /// Types added server-side after this client was built
    #[serde(other)]
    Unknown,
}

/// What the notification points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Recipe,
    Post,
    Comment,
    User,
    #[serde(other)]
    Unknown,
}

/// The user whose action produced the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Actor {
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Someone",
        }
    }
}

/// Server-authoritative notification entity.
/// Matches the JSON shape of both the list endpoint and the "notification" push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub actor: Actor,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub target_type: Option<TargetType>,
    #[serde(default)]
    pub target_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    /// Opaque extra data; only consulted when resolving a navigation target
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl NotificationRecord {
    /// Parse a push-event data field. Returns `None` for malformed JSON.
    pub fn from_event_data(data: &str) -> Option<Self> {
        serde_json::from_str(data).ok()
    }
}
