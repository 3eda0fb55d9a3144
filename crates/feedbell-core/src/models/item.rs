use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::record::{NotificationRecord, NotificationType, TargetType};
use crate::format::format_relative_time;

/// Display projection of a [`NotificationRecord`].
///
/// `is_read` is the locally mutable flag and may lead the server while an
/// optimistic mutation is in flight. `raw` always holds the record as last
/// received from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientNotificationItem {
    pub id: String,
    pub kind: NotificationType,
    pub actor_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub relative_time: String,
    pub is_read: bool,
    pub raw: Arc<NotificationRecord>,
}

impl ClientNotificationItem {
    pub fn from_record(record: NotificationRecord, now: DateTime<Utc>) -> Self {
        let actor_name = record.actor.display_name().to_string();
        let message = display_message(&record, &actor_name);
        Self {
            id: record.id.clone(),
            kind: record.kind,
            relative_time: format_relative_time(record.created_at, now),
            created_at: record.created_at,
            is_read: record.is_read,
            actor_name,
            message,
            raw: Arc::new(record),
        }
    }

    /// The record as it should be re-ingested to restore this item's current
    /// read state (used to roll back an optimistic flip).
    pub fn as_record(&self) -> NotificationRecord {
        let mut record = (*self.raw).clone();
        record.is_read = self.is_read;
        record
    }
}

impl From<NotificationRecord> for ClientNotificationItem {
    fn from(record: NotificationRecord) -> Self {
        Self::from_record(record, Utc::now())
    }
}

fn target_noun(target: Option<TargetType>) -> &'static str {
    match target {
        Some(TargetType::Recipe) => "recipe",
        Some(TargetType::Post) => "post",
        Some(TargetType::Comment) => "comment",
        _ => "content",
    }
}

fn display_message(record: &NotificationRecord, actor: &str) -> String {
    let noun = target_noun(record.target_type);
    match record.kind {
        NotificationType::Follow => format!("{} started following you", actor),
        NotificationType::Comment => format!("{} commented on your {}", actor, noun),
        NotificationType::Reply => format!("{} replied to your comment", actor),
        NotificationType::Post => format!("{} shared a new {}", actor, noun),
        NotificationType::Rating => format!("{} rated your {}", actor, noun),
        NotificationType::Like => format!("{} liked your {}", actor, noun),
        NotificationType::Unknown => format!("{} sent you a notification", actor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Actor;
    use chrono::TimeZone;

    fn record(kind: NotificationType, target: Option<TargetType>) -> NotificationRecord {
        NotificationRecord {
            id: "n-1".to_string(),
            actor: Actor {
                id: "u-1".to_string(),
                nickname: Some("marco".to_string()),
            },
            kind,
            target_type: target,
            target_id: Some("r-1".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 20, 11, 0, 0).unwrap(),
            is_read: false,
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_projection() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let item = ClientNotificationItem::from_record(
            record(NotificationType::Rating, Some(TargetType::Recipe)),
            now,
        );
        assert_eq!(item.id, "n-1");
        assert_eq!(item.message, "marco rated your recipe");
        assert_eq!(item.relative_time, "1h ago");
        assert!(!item.is_read);
    }

    #[test]
    fn test_messages_per_type() {
        let now = Utc::now();
        let follow =
            ClientNotificationItem::from_record(record(NotificationType::Follow, None), now);
        assert_eq!(follow.message, "marco started following you");

        let like = ClientNotificationItem::from_record(
            record(NotificationType::Like, Some(TargetType::Post)),
            now,
        );
        assert_eq!(like.message, "marco liked your post");
    }

    #[test]
    fn test_as_record_carries_local_read_flag() {
        let mut item = ClientNotificationItem::from(record(NotificationType::Comment, None));
        assert!(!item.as_record().is_read);
        item.is_read = true;
        assert!(item.as_record().is_read);
        // The raw server record is untouched
        assert!(!item.raw.is_read);
    }
}
