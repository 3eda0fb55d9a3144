use std::fmt;

use crate::models::{NotificationRecord, NotificationType, TargetType};

/// Where a clicked notification leads. The routing table itself belongs to
/// the host application; this only names the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    Profile { user_id: String },
    Recipe { recipe_id: String },
    CommunityPost { post_id: String },
    Comment { comment_id: String },
}

impl NavigationTarget {
    /// Resolve the destination from the record's type, target and actor.
    pub fn resolve(record: &NotificationRecord) -> Option<Self> {
        if record.kind == NotificationType::Follow {
            return Some(NavigationTarget::Profile {
                user_id: record.actor.id.clone(),
            });
        }

        let target_id = record
            .target_id
            .clone()
            .or_else(|| payload_str(record, "targetId"))?;

        let target_type = record.target_type.or_else(|| match record.kind {
            NotificationType::Post => Some(TargetType::Post),
            NotificationType::Reply => Some(TargetType::Comment),
            NotificationType::Rating => Some(TargetType::Recipe),
            _ => None,
        })?;

        match target_type {
            TargetType::Recipe => Some(NavigationTarget::Recipe {
                recipe_id: target_id,
            }),
            TargetType::Post => Some(NavigationTarget::CommunityPost { post_id: target_id }),
            TargetType::Comment => Some(NavigationTarget::Comment {
                comment_id: target_id,
            }),
            TargetType::User => Some(NavigationTarget::Profile { user_id: target_id }),
            TargetType::Unknown => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            NavigationTarget::Profile { user_id } => format!("/users/{}", user_id),
            NavigationTarget::Recipe { recipe_id } => format!("/recipes/{}", recipe_id),
            NavigationTarget::CommunityPost { post_id } => format!("/community/{}", post_id),
            NavigationTarget::Comment { comment_id } => format!("/comments/{}", comment_id),
        }
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn payload_str(record: &NotificationRecord, key: &str) -> Option<String> {
    record
        .payload
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Receives resolved destinations from the controller
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &NavigationTarget);
}

/// Navigator that only logs; useful for headless sessions
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        tracing::debug!(path = %target, "navigation requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Actor;
    use chrono::Utc;
    use serde_json::json;

    fn record(
        kind: NotificationType,
        target_type: Option<TargetType>,
        target_id: Option<&str>,
    ) -> NotificationRecord {
        NotificationRecord {
            id: "n-1".to_string(),
            actor: Actor {
                id: "u-9".to_string(),
                nickname: None,
            },
            kind,
            target_type,
            target_id: target_id.map(str::to_string),
            created_at: Utc::now(),
            is_read: false,
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_follow_goes_to_actor_profile() {
        let target = NavigationTarget::resolve(&record(NotificationType::Follow, None, None));
        assert_eq!(target.unwrap().path(), "/users/u-9");
    }

    #[test]
    fn test_comment_on_recipe() {
        let target = NavigationTarget::resolve(&record(
            NotificationType::Comment,
            Some(TargetType::Recipe),
            Some("r-3"),
        ));
        assert_eq!(
            target,
            Some(NavigationTarget::Recipe {
                recipe_id: "r-3".to_string()
            })
        );
    }

    #[test]
    fn test_post_without_target_type() {
        let target =
            NavigationTarget::resolve(&record(NotificationType::Post, None, Some("p-1")));
        assert_eq!(target.unwrap().path(), "/community/p-1");
    }

    #[test]
    fn test_target_id_from_payload() {
        let mut rec = record(NotificationType::Like, Some(TargetType::Post), None);
        rec.payload = json!({"targetId": "p-77"});
        assert_eq!(
            NavigationTarget::resolve(&rec).unwrap().path(),
            "/community/p-77"
        );
    }

    #[test]
    fn test_unresolvable() {
        assert!(
            NavigationTarget::resolve(&record(NotificationType::Comment, None, None)).is_none()
        );
        assert!(NavigationTarget::resolve(&record(
            NotificationType::Unknown,
            Some(TargetType::Unknown),
            Some("x")
        ))
        .is_none());
    }
}
