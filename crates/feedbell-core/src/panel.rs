//! Presentation contract: everything a renderer needs, derived from one
//! store snapshot plus the controller's view state. Renderers never hold a
//! mutable copy of the item list; they rebuild a `PanelView` per snapshot
//! and route every action back through the controller.

use crate::constants::BADGE_DISPLAY_CAP;
use crate::controller::ControllerPhase;
use crate::error::UserFacingError;
use crate::models::{ClientNotificationItem, TabMode};
use crate::store::NotificationSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub tab: TabMode,
    pub phase: ControllerPhase,
    pub badge_count: u64,
    /// `None` hides the badge
    pub badge_label: Option<String>,
    /// Preview slice when collapsed, everything loaded when expanded
    pub items: Vec<ClientNotificationItem>,
    pub total_loaded: usize,
    pub expanded: bool,
    pub empty_message: Option<&'static str>,
    pub can_mark_all: bool,
    pub show_expand: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<UserFacingError>,
}

/// Inputs from the controller that are not part of the store
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub tab: TabMode,
    pub phase: ControllerPhase,
    pub expanded: bool,
    pub error: Option<UserFacingError>,
}

impl PanelView {
    pub fn build(snapshot: &NotificationSnapshot, state: ViewState, preview_limit: usize) -> Self {
        let total_loaded = snapshot.items.len();
        let visible = if state.expanded {
            total_loaded
        } else {
            total_loaded.min(preview_limit)
        };

        let empty_message = if total_loaded == 0 && !snapshot.loading {
            Some(match state.tab {
                TabMode::Unread => "You're all caught up.",
                TabMode::Read => "No read notifications yet.",
            })
        } else {
            None
        };

        let unread_signal = snapshot.badge_unread_count > 0 || snapshot.loaded_unread() > 0;

        Self {
            tab: state.tab,
            phase: state.phase,
            badge_count: snapshot.badge_unread_count,
            badge_label: badge_label(snapshot.badge_unread_count),
            items: snapshot.items[..visible].to_vec(),
            total_loaded,
            expanded: state.expanded,
            empty_message,
            can_mark_all: state.tab == TabMode::Unread && unread_signal,
            show_expand: !state.expanded && (snapshot.has_next || total_loaded > visible),
            loading: snapshot.loading,
            loading_more: snapshot.loading_more,
            error: state.error,
        }
    }
}

/// Badge text, capped so it fits the icon
pub fn badge_label(count: u64) -> Option<String> {
    match count {
        0 => None,
        n if n > BADGE_DISPLAY_CAP => Some(format!("{}+", BADGE_DISPLAY_CAP)),
        n => Some(n.to_string()),
    }
}

/// Scroll position of the expanded list, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub viewport_height: u32,
    pub content_height: u32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: u32, viewport_height: u32, content_height: u32) -> Self {
        Self {
            scroll_top,
            viewport_height,
            content_height,
        }
    }

    pub fn distance_to_bottom(&self) -> u32 {
        self.content_height
            .saturating_sub(self.scroll_top.saturating_add(self.viewport_height))
    }

    pub fn near_bottom(&self, threshold_px: u32) -> bool {
        self.distance_to_bottom() <= threshold_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, NotificationRecord, NotificationType, UserId};
    use chrono::Utc;

    fn snapshot(count: usize, badge: u64, has_next: bool) -> NotificationSnapshot {
        let items = (0..count)
            .map(|i| {
                ClientNotificationItem::from_record(
                    NotificationRecord {
                        id: format!("n{}", i),
                        actor: Actor {
                            id: "u".to_string(),
                            nickname: None,
                        },
                        kind: NotificationType::Follow,
                        target_type: None,
                        target_id: None,
                        created_at: Utc::now(),
                        is_read: false,
                        payload: serde_json::Value::Null,
                    },
                    Utc::now(),
                )
            })
            .collect();
        NotificationSnapshot {
            user_id: Some(UserId::new("me")),
            items,
            cursor: None,
            has_next,
            loading: false,
            loading_more: false,
            badge_unread_count: badge,
        }
    }

    #[test]
    fn test_badge_label() {
        assert_eq!(badge_label(0), None);
        assert_eq!(badge_label(7).as_deref(), Some("7"));
        assert_eq!(badge_label(99).as_deref(), Some("99"));
        assert_eq!(badge_label(250).as_deref(), Some("99+"));
    }

    #[test]
    fn test_empty_unread_state() {
        let view = PanelView::build(&snapshot(0, 0, false), ViewState::default(), 5);
        assert_eq!(view.empty_message, Some("You're all caught up."));
        assert!(view.badge_label.is_none());
        assert!(!view.can_mark_all);
        assert!(!view.show_expand);
    }

    #[test]
    fn test_collapsed_shows_preview() {
        let view = PanelView::build(&snapshot(8, 8, true), ViewState::default(), 5);
        assert_eq!(view.items.len(), 5);
        assert_eq!(view.total_loaded, 8);
        assert!(view.show_expand);
        assert!(view.can_mark_all);
    }

    #[test]
    fn test_expanded_shows_everything() {
        let state = ViewState {
            expanded: true,
            ..Default::default()
        };
        let view = PanelView::build(&snapshot(8, 8, true), state, 5);
        assert_eq!(view.items.len(), 8);
        assert!(!view.show_expand);
    }

    #[test]
    fn test_read_tab_cannot_mark_all() {
        let state = ViewState {
            tab: TabMode::Read,
            ..Default::default()
        };
        let view = PanelView::build(&snapshot(3, 4, false), state, 5);
        assert!(!view.can_mark_all);
        assert_eq!(view.badge_label.as_deref(), Some("4"));
    }

    #[test]
    fn test_scroll_proximity() {
        let metrics = ScrollMetrics::new(560, 400, 1000);
        assert_eq!(metrics.distance_to_bottom(), 40);
        assert!(metrics.near_bottom(48));
        assert!(!ScrollMetrics::new(100, 400, 1000).near_bottom(48));
        // Content shorter than the viewport counts as at the bottom
        assert!(ScrollMetrics::new(0, 400, 200).near_bottom(0));
    }
}
