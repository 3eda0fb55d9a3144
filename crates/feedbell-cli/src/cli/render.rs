use feedbell_core::format::truncate_with_ellipsis;
use feedbell_core::{ClientNotificationItem, PanelView, TabMode};

const MESSAGE_WIDTH: usize = 60;

/// One line per item: unread marker, id, message, age
pub fn render_item(item: &ClientNotificationItem) -> String {
    let marker = if item.is_read { ' ' } else { '●' };
    format!(
        "{} [{}] {} · {}",
        marker,
        item.id,
        truncate_with_ellipsis(&item.message, MESSAGE_WIDTH),
        item.relative_time
    )
}

/// Plain-text rendering of the panel, top to bottom
pub fn render_panel(view: &PanelView) -> Vec<String> {
    let mut lines = Vec::new();

    let badge = view
        .badge_label
        .as_deref()
        .map(|label| format!(" ({})", label))
        .unwrap_or_default();
    lines.push(format!("Notifications{}", badge));

    let tab = |mode: TabMode| {
        if view.tab == mode {
            format!("[{}]", mode.label())
        } else {
            format!(" {} ", mode.label())
        }
    };
    let mut tabs = format!("{} {}", tab(TabMode::Unread), tab(TabMode::Read));
    if view.can_mark_all {
        tabs.push_str("   (all: mark all read)");
    }
    lines.push(tabs);

    if let Some(error) = &view.error {
        lines.push(format!("! {} (dismiss to clear)", error));
    }

    if view.loading {
        lines.push("Loading…".to_string());
    } else if let Some(empty) = view.empty_message {
        lines.push(empty.to_string());
    }

    lines.extend(view.items.iter().map(render_item));

    if view.loading_more {
        lines.push("Loading more…".to_string());
    } else if view.show_expand {
        lines.push(format!("… {} shown, more available (expand)", view.items.len()));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use feedbell_core::models::{Actor, NotificationType};
    use feedbell_core::{NotificationRecord, NotificationSnapshot, UserId, ViewState};

    fn item(id: &str, is_read: bool) -> ClientNotificationItem {
        ClientNotificationItem::from_record(
            NotificationRecord {
                id: id.to_string(),
                actor: Actor {
                    id: "u-1".to_string(),
                    nickname: Some("mina".to_string()),
                },
                kind: NotificationType::Follow,
                target_type: None,
                target_id: None,
                created_at: Utc::now(),
                is_read,
                payload: serde_json::Value::Null,
            },
            Utc::now(),
        )
    }

    fn view(items: Vec<ClientNotificationItem>, badge: u64, has_next: bool) -> PanelView {
        let snapshot = NotificationSnapshot {
            user_id: Some(UserId::new("me")),
            items,
            cursor: None,
            has_next,
            loading: false,
            loading_more: false,
            badge_unread_count: badge,
        };
        PanelView::build(&snapshot, ViewState::default(), 5)
    }

    #[test]
    fn test_render_item_marks_unread() {
        let unread = render_item(&item("n-1", false));
        assert!(unread.starts_with("● [n-1]"));
        assert!(unread.contains("mina"));
        assert!(unread.ends_with("just now"));

        let read = render_item(&item("n-2", true));
        assert!(read.starts_with("  [n-2]"));
    }

    #[test]
    fn test_render_empty_panel() {
        let lines = render_panel(&view(Vec::new(), 0, false));
        assert_eq!(lines[0], "Notifications");
        assert_eq!(lines[1], "[Unread]  Read ");
        assert_eq!(lines[2], "You're all caught up.");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_panel_with_more() {
        let lines = render_panel(&view(vec![item("a", false), item("b", true)], 3, true));
        assert_eq!(lines[0], "Notifications (3)");
        assert!(lines[1].ends_with("(all: mark all read)"));
        assert!(lines[2].contains("[a]"));
        assert!(lines[3].contains("[b]"));
        assert_eq!(lines[4], "… 2 shown, more available (expand)");
    }
}
