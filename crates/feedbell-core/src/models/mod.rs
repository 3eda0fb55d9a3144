pub mod item;
pub mod paging;
pub mod record;

pub use item::ClientNotificationItem;
pub use paging::{has_next_page, Cursor, TabMode, UserId};
pub use record::{Actor, NotificationRecord, NotificationType, TargetType};
