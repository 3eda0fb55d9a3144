pub mod notification_store;

pub use notification_store::{NotificationSnapshot, NotificationStore};
