pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod format;
pub mod models;
pub mod navigation;
pub mod panel;
pub mod polling;
pub mod push;
pub mod store;
pub mod tracing_setup;

// Re-export the main entry points at crate root for convenience
pub use api::{HttpNotificationApi, NotificationApi, SessionProvider, StaticSession};
pub use config::CoreConfig;
pub use controller::{ControllerPhase, NotificationController};
pub use error::{ErrorContext, ErrorReporter, FeedError, UserFacingError};
pub use models::{ClientNotificationItem, Cursor, NotificationRecord, TabMode, UserId};
pub use navigation::{NavigationTarget, Navigator, NoopNavigator};
pub use panel::{PanelView, ScrollMetrics, ViewState};
pub use push::{ChannelState, HttpPushTransport, PushChannel, PushTransport};
pub use store::{NotificationSnapshot, NotificationStore};
