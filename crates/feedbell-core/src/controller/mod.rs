mod notification_controller;
mod state;

pub use notification_controller::NotificationController;
pub use state::ControllerPhase;
