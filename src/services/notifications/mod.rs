pub mod bus;
pub mod indicator;
pub mod registry;

pub use bus::{BusSubscription, ChatNotification, NotificationBus};
pub use indicator::{CHAT_VIEW, UnreadIndicator};
pub use registry::{ShellRegistry, navigation_for};
