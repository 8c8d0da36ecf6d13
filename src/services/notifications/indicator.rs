//! 跨视图的未读消息标记
//!
//! 不在聊天视图时收到通知则置位；进入聊天视图时清除。只存在于内存中。

pub const CHAT_VIEW: &str = "/chat";

#[derive(Debug, Clone, PartialEq)]
pub struct UnreadIndicator {
    active_view: String,
    has_unread: bool,
}

impl UnreadIndicator {
    pub fn new(initial_view: &str) -> Self {
        Self {
            active_view: initial_view.to_string(),
            has_unread: false,
        }
    }

    pub fn on_notification(&mut self) {
        if self.active_view != CHAT_VIEW {
            self.has_unread = true;
        }
    }

    pub fn navigate(&mut self, path: &str) {
        self.active_view = path.to_string();
        if path == CHAT_VIEW {
            self.has_unread = false;
        }
    }

    pub fn active_view(&self) -> &str {
        &self.active_view
    }

    pub fn has_unread(&self) -> bool {
        self.has_unread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_outside_chat_sets_flag() {
        let mut indicator = UnreadIndicator::new("/materials");
        indicator.on_notification();
        assert!(indicator.has_unread());
    }

    #[test]
    fn test_notification_on_chat_is_ignored() {
        let mut indicator = UnreadIndicator::new(CHAT_VIEW);
        indicator.on_notification();
        assert!(!indicator.has_unread());
    }

    #[test]
    fn test_navigating_to_chat_clears_flag() {
        let mut indicator = UnreadIndicator::new("/");
        indicator.on_notification();
        indicator.navigate("/calendar");
        assert!(indicator.has_unread());

        indicator.navigate(CHAT_VIEW);
        assert!(!indicator.has_unread());

        indicator.navigate("/");
        assert!(!indicator.has_unread());
        assert_eq!(indicator.active_view(), "/");
    }
}
