//! 已打开的外壳（布局）
//!
//! 每个外壳持有自己的总线订阅和未读标记。切换视图或读取状态之前，
//! 先按当前视图消化积压的通知，因此结果与逐条处理一致。
//! 客户端不一定会调用关闭，闲置超过期限的外壳在下一次访问注册表时被回收。

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use tracing::{debug, info};
use uuid::Uuid;

use super::bus::{BusSubscription, NotificationBus};
use super::indicator::UnreadIndicator;
use crate::models::shell::{NavItem, OpenShellResponse, ShellState};
use crate::models::users::entities::{PortalUser, UserRole};

pub const HOME_VIEW: &str = "/";

/// 按角色生成导航项，学生名册只对教师可见
pub fn navigation_for(role: UserRole) -> Vec<NavItem> {
    let mut items = vec![
        NavItem { path: "/", label: "Dashboard" },
        NavItem { path: "/materials", label: "Materials" },
        NavItem { path: "/calendar", label: "Calendar" },
        NavItem { path: "/chat", label: "Class Chat" },
    ];
    if role == UserRole::Teacher {
        items.push(NavItem { path: "/students", label: "Students" });
    }
    items
}

struct Shell {
    owner_id: String,
    subscription: Option<BusSubscription>,
    indicator: UnreadIndicator,
    last_seen: Instant,
}

impl Shell {
    fn sync(&mut self) {
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        if subscription.drain() > 0 {
            self.indicator.on_notification();
        }
    }

    fn state(&self) -> ShellState {
        ShellState {
            active_view: self.indicator.active_view().to_string(),
            has_unread_messages: self.indicator.has_unread(),
        }
    }
}

#[derive(Clone)]
pub struct ShellRegistry {
    bus: NotificationBus,
    shells: Arc<DashMap<String, Shell>>,
    idle_timeout: Duration,
}

impl ShellRegistry {
    pub fn new(bus: NotificationBus, idle_timeout: Duration) -> Self {
        Self {
            bus,
            shells: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    /// 回收闲置超时的外壳，连同其总线订阅
    fn evict_idle(&self) {
        let before = self.shells.len();
        self.shells
            .retain(|_, shell| shell.last_seen.elapsed() < self.idle_timeout);
        let evicted = before.saturating_sub(self.shells.len());
        if evicted > 0 {
            debug!("Evicted {} idle shells", evicted);
        }
    }

    fn touch(&self, shell_id: &str, user_id: &str) -> Option<RefMut<'_, String, Shell>> {
        self.evict_idle();
        let mut shell = self.shells.get_mut(shell_id)?;
        if shell.owner_id != user_id {
            return None;
        }
        shell.last_seen = Instant::now();
        shell.sync();
        Some(shell)
    }

    pub fn open(&self, user: &PortalUser, path: Option<&str>) -> OpenShellResponse {
        self.evict_idle();
        let shell_id = Uuid::new_v4().to_string();
        let view = path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(HOME_VIEW);
        let shell = Shell {
            owner_id: user.id.clone(),
            subscription: self.bus.subscribe(),
            indicator: UnreadIndicator::new(view),
            last_seen: Instant::now(),
        };
        let state = shell.state();
        self.shells.insert(shell_id.clone(), shell);
        info!("Shell {} opened for user {}", shell_id, user.id);

        OpenShellResponse {
            shell_id,
            role_label: user.role.label(),
            navigation: navigation_for(user.role),
            state,
        }
    }

    /// 外壳不存在、已闲置回收或不属于该用户时返回 None
    pub fn state(&self, shell_id: &str, user_id: &str) -> Option<ShellState> {
        let shell = self.touch(shell_id, user_id)?;
        Some(shell.state())
    }

    pub fn navigate(&self, shell_id: &str, user_id: &str, path: &str) -> Option<ShellState> {
        let mut shell = self.touch(shell_id, user_id)?;
        shell.indicator.navigate(path);
        debug!("Shell {} navigated to {}", shell_id, path);
        Some(shell.state())
    }

    /// 关闭外壳并释放其总线订阅
    pub fn close(&self, shell_id: &str, user_id: &str) -> bool {
        let removed = self
            .shells
            .remove_if(shell_id, |_, shell| shell.owner_id == user_id)
            .is_some();
        if removed {
            info!("Shell {} closed", shell_id);
        }
        removed
    }

    /// 关闭用户的全部外壳（注销时）
    pub fn close_all_for(&self, user_id: &str) -> usize {
        let mut closed = 0;
        self.shells.retain(|_, shell| {
            let keep = shell.owner_id != user_id;
            if !keep {
                closed += 1;
            }
            keep
        });
        closed
    }

    pub fn open_count(&self) -> usize {
        self.evict_idle();
        self.shells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::bus::ChatNotification;

    const IDLE: Duration = Duration::from_secs(600);

    fn user(id: &str, role: UserRole) -> PortalUser {
        PortalUser {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: format!("{id}@example.com"),
            role,
            avatar: None,
        }
    }

    fn notify(bus: &NotificationBus) -> usize {
        bus.publish(ChatNotification {
            message_id: "m-1".to_string(),
            user_id: "someone".to_string(),
            user_name: "Someone".to_string(),
        })
    }

    #[test]
    fn test_navigation_by_role() {
        let teacher = navigation_for(UserRole::Teacher);
        let student = navigation_for(UserRole::Student);
        assert!(teacher.iter().any(|item| item.path == "/students"));
        assert!(!student.iter().any(|item| item.path == "/students"));
        assert_eq!(student.len(), 4);
    }

    #[test]
    fn test_unread_flag_follows_active_view() {
        let bus = NotificationBus::new();
        let registry = ShellRegistry::new(bus.clone(), IDLE);
        let owner = user("u-1", UserRole::Student);
        let opened = registry.open(&owner, Some("/materials"));
        let id = opened.shell_id.as_str();

        assert!(!opened.state.has_unread_messages);
        assert_eq!(opened.role_label, "Student");

        notify(&bus);
        assert!(registry.state(id, "u-1").unwrap().has_unread_messages);

        let state = registry.navigate(id, "u-1", "/chat").unwrap();
        assert!(!state.has_unread_messages);

        // 在聊天视图收到的通知不置位
        notify(&bus);
        let state = registry.navigate(id, "u-1", "/calendar").unwrap();
        assert!(!state.has_unread_messages);
    }

    #[test]
    fn test_shell_is_scoped_to_owner() {
        let registry = ShellRegistry::new(NotificationBus::new(), IDLE);
        let opened = registry.open(&user("u-1", UserRole::Teacher), None);

        assert_eq!(opened.state.active_view, "/");
        assert!(registry.state(&opened.shell_id, "u-2").is_none());
        assert!(!registry.close(&opened.shell_id, "u-2"));
        assert!(registry.close(&opened.shell_id, "u-1"));
        assert!(registry.state(&opened.shell_id, "u-1").is_none());
    }

    #[test]
    fn test_close_all_for_user() {
        let registry = ShellRegistry::new(NotificationBus::new(), IDLE);
        registry.open(&user("u-1", UserRole::Student), None);
        registry.open(&user("u-1", UserRole::Student), None);
        registry.open(&user("u-2", UserRole::Student), None);
        assert_eq!(registry.close_all_for("u-1"), 2);
        assert_eq!(registry.open_count(), 1);
    }

    #[test]
    fn test_idle_shells_are_evicted() {
        let bus = NotificationBus::new();
        let registry = ShellRegistry::new(bus.clone(), Duration::from_millis(200));
        let owner = user("u-1", UserRole::Student);
        let stale = registry.open(&owner, None);
        let fresh = registry.open(&owner, None);
        assert_eq!(notify(&bus), 2);

        std::thread::sleep(Duration::from_millis(120));
        assert!(registry.state(&fresh.shell_id, "u-1").is_some());
        std::thread::sleep(Duration::from_millis(120));

        // 访问刷新了 fresh 的闲置计时，stale 已超时
        assert!(registry.state(&stale.shell_id, "u-1").is_none());
        assert_eq!(registry.open_count(), 1);
        // 被回收外壳的订阅已释放
        assert_eq!(notify(&bus), 1);
    }
}
