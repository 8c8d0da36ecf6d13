use tokio::signal;
use tracing::warn;

use crate::services::{NotificationBus, ShellRegistry};

pub async fn listen_for_shutdown(bus: NotificationBus, shells: ShellRegistry) {
    // 等待 Ctrl+C 信号
    signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
    warn!("Shutdown signal received, initiating graceful shutdown...");
    release_notifications(&bus, &shells);
}

/// 关闭通知总线，已打开的外壳随之失去订阅
fn release_notifications(bus: &NotificationBus, shells: &ShellRegistry) {
    bus.close();
    warn!(
        "Notification bus closed with {} shell(s) still open",
        shells.open_count()
    );
}
