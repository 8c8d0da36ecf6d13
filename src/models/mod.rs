pub mod auth;
pub mod chat;
pub mod common;
pub mod dashboard;
pub mod events;
pub mod materials;
pub mod shell;
pub mod students;
pub mod users;

pub use common::{ApiResponse, ErrorCode};

// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
