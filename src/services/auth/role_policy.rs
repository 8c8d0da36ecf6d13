//! 角色判定策略
//!
//! 元数据中可识别的角色声明优先；否则按邮箱判定：
//! 在显式教师名单中，或包含任一标记子串（区分大小写）的为教师，其余为学生。

use crate::config::PortalConfig;
use crate::models::users::entities::UserRole;

#[derive(Debug, Clone)]
pub struct RolePolicy {
    teacher_markers: Vec<String>,
    teacher_emails: Vec<String>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::from_config(&PortalConfig::default())
    }
}

impl RolePolicy {
    pub fn new(teacher_markers: Vec<String>, teacher_emails: Vec<String>) -> Self {
        Self {
            teacher_markers,
            teacher_emails,
        }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(config.teacher_markers.clone(), config.teacher_emails.clone())
    }

    /// 综合角色声明与邮箱判定角色
    pub fn resolve(&self, email: &str, claimed_role: Option<&str>) -> UserRole {
        claimed_role
            .and_then(|claim| claim.trim().parse::<UserRole>().ok())
            .unwrap_or_else(|| self.infer_role(email))
    }

    /// 仅按邮箱判定
    pub fn infer_role(&self, email: &str) -> UserRole {
        let listed = self
            .teacher_emails
            .iter()
            .any(|listed| listed.eq_ignore_ascii_case(email));
        let marked = self
            .teacher_markers
            .iter()
            .filter(|marker| !marker.is_empty())
            .any(|marker| email.contains(marker.as_str()));

        if listed || marked {
            UserRole::Teacher
        } else {
            UserRole::Student
        }
    }
}
